//! Queueing primitives backing deferred, strand, and pooled dispatch: a
//! bounded lock-free MPMC ring, and an unbounded MPSC queue built from a
//! chain of such rings.

pub mod mpmc_ring;
pub mod mpsc;

pub use mpmc_ring::MpmcRing;
pub use mpsc::Mpsc;
