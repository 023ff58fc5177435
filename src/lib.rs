//! `relay_signal`: in-process signal/slot dispatch.
//!
//! A [`Signal`] carries a fixed argument tuple `Args`. Any number of slots
//! (callables over that tuple) can be attached under one of five
//! [`Scheme`]s, which decide how the slot is invoked when the signal is
//! emitted: on the emitter thread, deferred to a later pump, on a detached
//! thread, on a dedicated per-slot thread, or on the process-wide pool.
//!
//! ```
//! use relay_signal::{Signal, Scheme};
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use std::sync::Arc;
//!
//! let total = Arc::new(AtomicI64::new(0));
//! let signal = Signal::<(i64, i64)>::unguarded();
//!
//! let t = total.clone();
//! signal.connect(Scheme::Synchronous, move |(a, b)| {
//!     t.fetch_add(a + b, Ordering::SeqCst);
//! });
//!
//! signal.emit((1, 2));
//! assert_eq!(total.load(Ordering::SeqCst), 3);
//! ```

pub mod constants;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod timer;

mod panic_guard;

pub mod sync;
pub mod queue;
pub mod pool;

pub mod scheme;
pub mod slot;
pub mod signal;

pub use error::{Result, SignalError};
pub use scheme::Scheme;
pub use signal::{bind_member, Signal, SignalConfig};
