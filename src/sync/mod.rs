//! Synchronization primitives backing the signal dispatcher: a counting
//! semaphore, a writer-preferring shared lock, and a lock-free
//! round-robin "wheel" for shard selection.

pub mod semaphore;
pub mod rwlock;
pub mod wheel;

pub use semaphore::Semaphore;
pub use rwlock::SharedLock;
pub use wheel::Wheel;
