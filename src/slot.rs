//! Slot storage: a tagged enum over the five execution schemes.
//!
//! A tagged variant over a trait-object hierarchy, since the set of
//! schemes is closed and each carries different scheme-specific state (a
//! strand owns a queue and a thread handle; synchronous owns only the
//! callable). `SlotEntry` is what the dispatcher actually stores per id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::queue::Mpsc;

/// A callable attached to a signal. Boxed since slots of different
/// closures must share one type in the slot map.
pub type SignalCallable<Args> = Arc<dyn Fn(Args) + Send + Sync>;

/// A boxed unit of work for the deferred queue; `None` is the terminator
/// sentinel.
pub(crate) type Thunk = Box<dyn FnOnce() + Send>;

pub(crate) enum SlotEntry<Args> {
    Sync { callable: SignalCallable<Args> },
    Deferred { callable: SignalCallable<Args> },
    Async { callable: SignalCallable<Args> },
    /// Owns a dedicated queue of argument snapshots and the consumer
    /// thread draining it in FIFO order.
    Strand { callable: SignalCallable<Args>, queue: Arc<Mpsc<Option<Args>>>, handle: Option<JoinHandle<()>> },
    Pooled { callable: SignalCallable<Args> },
}

/// A slot-map value: the entry plus the guarded path's "mark for dead"
/// liveness flag. The flag is reference-counted so asynchronous and
/// pooled workers can carry their own handle and re-check it just before
/// invoking the callable. Unguarded signals never mark a slot dead, they
/// remove entries from the map outright instead. The flag itself is
/// created by the caller (at connect time, tracked independently of the
/// slot map so a guarded disconnect can flip it without ever taking the
/// slot map's lock) and handed in here rather than allocated fresh.
pub(crate) struct SlotRecord<Args> {
    pub(crate) entry: SlotEntry<Args>,
    pub(crate) alive: Arc<AtomicBool>,
}

impl<Args> SlotRecord<Args> {
    pub(crate) fn new(entry: SlotEntry<Args>, alive: Arc<AtomicBool>) -> Self {
        Self { entry, alive }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}
