//! The closed set of slot execution schemes.
//!
//! Chosen by the caller of [`crate::Signal::connect`]; fixes how and where
//! the slot runs relative to the emitting thread.

/// How a connected slot is invoked when its signal is emitted.
///
/// | Scheme | Order | Runs on | Blocks emit? | Concurrent invocations of same slot? |
/// |---|---|---|---|---|
/// | `Synchronous` | Program order | Emitter thread | Yes | No |
/// | `DeferredSynchronous` | FIFO per signal | Thread calling [`crate::Signal::invoke_deferred`] | No | No |
/// | `Asynchronous` | Unordered | Fresh detached thread | No (semaphore-bounded) | Yes |
/// | `Strand` | FIFO per slot | Slot's dedicated thread | No | No (serialised per slot) |
/// | `ThreadPooled` | Unordered | Pool consumer threads | No | Yes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Synchronous,
    DeferredSynchronous,
    Asynchronous,
    Strand,
    ThreadPooled,
}

impl Scheme {
    /// Whether invoking this scheme's slot can block the emitting call.
    pub const fn blocks_emit(self) -> bool {
        matches!(self, Scheme::Synchronous)
    }

    /// Whether the dispatcher may run more than one invocation of the same
    /// slot concurrently under this scheme.
    pub const fn allows_concurrent_self_invocation(self) -> bool {
        matches!(self, Scheme::Asynchronous | Scheme::ThreadPooled)
    }
}
