//! Panic containment for slot invocations run off the emitter's thread.
//!
//! A panicking slot is a programmer error, and the scheme determines its
//! blast radius. On the synchronous scheme a panic is left to unwind into
//! the caller, same as any other Rust call. On the asynchronous, strand,
//! and pooled schemes the call runs on a thread the caller doesn't own, so
//! a panic there must be caught and logged instead of silently killing a
//! detached or pool-owned thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Runs `f`, catching and logging any panic so the calling thread survives.
pub(crate) fn run_guarded<F: FnOnce()>(context: &str, f: F) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        tracing::error!(context, panic = %describe(&payload), "slot invocation panicked");
    }
}

fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
