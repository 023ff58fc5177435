//! Observability bootstrap.
//!
//! `relay_signal` emits its own logging through `tracing` unconditionally
//! (see [`crate::metrics`] and the `tracing::*` calls throughout
//! [`crate::signal`], [`crate::pool`]); this module only wires up *where*
//! those events go. Zero-cost when no subscriber is installed, since
//! `tracing` macros compile to a cheap enabled-check when nothing is
//! listening.

/// Installs a Tracy profiler layer as the global subscriber. Requires the
/// `tracy` feature. Call once at process startup; panics if a global
/// subscriber is already set.
#[cfg(feature = "tracy")]
pub fn init_tracy() {
    use tracing_subscriber::layer::SubscriberExt;
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(tracing_tracy::TracyLayer::default()),
    )
    .expect("setup tracy layer");
}

#[cfg(not(feature = "tracy"))]
pub fn init_tracy() {}
