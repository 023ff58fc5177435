//! Metrics for signal dispatch.
//!
//! Lightweight, always-on atomic counters for observability: an in-process
//! counter set, not a network-facing metrics exporter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-[`Signal`](crate::Signal) metrics counters.
#[derive(Debug, Default)]
pub struct Metrics {
    pub emissions: AtomicU64,
    pub synchronous_invocations: AtomicU64,
    pub deferred_enqueued: AtomicU64,
    pub deferred_invoked: AtomicU64,
    pub asynchronous_spawned: AtomicU64,
    pub strand_enqueued: AtomicU64,
    pub pooled_submitted: AtomicU64,
    pub suppressed_dead_slot: AtomicU64,
    pub async_inflight_high_water: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            emissions: AtomicU64::new(0),
            synchronous_invocations: AtomicU64::new(0),
            deferred_enqueued: AtomicU64::new(0),
            deferred_invoked: AtomicU64::new(0),
            asynchronous_spawned: AtomicU64::new(0),
            strand_enqueued: AtomicU64::new(0),
            pooled_submitted: AtomicU64::new(0),
            suppressed_dead_slot: AtomicU64::new(0),
            async_inflight_high_water: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_emission(&self) {
        self.emissions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_inflight(&self, count: u64) {
        self.async_inflight_high_water.fetch_max(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            emissions: self.emissions.load(Ordering::Relaxed),
            synchronous_invocations: self.synchronous_invocations.load(Ordering::Relaxed),
            deferred_enqueued: self.deferred_enqueued.load(Ordering::Relaxed),
            deferred_invoked: self.deferred_invoked.load(Ordering::Relaxed),
            asynchronous_spawned: self.asynchronous_spawned.load(Ordering::Relaxed),
            strand_enqueued: self.strand_enqueued.load(Ordering::Relaxed),
            pooled_submitted: self.pooled_submitted.load(Ordering::Relaxed),
            suppressed_dead_slot: self.suppressed_dead_slot.load(Ordering::Relaxed),
            async_inflight_high_water: self.async_inflight_high_water.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub emissions: u64,
    pub synchronous_invocations: u64,
    pub deferred_enqueued: u64,
    pub deferred_invoked: u64,
    pub asynchronous_spawned: u64,
    pub strand_enqueued: u64,
    pub pooled_submitted: u64,
    pub suppressed_dead_slot: u64,
    pub async_inflight_high_water: u64,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "emissions={} sync={} deferred={}/{} async={} strand={} pooled={} suppressed={} async_hwm={}",
            self.emissions,
            self.synchronous_invocations,
            self.deferred_invoked,
            self.deferred_enqueued,
            self.asynchronous_spawned,
            self.strand_enqueued,
            self.pooled_submitted,
            self.suppressed_dead_slot,
            self.async_inflight_high_water
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_emissions_and_invocations() {
        let m = Metrics::new();
        m.record_emission();
        m.synchronous_invocations.fetch_add(1, Ordering::Relaxed);
        m.record_inflight(3);
        m.record_inflight(1);

        let s = m.snapshot();
        assert_eq!(s.emissions, 1);
        assert_eq!(s.synchronous_invocations, 1);
        assert_eq!(s.async_inflight_high_water, 3);
    }
}
