//! relay_signal performance constants.
//!
//! Core constants used by the queue and thread-pool implementations:
//! segment capacity for the unbounded MPSC queue, the pool's spoke count,
//! and the default async inflight cap.

/// Segment capacity for a deferred/strand MPSC queue.
pub const MPSC_SEGMENT_CAPACITY: usize = 256;

/// Segment capacity for the pool-spoke MPSC queues.
pub const POOL_SEGMENT_CAPACITY: usize = 8192;

/// Number of spokes in the process-wide wheeled thread pool.
pub const POOL_SPOKE_COUNT: usize = 32;

/// Default inflight cap for the asynchronous scheme's permit semaphore.
pub const DEFAULT_MAX_ASYNC_INFLIGHT: u32 = 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_capacities_are_powers_of_two() {
        assert!(MPSC_SEGMENT_CAPACITY.is_power_of_two());
        assert!(POOL_SEGMENT_CAPACITY.is_power_of_two());
    }

    #[test]
    fn pool_spoke_count_matches_normative_value() {
        assert_eq!(POOL_SPOKE_COUNT, 32);
    }
}
