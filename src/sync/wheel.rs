//! Lock-free round-robin shard selector.
//!
//! A fixed array plus an atomic cursor advanced with a weak CAS loop.
//! Fairness is approximate round-robin; no global lock is ever taken.

use std::sync::atomic::{AtomicUsize, Ordering};

pub struct Wheel<T> {
    spokes: Box<[T]>,
    cursor: AtomicUsize,
}

impl<T> Wheel<T> {
    pub fn new(spokes: Vec<T>) -> Self {
        assert!(!spokes.is_empty(), "wheel must have at least one spoke");
        Self { spokes: spokes.into_boxed_slice(), cursor: AtomicUsize::new(0) }
    }

    pub fn len(&self) -> usize {
        self.spokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spokes.is_empty()
    }

    /// Returns the spoke at a fixed index (for per-slot strand queues and
    /// the like, where the caller picks the shard rather than round-robin).
    pub fn spoke(&self, index: usize) -> &T {
        &self.spokes[index]
    }

    /// Advances the cursor and returns the spoke it pointed to.
    pub fn next_spoke(&self) -> &T {
        let n = self.spokes.len();
        let mut current = self.cursor.load(Ordering::Relaxed);
        loop {
            let next = (current + 1) % n;
            match self.cursor.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(claimed) => return &self.spokes[claimed],
                Err(observed) => current = observed,
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.spokes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as Counter;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn next_spoke_cycles_in_order() {
        let wheel = Wheel::new(vec![Counter::new(0), Counter::new(1), Counter::new(2)]);
        let seen: Vec<usize> = (0..7).map(|_| wheel.next_spoke().load(Ordering::Relaxed)).collect();
        assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn concurrent_next_spoke_distributes_evenly() {
        let counters: Vec<Counter> = (0..4).map(|_| Counter::new(0)).collect();
        let wheel = Arc::new(Wheel::new(counters));

        let mut handles = vec![];
        for _ in 0..8 {
            let wheel = wheel.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    wheel.next_spoke().fetch_add(1, Ordering::Relaxed);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let total: usize = wheel.iter().map(|c| c.load(Ordering::Relaxed)).sum();
        assert_eq!(total, 8000);
    }
}
