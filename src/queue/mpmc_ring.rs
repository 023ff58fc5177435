//! Bounded multi-producer multi-consumer ring.
//!
//! The classic Vyukov ring: every cell owns its own sequence number, so
//! producers and consumers only ever race over a single cell's CAS, never
//! over a shared "is the ring full" check.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, SignalError};

struct Cell<T> {
    sequence: AtomicU64,
    value: UnsafeCell<MaybeUninit<T>>,
}

pub struct MpmcRing<T> {
    buffer: Box<[Cell<T>]>,
    mask: u64,
    enqueue_pos: AtomicU64,
    dequeue_pos: AtomicU64,
}

unsafe impl<T: Send> Send for MpmcRing<T> {}
unsafe impl<T: Send> Sync for MpmcRing<T> {}

impl<T> MpmcRing<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(SignalError::config("ring capacity must be a nonzero power of two"));
        }
        let buffer: Box<[Cell<T>]> = (0..capacity)
            .map(|i| Cell { sequence: AtomicU64::new(i as u64), value: UnsafeCell::new(MaybeUninit::uninit()) })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Self {
            buffer,
            mask: capacity as u64 - 1,
            enqueue_pos: AtomicU64::new(0),
            dequeue_pos: AtomicU64::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Attempts to enqueue `value`. On failure (ring full at that instant)
    /// hands the value back to the caller.
    pub fn try_enqueue(&self, value: T) -> std::result::Result<(), T> {
        let mut pos = self.enqueue_pos.load(Ordering::Relaxed);
        loop {
            let cell = &self.buffer[(pos & self.mask) as usize];
            let seq = cell.sequence.load(Ordering::Acquire);
            let diff = seq as i64 - pos as i64;
            match diff.cmp(&0) {
                std::cmp::Ordering::Equal => {
                    match self.enqueue_pos.compare_exchange_weak(
                        pos,
                        pos.wrapping_add(1),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => {
                            unsafe { (*cell.value.get()).write(value) };
                            cell.sequence.store(pos.wrapping_add(1), Ordering::Release);
                            return Ok(());
                        }
                        Err(observed) => pos = observed,
                    }
                }
                std::cmp::Ordering::Less => return Err(value),
                std::cmp::Ordering::Greater => pos = self.enqueue_pos.load(Ordering::Relaxed),
            }
        }
    }

    /// Attempts to dequeue a value. Returns `None` if the ring was empty at
    /// that instant.
    pub fn try_dequeue(&self) -> Option<T> {
        let mut pos = self.dequeue_pos.load(Ordering::Relaxed);
        loop {
            let cell = &self.buffer[(pos & self.mask) as usize];
            let seq = cell.sequence.load(Ordering::Acquire);
            let diff = seq as i64 - (pos as i64 + 1);
            match diff.cmp(&0) {
                std::cmp::Ordering::Equal => {
                    match self.dequeue_pos.compare_exchange_weak(
                        pos,
                        pos.wrapping_add(1),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => {
                            let value = unsafe { (*cell.value.get()).assume_init_read() };
                            cell.sequence.store(pos.wrapping_add(self.buffer.len() as u64), Ordering::Release);
                            return Some(value);
                        }
                        Err(observed) => pos = observed,
                    }
                }
                std::cmp::Ordering::Less => return None,
                std::cmp::Ordering::Greater => pos = self.dequeue_pos.load(Ordering::Relaxed),
            }
        }
    }
}

impl<T> Drop for MpmcRing<T> {
    fn drop(&mut self) {
        while self.try_dequeue().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn rejects_non_power_of_two_capacity() {
        assert!(MpmcRing::<u32>::new(0).is_err());
        assert!(MpmcRing::<u32>::new(3).is_err());
    }

    #[test]
    fn fifo_order_single_threaded() {
        let ring = MpmcRing::new(4).unwrap();
        for i in 0..4 {
            ring.try_enqueue(i).unwrap();
        }
        assert!(ring.try_enqueue(99).is_err());
        for i in 0..4 {
            assert_eq!(ring.try_dequeue(), Some(i));
        }
        assert_eq!(ring.try_dequeue(), None);
    }

    #[test]
    fn wraps_around_after_drain() {
        let ring = MpmcRing::new(2).unwrap();
        for round in 0..10 {
            ring.try_enqueue(round).unwrap();
            ring.try_enqueue(round + 1).unwrap();
            assert_eq!(ring.try_dequeue(), Some(round));
            assert_eq!(ring.try_dequeue(), Some(round + 1));
        }
    }

    #[test]
    fn concurrent_producers_and_consumers_preserve_every_item() {
        let ring = Arc::new(MpmcRing::new(1024).unwrap());
        let produced = Arc::new(AtomicUsize::new(0));
        let consumed = Arc::new(AtomicUsize::new(0));

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let ring = ring.clone();
                let produced = produced.clone();
                thread::spawn(move || {
                    for _ in 0..2000 {
                        loop {
                            if ring.try_enqueue(1u64).is_ok() {
                                produced.fetch_add(1, Ordering::Relaxed);
                                break;
                            }
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let ring = ring.clone();
                let consumed = consumed.clone();
                thread::spawn(move || {
                    let mut total = 0u64;
                    loop {
                        match ring.try_dequeue() {
                            Some(v) => {
                                total += v;
                                consumed.fetch_add(1, Ordering::Relaxed);
                            }
                            None => {
                                if consumed.load(Ordering::Relaxed) >= 8000 {
                                    break;
                                }
                                thread::yield_now();
                            }
                        }
                    }
                    total
                })
            })
            .collect();

        for p in producers {
            p.join().unwrap();
        }
        for c in consumers {
            c.join().unwrap();
        }
        assert_eq!(produced.load(Ordering::Relaxed), 8000);
        assert_eq!(consumed.load(Ordering::Relaxed), 8000);
    }
}
