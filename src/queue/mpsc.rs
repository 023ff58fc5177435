//! Unbounded MPSC queue built from a chain of bounded rings.
//!
//! A producer that finds the head segment full takes a lock, re-checks, and
//! links a fresh segment; the single consumer unlinks and frees a drained
//! tail segment as it crosses into the next one. Blocking dequeue waits on a
//! condvar; a "readers waiting" flag under the same mutex makes the
//! wake-after-enqueue handshake race-free.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::mpmc_ring::MpmcRing;

struct Segment<T> {
    ring: MpmcRing<T>,
    next: Mutex<Option<Arc<Segment<T>>>>,
}

impl<T> Segment<T> {
    fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            ring: MpmcRing::new(capacity).expect("segment capacity is a power of two"),
            next: Mutex::new(None),
        })
    }
}

/// An unbounded multi-producer single-consumer queue.
///
/// Despite the name, `try_dequeue`/`dequeue` are safe to call from more
/// than one thread (nothing here enforces single-consumer), but the
/// dispatcher only ever runs one consumer per queue (one strand thread, one
/// deferred-invocation drain).
pub struct Mpsc<T> {
    segment_capacity: usize,
    head: Mutex<Arc<Segment<T>>>,
    tail: Mutex<Arc<Segment<T>>>,
    readers_waiting: Mutex<bool>,
    not_empty: Condvar,
}

impl<T> Mpsc<T> {
    pub fn new(segment_capacity: usize) -> Self {
        let first = Segment::new(segment_capacity);
        Self {
            segment_capacity,
            head: Mutex::new(first.clone()),
            tail: Mutex::new(first),
            readers_waiting: Mutex::new(false),
            not_empty: Condvar::new(),
        }
    }

    pub fn enqueue(&self, value: T) {
        let mut value = value;
        loop {
            let head = self.head.lock().clone();
            match head.ring.try_enqueue(value) {
                Ok(()) => break,
                Err(back) => {
                    value = back;
                    let mut head_guard = self.head.lock();
                    if Arc::ptr_eq(&*head_guard, &head) {
                        let fresh = Segment::new(self.segment_capacity);
                        *head.next.lock() = Some(fresh.clone());
                        *head_guard = fresh;
                    }
                    // Otherwise another producer already linked a fresh
                    // segment; loop and retry against the new head.
                }
            }
        }
        self.wake_one_reader();
    }

    /// Non-blocking dequeue; `None` if the queue was empty at that instant.
    pub fn try_dequeue(&self) -> Option<T> {
        loop {
            let tail = self.tail.lock().clone();
            if let Some(v) = tail.ring.try_dequeue() {
                return Some(v);
            }
            let next = tail.next.lock().clone();
            match next {
                Some(next_seg) => {
                    let mut tail_guard = self.tail.lock();
                    if Arc::ptr_eq(&*tail_guard, &tail) {
                        *tail_guard = next_seg;
                    }
                }
                None => return None,
            }
        }
    }

    /// Blocks until an item is available.
    pub fn dequeue(&self) -> T {
        loop {
            if let Some(v) = self.try_dequeue() {
                return v;
            }
            let mut waiting = self.readers_waiting.lock();
            *waiting = true;
            if let Some(v) = self.try_dequeue() {
                *waiting = false;
                return v;
            }
            self.not_empty.wait(&mut waiting);
        }
    }

    fn wake_one_reader(&self) {
        let mut waiting = self.readers_waiting.lock();
        if *waiting {
            *waiting = false;
            self.not_empty.notify_one();
        }
    }
}
