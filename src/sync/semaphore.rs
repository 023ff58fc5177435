//! Counting semaphore.
//!
//! Bounds the number of simultaneously in-flight asynchronous slot workers
//! per signal. Built on `parking_lot`'s `Mutex` + `Condvar`.

use parking_lot::{Condvar, Mutex};

pub struct Semaphore {
    state: Mutex<u32>,
    condvar: Condvar,
    initial: u32,
}

impl Semaphore {
    pub fn new(permits: u32) -> Self {
        Self {
            state: Mutex::new(permits),
            condvar: Condvar::new(),
            initial: permits,
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn acquire(&self) {
        let mut count = self.state.lock();
        while *count == 0 {
            self.condvar.wait(&mut count);
        }
        *count -= 1;
    }

    /// Returns a permit and wakes one waiter.
    pub fn release(&self) {
        let mut count = self.state.lock();
        *count += 1;
        self.condvar.notify_one();
    }

    /// Acquires the semaphore's full initial count, one permit at a time.
    /// Used at signal destruction to block until every outstanding
    /// asynchronous worker has returned its permit.
    pub fn acquire_all(&self) {
        for _ in 0..self.initial {
            self.acquire();
        }
    }

    /// Current available permit count (diagnostic only; racy by nature).
    pub fn available(&self) -> u32 {
        *self.state.lock()
    }

    /// The permit count passed to [`Semaphore::new`].
    pub fn capacity(&self) -> u32 {
        self.initial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn acquire_then_release_restores_capacity() {
        let sem = Semaphore::new(2);
        sem.acquire();
        sem.acquire();
        assert_eq!(sem.available(), 0);
        sem.release();
        assert_eq!(sem.available(), 1);
    }

    #[test]
    fn acquire_blocks_until_release() {
        let sem = Arc::new(Semaphore::new(1));
        sem.acquire();

        let unblocked = Arc::new(AtomicUsize::new(0));
        let sem2 = sem.clone();
        let unblocked2 = unblocked.clone();
        let handle = thread::spawn(move || {
            sem2.acquire();
            unblocked2.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(20));
        assert_eq!(unblocked.load(Ordering::SeqCst), 0);

        sem.release();
        handle.join().unwrap();
        assert_eq!(unblocked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn acquire_all_drains_every_permit() {
        let sem = Semaphore::new(4);
        sem.acquire_all();
        assert_eq!(sem.available(), 0);
    }
}
