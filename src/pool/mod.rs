//! Wheeled thread pool.
//!
//! A fixed number of spokes, each an unbounded MPSC queue of thunks with its
//! own dedicated consumer thread. Submission picks a spoke round-robin via
//! [`crate::sync::Wheel`]; consumers adapt their wait between iterations,
//! starting with a spin-free non-blocking dequeue, then sleeping with a
//! doubling backoff, then falling back to a blocking dequeue once the
//! backoff exceeds a threshold calibrated at thread startup.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::constants::{POOL_SEGMENT_CAPACITY, POOL_SPOKE_COUNT};
use crate::panic_guard::run_guarded;
use crate::queue::Mpsc;
use crate::sync::Wheel;
use crate::timer::calibrate;

type Thunk = Box<dyn FnOnce() + Send + 'static>;

static GLOBAL: OnceLock<Pool> = OnceLock::new();

/// Returns the process-wide pool, starting it on first use. Users never
/// configure this pool directly; it exists the moment the first pooled
/// slot is connected to any signal.
pub fn global() -> &'static Pool {
    GLOBAL.get_or_init(|| Pool::start(POOL_SPOKE_COUNT, POOL_SEGMENT_CAPACITY))
}

/// A wheeled pool of consumer threads draining per-spoke thunk queues.
pub struct Pool {
    wheel: Wheel<Arc<Mpsc<Option<Thunk>>>>,
    handles: parking_lot::Mutex<Vec<JoinHandle<()>>>,
    submitted: AtomicUsize,
}

impl Pool {
    /// Starts `spoke_count` consumer threads, each backed by a queue with
    /// the given segment capacity.
    pub fn start(spoke_count: usize, segment_capacity: usize) -> Self {
        let queues: Vec<Arc<Mpsc<Option<Thunk>>>> =
            (0..spoke_count).map(|_| Arc::new(Mpsc::new(segment_capacity))).collect();
        let wheel = Wheel::new(queues);

        let handles = (0..spoke_count)
            .map(|i| {
                let queue = wheel.spoke(i).clone();
                thread::Builder::new()
                    .name(format!("relay-signal-pool-{i}"))
                    .spawn(move || consumer_loop(queue))
                    .expect("failed to spawn pool consumer thread")
            })
            .collect();

        tracing::debug!(spoke_count, segment_capacity, "wheeled thread pool started");
        Self { wheel, handles: parking_lot::Mutex::new(handles), submitted: AtomicUsize::new(0) }
    }

    /// Submits a thunk onto the next spoke in round-robin order.
    pub fn submit(&self, thunk: Thunk) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.wheel.next_spoke().enqueue(Some(thunk));
    }

    pub fn spoke_count(&self) -> usize {
        self.wheel.len()
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Enqueues a terminator on every spoke and joins every consumer
    /// thread. Only used by tests and by pools constructed with
    /// [`Pool::start`] directly; the process-wide [`global`] pool is never
    /// shut down, since it lives for the life of the process.
    pub fn shutdown(&self) {
        for spoke in self.wheel.iter() {
            spoke.enqueue(None);
        }
        for handle in self.handles.lock().drain(..) {
            let _ = handle.join();
        }
    }
}

fn consumer_loop(queue: Arc<Mpsc<Option<Thunk>>>) {
    let max_wait = calibrate_max_wait();
    let mut wait = Duration::from_nanos(1);

    loop {
        match queue.try_dequeue() {
            Some(Some(thunk)) => {
                run_guarded("pooled slot", thunk);
                wait = Duration::from_nanos(1);
            }
            Some(None) => return,
            None => {
                thread::sleep(wait);
                wait = wait.saturating_mul(2);
                if wait > max_wait {
                    match queue.dequeue() {
                        Some(thunk) => run_guarded("pooled slot", thunk),
                        None => return,
                    }
                    wait = Duration::from_nanos(1);
                }
            }
        }
    }
}

/// Times one blocking enqueue/dequeue round-trip on a throwaway probe queue
/// and doubles it, giving each consumer a self-calibrated spin→block
/// threshold instead of a hardcoded constant. The probe is independent of
/// the element type: what's measured is the latency of the `parking_lot`
/// mutex/condvar handshake itself, not anything about `T`. Shared by the
/// strand consumer loop in [`crate::signal`].
pub(crate) fn calibrate_max_wait() -> Duration {
    let probe: Mpsc<()> = Mpsc::new(2);
    let elapsed = calibrate(|| {
        probe.enqueue(());
        let _ = probe.dequeue();
    });
    (elapsed * 2).max(Duration::from_micros(1))
}
