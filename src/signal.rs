//! The signal dispatcher: per-signal slot map, connect, disconnect, emit
//! on both the guarded and unguarded paths, the deferred queue, and
//! destruction.
//!
//! `Signal<Args>` is generic over one tuple-shaped type parameter standing
//! in for a fixed argument list. Rust has no variadic generics, so a single
//! `Args` (e.g. `(i32, i32)`, or `()` for no arguments) is the idiomatic
//! flattening of a variadic argument list.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::constants::{DEFAULT_MAX_ASYNC_INFLIGHT, MPSC_SEGMENT_CAPACITY};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::panic_guard::run_guarded;
use crate::pool;
use crate::queue::Mpsc;
use crate::scheme::Scheme;
use crate::slot::{SignalCallable, SlotEntry, SlotRecord, Thunk};
use crate::sync::{Semaphore, SharedLock};

/// Construction-time configuration for a [`Signal`].
///
/// A plain struct implementing `Default`, with `unguarded`/`guarded`
/// convenience constructors for the common cases.
#[derive(Debug, Clone, Copy)]
pub struct SignalConfig {
    /// Whether connect/disconnect use the back-buffered guarded path
    /// (required if a slot body may call back into the same signal) or
    /// mutate the live slot map directly.
    pub emission_guard: bool,
    /// Inflight cap for the asynchronous scheme's permit semaphore.
    pub max_async_inflight: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { emission_guard: false, max_async_inflight: DEFAULT_MAX_ASYNC_INFLIGHT }
    }
}

/// A typed dispatch point with a fixed argument tuple and a set of
/// attached slots.
pub struct Signal<Args> {
    emission_guard: bool,
    slots: SharedLock<BTreeMap<u32, SlotRecord<Args>>>,
    next_id: AtomicU32,
    connect_buffer: Mutex<BTreeMap<u32, (Scheme, SignalCallable<Args>)>>,
    /// Per-id liveness flags, tracked independently of `slots`. A guarded
    /// disconnect flips a flag here directly, without ever taking the
    /// `slots` lock, so it stays safe to call from inside a synchronous
    /// slot body that `emit` is already walking.
    alive_flags: Mutex<BTreeMap<u32, Arc<AtomicBool>>>,
    async_permits: Arc<Semaphore>,
    deferred_queue: OnceLock<Arc<Mpsc<(u32, Thunk)>>>,
    metrics: Arc<Metrics>,
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            emission_guard: config.emission_guard,
            slots: SharedLock::new(BTreeMap::new()),
            next_id: AtomicU32::new(0),
            connect_buffer: Mutex::new(BTreeMap::new()),
            alive_flags: Mutex::new(BTreeMap::new()),
            async_permits: Arc::new(Semaphore::new(config.max_async_inflight)),
            deferred_queue: OnceLock::new(),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// A signal with the default (unguarded) configuration. Connect and
    /// disconnect mutate the live slot map directly; a slot that calls back
    /// into the same signal from its own synchronous body will deadlock;
    /// use [`Signal::guarded`] instead.
    pub fn unguarded() -> Self {
        Self::new(SignalConfig { emission_guard: false, ..SignalConfig::default() })
    }

    /// A signal whose connect/disconnect back-buffer against concurrent or
    /// reentrant emission.
    pub fn guarded() -> Self {
        Self::new(SignalConfig { emission_guard: true, ..SignalConfig::default() })
    }

    /// Attaches `callable` under `scheme`, returning its id.
    pub fn connect<F>(&self, scheme: Scheme, callable: F) -> u32
    where
        F: Fn(Args) + Send + Sync + 'static,
    {
        let callable: SignalCallable<Args> = Arc::new(callable);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let alive = Arc::new(AtomicBool::new(true));
        self.alive_flags.lock().insert(id, alive.clone());
        if self.emission_guard {
            self.connect_buffer.lock().insert(id, (scheme, callable));
            tracing::trace!(id, ?scheme, "slot connect buffered");
        } else {
            let entry = self.build_entry(scheme, callable);
            self.slots.write().insert(id, SlotRecord::new(entry, alive));
            tracing::trace!(id, ?scheme, "slot connected");
        }
        id
    }

    /// Detaches the slot with `id`. Unknown ids are a silent no-op.
    pub fn disconnect(&self, id: u32) {
        if self.emission_guard {
            if let Some(alive) = self.alive_flags.lock().get(&id) {
                alive.store(false, Ordering::Release);
                tracing::trace!(id, "slot marked dead, pending next emission");
            }
        } else {
            let removed = self.slots.write().remove(&id);
            if let Some(mut record) = removed {
                Self::terminate_if_strand(&mut record);
                self.alive_flags.lock().remove(&id);
                tracing::trace!(id, "slot disconnected");
            }
        }
    }

    /// Detaches every slot, joining any strand consumer threads.
    pub fn disconnect_all(&self) {
        let taken = std::mem::take(&mut *self.slots.write());
        for (id, mut record) in taken {
            Self::terminate_if_strand(&mut record);
            self.alive_flags.lock().remove(&id);
        }
    }

    /// Emits `args` to every live slot in insertion order, dispatching each
    /// according to its scheme.
    pub fn emit(&self, args: Args) {
        self.metrics.record_emission();
        if self.emission_guard {
            self.reconcile_buffers();
        }
        let slots = self.slots.read();
        for (&id, record) in slots.iter() {
            if !record.is_alive() {
                continue;
            }
            self.dispatch(id, record, args.clone());
        }
    }

    /// Drains the deferred queue, running every thunk on the calling
    /// thread. Call from whichever thread should own deferred work;
    /// typically a loop's idle tick.
    pub fn invoke_deferred(&self) {
        let Some(queue) = self.deferred_queue.get() else {
            return;
        };
        while let Some((slot_id, thunk)) = queue.try_dequeue() {
            if self.emission_guard {
                let alive = {
                    let slots = self.slots.read();
                    slots.get(&slot_id).map(SlotRecord::is_alive).unwrap_or(false)
                };
                if !alive {
                    self.metrics.suppressed_dead_slot.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            }
            self.metrics.deferred_invoked.fetch_add(1, Ordering::Relaxed);
            thunk();
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn len(&self) -> usize {
        self.slots.read().iter().filter(|(_, r)| r.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build_entry(&self, scheme: Scheme, callable: SignalCallable<Args>) -> SlotEntry<Args> {
        match scheme {
            Scheme::Synchronous => SlotEntry::Sync { callable },
            Scheme::DeferredSynchronous => {
                self.deferred_queue.get_or_init(|| Arc::new(Mpsc::new(MPSC_SEGMENT_CAPACITY)));
                SlotEntry::Deferred { callable }
            }
            Scheme::Asynchronous => SlotEntry::Async { callable },
            Scheme::Strand => self.spawn_strand(callable),
            Scheme::ThreadPooled => {
                pool::global();
                SlotEntry::Pooled { callable }
            }
        }
    }

    fn spawn_strand(&self, callable: SignalCallable<Args>) -> SlotEntry<Args> {
        let queue: Arc<Mpsc<Option<Args>>> = Arc::new(Mpsc::new(MPSC_SEGMENT_CAPACITY));
        let consumer_queue = queue.clone();
        let consumer_callable = callable.clone();
        let handle = thread::Builder::new()
            .name("relay-signal-strand".to_string())
            .spawn(move || strand_consumer_loop(consumer_queue, consumer_callable))
            .expect("failed to spawn strand consumer thread");
        SlotEntry::Strand { callable, queue, handle: Some(handle) }
    }

    fn terminate_if_strand(record: &mut SlotRecord<Args>) {
        if let SlotEntry::Strand { queue, handle, .. } = &mut record.entry {
            queue.enqueue(None);
            if let Some(h) = handle.take() {
                let _ = h.join();
            }
        }
    }

    /// Guarded-path buffer reconciliation: drain the connect buffer one
    /// entry at a time, releasing the buffer lock around each insert since
    /// a synchronous slot's body may call back into `connect` on this same
    /// signal; then sweep slots marked dead.
    fn reconcile_buffers(&self) {
        loop {
            let next = self.connect_buffer.lock().pop_first();
            let Some((id, (scheme, callable))) = next else { break };
            let entry = self.build_entry(scheme, callable);
            let alive = self
                .alive_flags
                .lock()
                .entry(id)
                .or_insert_with(|| Arc::new(AtomicBool::new(true)))
                .clone();
            self.slots.write().insert(id, SlotRecord::new(entry, alive));
        }

        let dead_ids: Vec<u32> = {
            let slots = self.slots.read();
            slots.iter().filter(|(_, r)| !r.is_alive()).map(|(&id, _)| id).collect()
        };
        if dead_ids.is_empty() {
            return;
        }
        let mut removed_ids = Vec::with_capacity(dead_ids.len());
        {
            let mut slots = self.slots.write();
            for id in &dead_ids {
                if let Some(mut record) = slots.remove(id) {
                    Self::terminate_if_strand(&mut record);
                    removed_ids.push(*id);
                }
            }
        }
        let mut flags = self.alive_flags.lock();
        for id in removed_ids {
            flags.remove(&id);
        }
    }

    fn dispatch(&self, id: u32, record: &SlotRecord<Args>, args: Args) {
        match &record.entry {
            SlotEntry::Sync { callable } => {
                self.metrics.synchronous_invocations.fetch_add(1, Ordering::Relaxed);
                callable(args);
            }
            SlotEntry::Deferred { callable } => {
                let queue = self
                    .deferred_queue
                    .get()
                    .expect("deferred queue exists once a deferred slot is connected")
                    .clone();
                let callable = callable.clone();
                let thunk: Thunk = Box::new(move || callable(args));
                queue.enqueue((id, thunk));
                self.metrics.deferred_enqueued.fetch_add(1, Ordering::Relaxed);
            }
            SlotEntry::Async { callable } => {
                self.spawn_async(callable.clone(), record.alive.clone(), args);
            }
            SlotEntry::Strand { queue, .. } => {
                self.metrics.strand_enqueued.fetch_add(1, Ordering::Relaxed);
                queue.enqueue(Some(args));
            }
            SlotEntry::Pooled { callable } => {
                self.submit_pooled(callable.clone(), record.alive.clone(), args);
            }
        }
    }

    fn spawn_async(&self, callable: SignalCallable<Args>, alive: Arc<std::sync::atomic::AtomicBool>, args: Args) {
        self.async_permits.acquire();
        self.metrics.asynchronous_spawned.fetch_add(1, Ordering::Relaxed);
        let in_flight = self.async_permits.capacity() - self.async_permits.available();
        self.metrics.record_inflight(in_flight as u64);
        let permits = self.async_permits.clone();
        let metrics = self.metrics.clone();
        let emission_guard = self.emission_guard;
        let spawned = thread::Builder::new().name("relay-signal-async".to_string()).spawn(move || {
            if !emission_guard || alive.load(Ordering::Acquire) {
                run_guarded("asynchronous slot", move || callable(args));
            } else {
                metrics.suppressed_dead_slot.fetch_add(1, Ordering::Relaxed);
            }
            permits.release();
        });
        if spawned.is_err() {
            self.async_permits.release();
            tracing::error!("failed to spawn asynchronous slot worker");
        }
    }

    fn submit_pooled(&self, callable: SignalCallable<Args>, alive: Arc<std::sync::atomic::AtomicBool>, args: Args) {
        self.metrics.pooled_submitted.fetch_add(1, Ordering::Relaxed);
        let metrics = self.metrics.clone();
        let emission_guard = self.emission_guard;
        pool::global().submit(Box::new(move || {
            if emission_guard && !alive.load(Ordering::Acquire) {
                metrics.suppressed_dead_slot.fetch_add(1, Ordering::Relaxed);
                return;
            }
            callable(args);
        }));
    }
}

impl<Args: Clone + Send + 'static> Drop for Signal<Args> {
    /// Terminates every strand, then waits for every outstanding
    /// asynchronous invocation to release its permit. This is the
    /// dispatcher's sole join-point for detached async workers; it never
    /// tracks their thread handles directly.
    fn drop(&mut self) {
        let mut slots = self.slots.write();
        for (_, mut record) in std::mem::take(&mut *slots) {
            Self::terminate_if_strand(&mut record);
        }
        drop(slots);
        self.async_permits.acquire_all();
    }
}

fn strand_consumer_loop<Args: Send + 'static>(queue: Arc<Mpsc<Option<Args>>>, callable: SignalCallable<Args>) {
    let max_wait = pool::calibrate_max_wait();
    let mut wait = Duration::from_nanos(1);

    loop {
        match queue.try_dequeue() {
            Some(Some(args)) => {
                invoke_strand_slot(&callable, args);
                wait = Duration::from_nanos(1);
            }
            Some(None) => return,
            None => {
                thread::sleep(wait);
                wait = wait.saturating_mul(2);
                if wait > max_wait {
                    match queue.dequeue() {
                        Some(args) => invoke_strand_slot(&callable, args),
                        None => return,
                    }
                    wait = Duration::from_nanos(1);
                }
            }
        }
    }
}

fn invoke_strand_slot<Args>(callable: &SignalCallable<Args>, args: Args) {
    let callable = callable.clone();
    run_guarded("strand slot", move || callable(args));
}

/// Binds a method and an instance reference into a plain callable, since
/// Rust has no member-function-pointer type distinct from a capturing
/// closure. The caller must ensure `instance` outlives the connection.
pub fn bind_member<T, Args>(
    instance: Arc<T>,
    method: impl Fn(&T, Args) + Send + Sync + 'static,
) -> impl Fn(Args) + Send + Sync
where
    T: Send + Sync + 'static,
{
    move |args: Args| method(&instance, args)
}
