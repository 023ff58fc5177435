//! Signal emit benchmarks
//!
//! Tests per-scheme dispatch cost: synchronous invocation overhead, and
//! enqueue cost for the schemes that hand work off to another thread.
//!
//! Run: cargo bench --bench bench_signal_emit

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use relay_signal::{Scheme, Signal};

const EMISSIONS: u64 = 200_000;

fn bench_synchronous(slots: usize) {
    let signal = Signal::<i64>::unguarded();
    let total = Arc::new(AtomicI64::new(0));
    for _ in 0..slots {
        let t = total.clone();
        signal.connect(Scheme::Synchronous, move |v| {
            t.fetch_add(v, Ordering::Relaxed);
        });
    }
    for i in 0..EMISSIONS as i64 {
        signal.emit(black_box(i));
    }
}

fn bench_deferred_enqueue(slots: usize) {
    let signal = Signal::<i64>::unguarded();
    for _ in 0..slots {
        signal.connect(Scheme::DeferredSynchronous, |v| {
            black_box(v);
        });
    }
    for i in 0..EMISSIONS as i64 {
        signal.emit(black_box(i));
    }
    signal.invoke_deferred();
}

fn bench_thread_pooled_submit(slots: usize) {
    let signal = Signal::<i64>::unguarded();
    let total = Arc::new(AtomicI64::new(0));
    for _ in 0..slots {
        let t = total.clone();
        signal.connect(Scheme::ThreadPooled, move |v| {
            t.fetch_add(v, Ordering::Relaxed);
        });
    }
    for i in 0..(EMISSIONS / 10) as i64 {
        signal.emit(black_box(i));
    }
}

fn benchmark_synchronous(c: &mut Criterion) {
    let mut group = c.benchmark_group("Signal emit: synchronous");
    group.throughput(Throughput::Elements(EMISSIONS));
    group.sample_size(20);

    for &slots in &[1usize, 4, 16] {
        group.bench_function(BenchmarkId::new("slots", slots), |b| b.iter(|| bench_synchronous(slots)));
    }

    group.finish();
}

fn benchmark_deferred(c: &mut Criterion) {
    let mut group = c.benchmark_group("Signal emit: deferred enqueue + drain");
    group.throughput(Throughput::Elements(EMISSIONS));
    group.sample_size(20);

    group.bench_function(BenchmarkId::new("slots", 1), |b| b.iter(|| bench_deferred_enqueue(1)));

    group.finish();
}

fn benchmark_thread_pooled(c: &mut Criterion) {
    let mut group = c.benchmark_group("Signal emit: thread pooled submit");
    group.throughput(Throughput::Elements(EMISSIONS / 10));
    group.sample_size(10);

    group.bench_function(BenchmarkId::new("slots", 1), |b| b.iter(|| bench_thread_pooled_submit(1)));

    group.finish();
}

criterion_group!(benches, benchmark_synchronous, benchmark_deferred, benchmark_thread_pooled);
criterion_main!(benches);
