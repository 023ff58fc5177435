//! Bounded MPMC ring benchmarks
//!
//! Tests single-threaded round-trip cost and multi-producer/multi-consumer
//! throughput.
//!
//! Run: cargo bench --bench bench_mpmc_ring

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use relay_signal::queue::MpmcRing;

const RING_CAPACITY: usize = 1024;
const TOTAL_ITEMS: u64 = 1_000_000;

fn bench_single_threaded_round_trip(events: u64) {
    let ring = MpmcRing::<u64>::new(RING_CAPACITY).unwrap();
    for i in 0..events {
        while ring.try_enqueue(i).is_err() {
            std::hint::spin_loop();
        }
        loop {
            if let Some(v) = ring.try_dequeue() {
                black_box(v);
                break;
            }
            std::hint::spin_loop();
        }
    }
}

fn bench_concurrent(producers: usize, consumers: usize, events: u64) {
    let ring = Arc::new(MpmcRing::<u64>::new(RING_CAPACITY).unwrap());
    let per_producer = events / producers as u64;

    let producer_handles: Vec<_> = (0..producers)
        .map(|_| {
            let ring = ring.clone();
            thread::spawn(move || {
                for i in 0..per_producer {
                    while ring.try_enqueue(i).is_err() {
                        std::hint::spin_loop();
                    }
                }
            })
        })
        .collect();

    let consumer_handles: Vec<_> = (0..consumers)
        .map(|_| {
            let ring = ring.clone();
            thread::spawn(move || {
                let mut seen = 0u64;
                while seen < per_producer {
                    if let Some(v) = ring.try_dequeue() {
                        black_box(v);
                        seen += 1;
                    } else {
                        std::hint::spin_loop();
                    }
                }
            })
        })
        .collect();

    for h in producer_handles {
        h.join().unwrap();
    }
    for h in consumer_handles {
        h.join().unwrap();
    }
}

fn benchmark_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("MpmcRing round trip");
    group.throughput(Throughput::Elements(TOTAL_ITEMS));
    group.sample_size(20);

    group.bench_function(BenchmarkId::new("single-thread", "enqueue-dequeue"), |b| {
        b.iter(|| bench_single_threaded_round_trip(TOTAL_ITEMS))
    });

    group.finish();
}

fn benchmark_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("MpmcRing contention");
    group.throughput(Throughput::Elements(TOTAL_ITEMS));
    group.sample_size(10);

    for &(producers, consumers) in &[(1, 1), (2, 2), (4, 4)] {
        group.bench_function(BenchmarkId::new("producers-consumers", format!("{producers}x{consumers}")), |b| {
            b.iter(|| bench_concurrent(producers, consumers, TOTAL_ITEMS))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_round_trip, benchmark_contention);
criterion_main!(benches);
