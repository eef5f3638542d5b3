use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use multiqueue::{ConcurrentPriorityQueue, LockedQueue, MultiQueue};

const THREADS: usize = 4;
const OPS_PER_THREAD: u64 = 2_000;

fn prefilled<Q: ConcurrentPriorityQueue<u64>>(queue: Q, n: u64) -> Q {
    for value in 0..n {
        queue.insert(value);
    }
    queue
}

fn insert_delete(c: &mut Criterion) {
    let multi = prefilled(MultiQueue::new(THREADS, 2).unwrap(), 50_000);
    let locked = prefilled(LockedQueue::new(100_000), 50_000);

    let mut group = c.benchmark_group("insert_delete");
    group.bench_function("multiqueue", |b| {
        b.iter(|| {
            multi.insert(black_box(10));
            black_box(multi.delete_min().unwrap());
        })
    });
    group.bench_function("locked", |b| {
        b.iter(|| {
            locked.insert(black_box(10));
            black_box(locked.delete_min().unwrap());
        })
    });
    group.finish();
}

/// Every thread alternates inserts and deletes on the shared queue.
fn run_contended<Q: ConcurrentPriorityQueue<u64>>(queue: &Arc<Q>, threads: usize) {
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let queue = Arc::clone(queue);
            thread::spawn(move || {
                for k in 0..OPS_PER_THREAD {
                    queue.insert(k * threads as u64 + t as u64);
                    black_box(queue.delete_min().ok());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("bench thread panicked");
    }
}

fn contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");
    for threads in [1, 2, THREADS, 2 * THREADS] {
        let multi = Arc::new(prefilled(MultiQueue::new(threads, 2).unwrap(), 10_000));
        group.bench_with_input(BenchmarkId::new("multiqueue", threads), &threads, |b, &threads| {
            b.iter(|| run_contended(&multi, threads))
        });

        let locked = Arc::new(prefilled(LockedQueue::new(20_000), 10_000));
        group.bench_with_input(BenchmarkId::new("locked", threads), &threads, |b, &threads| {
            b.iter(|| run_contended(&locked, threads))
        });
    }
    group.finish();
}

criterion_group!(benches, insert_delete, contended);
criterion_main!(benches);
