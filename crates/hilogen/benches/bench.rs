use core::hint::black_box;
use core::time::Duration;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use hilogen::{
    AtomicHiLoGenerator, BasicHiLoGenerator, FixedSleeper, HiLoGenerator, HiSource,
    IdGeneratorBuilder, InMemoryHiSource, Layout, LockHiLoGenerator, StampedHiLoGenerator,
    Strategy,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

// Number of IDs generated per benchmark iteration (split across threads for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

// Rollovers are rare with this capacity, so the fast path dominates.
const WIDE: i64 = 1024;

// Every 16th ID needs a new hi value.
const NARROW: i64 = 16;

fn wide() -> Layout {
    Layout::hilo(WIDE).unwrap()
}

fn narrow() -> Layout {
    Layout::hilo(NARROW).unwrap()
}

/// Benchmarks a generator driven from a single thread.
fn bench_generator<G, S>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: HiLoGenerator<S>,
    S: HiSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.try_generate().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a generator shared across threads.
fn bench_generator_contended<G, S>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> G,
) where
    G: HiLoGenerator<S> + Send + Sync,
    S: HiSource,
{
    let mut group = c.benchmark_group(group_name);

    let mut thread_counts = vec![1, 2, 4, 8, 16];
    let cpus = num_cpus::get();
    if !thread_counts.contains(&cpus) {
        thread_counts.push(cpus);
        thread_counts.sort_unstable();
    }

    for thread_count in thread_counts {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements((ids_per_thread * thread_count) as u64));
        group.bench_function(
            format!("elems/{}/threads/{}", TOTAL_IDS, thread_count),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let generator = Arc::new(generator_fn());
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let generator = Arc::clone(&generator);
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(generator.try_generate().unwrap());
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

// --- WIDE (capacity 1024, in-memory source) ---

fn benchmark_wide_sequential_basic(c: &mut Criterion) {
    bench_generator(c, "wide/sequential/basic", || {
        BasicHiLoGenerator::new(wide(), InMemoryHiSource::default())
    });
}

fn benchmark_wide_sequential_lock(c: &mut Criterion) {
    bench_generator(c, "wide/sequential/lock", || {
        LockHiLoGenerator::new(wide(), InMemoryHiSource::default())
    });
}

fn benchmark_wide_sequential_atomic(c: &mut Criterion) {
    bench_generator(c, "wide/sequential/atomic", || {
        AtomicHiLoGenerator::new(wide(), InMemoryHiSource::default())
    });
}

fn benchmark_wide_sequential_stamped(c: &mut Criterion) {
    bench_generator(c, "wide/sequential/stamped", || {
        StampedHiLoGenerator::new(wide(), InMemoryHiSource::default())
    });
}

fn benchmark_wide_contended_lock(c: &mut Criterion) {
    bench_generator_contended(c, "wide/contended/lock", || {
        LockHiLoGenerator::new(wide(), InMemoryHiSource::default())
    });
}

fn benchmark_wide_contended_atomic(c: &mut Criterion) {
    bench_generator_contended(c, "wide/contended/atomic", || {
        AtomicHiLoGenerator::new(wide(), InMemoryHiSource::default())
    });
}

fn benchmark_wide_contended_stamped(c: &mut Criterion) {
    bench_generator_contended(c, "wide/contended/stamped", || {
        StampedHiLoGenerator::new(wide(), InMemoryHiSource::default())
    });
}

/// Runtime strategy dispatch through `IdGenerator`.
fn benchmark_wide_contended_facade(c: &mut Criterion) {
    bench_generator_contended(c, "wide/contended/facade", || {
        IdGeneratorBuilder::new(WIDE)
            .strategy(Strategy::Optimistic)
            .build(InMemoryHiSource::default())
            .unwrap()
    });
}

// --- NARROW (capacity 16, source sleeps 10µs per hi value) ---

fn slow_source() -> InMemoryHiSource<FixedSleeper> {
    InMemoryHiSource::default().with_sleeper(FixedSleeper::new(Duration::from_micros(10)))
}

fn benchmark_narrow_contended_lock(c: &mut Criterion) {
    bench_generator_contended(c, "narrow/contended/lock", || {
        LockHiLoGenerator::new(narrow(), slow_source())
    });
}

fn benchmark_narrow_contended_atomic(c: &mut Criterion) {
    bench_generator_contended(c, "narrow/contended/atomic", || {
        AtomicHiLoGenerator::new(narrow(), slow_source())
    });
}

fn benchmark_narrow_contended_stamped(c: &mut Criterion) {
    bench_generator_contended(c, "narrow/contended/stamped", || {
        StampedHiLoGenerator::new(narrow(), slow_source())
    });
}

criterion_group!(
    benches,
    // Fast path
    benchmark_wide_sequential_basic,
    benchmark_wide_sequential_lock,
    benchmark_wide_sequential_atomic,
    benchmark_wide_sequential_stamped,
    benchmark_wide_contended_lock,
    benchmark_wide_contended_atomic,
    benchmark_wide_contended_stamped,
    benchmark_wide_contended_facade,
    // Rollover heavy
    benchmark_narrow_contended_lock,
    benchmark_narrow_contended_atomic,
    benchmark_narrow_contended_stamped,
);
criterion_main!(benches);
