use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_scopes::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_hit_by_kind(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_by_kind");

    for kind in ScopeKind::available() {
        let scope = kind.build::<Key, Arc<u64>>();
        let key = key_of_type::<u64>();
        scope.set(key, Arc::new(42));

        group.bench_function(kind.as_str(), |b| {
            b.iter(|| {
                let v = scope.get(black_box(&key));
                black_box(v.is_ok());
            })
        });
    }

    group.finish();
}

fn bench_set_overwrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_overwrite");

    let process = ProcessScope::<Key, Arc<u64>>::new();
    let thread = ThreadScope::<Key, Arc<u64>>::new();
    let value = Arc::new(7u64);
    let key = key_of_named::<u64>("bench");

    group.bench_function("process", |b| {
        b.iter(|| process.set(key, value.clone()))
    });
    group.bench_function("thread", |b| {
        b.iter(|| thread.set(key, value.clone()))
    });

    group.finish();
}

fn bench_miss_then_build(c: &mut Criterion) {
    // The container path for a cold key: miss, build, store.
    c.bench_function("process_miss_then_build", |b| {
        b.iter_batched(
            ProcessScope::<Key, Arc<Vec<u64>>>::new,
            |scope| {
                let key = key_of_type::<Vec<u64>>();
                if scope.get(&key).is_err() {
                    scope.set(key, Arc::new((0..64).collect()));
                }
                black_box(scope.get(&key).is_ok());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let process = ProcessScope::<Key, Arc<u64>>::new();
    let thread = ThreadScope::<Key, Arc<u64>>::new();
    let key = key_of_type::<u64>();
    process.set(key, Arc::new(42));

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("process_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let scope = &process;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    black_box(scope.get(&key).is_ok());
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("thread_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let scope = &thread;
                            s.spawn(move |_| {
                                scope.set(key, Arc::new(1));
                                for _ in 0..iters / threads as u64 {
                                    black_box(scope.get(&key).is_ok());
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

#[cfg(feature = "async")]
fn bench_task_scope(c: &mut Criterion) {
    let scope = TaskScope::<Key, Arc<u64>>::new();
    let key = key_of_type::<u64>();

    context::Context::new().run(|| {
        scope.set(key, Arc::new(42));
        c.bench_function("task_hit_in_context", |b| {
            b.iter(|| black_box(scope.get(&key).is_ok()))
        });
        c.bench_function("context_capture", |b| {
            b.iter(|| black_box(context::Context::current().len()))
        });
    });
}

#[cfg(not(feature = "async"))]
fn bench_task_scope(_c: &mut Criterion) {}

criterion_group!(
    micro_benches,
    bench_hit_by_kind,
    bench_set_overwrite,
    bench_miss_then_build,
    bench_task_scope
);

criterion_group!(macro_benches, bench_contention);

criterion_main!(micro_benches, macro_benches);
