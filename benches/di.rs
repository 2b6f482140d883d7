use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use iotlogic_di::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(42u64);
    let sp = sc.build().unwrap();

    // Prime the singleton
    let _ = sp.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = sp.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct FirmwareIndex {
        blocks: Vec<u64>,
    }

    c.bench_function("singleton_cold_firmware_index", |b| {
        b.iter_batched(
            || {
                let mut sc = ServiceCollection::new();
                sc.add_singleton_factory::<FirmwareIndex, _>(deps![], |_| {
                    Ok(FirmwareIndex { blocks: (0..1000).collect() })
                });
                sc.build().unwrap()
            },
            |sp| {
                let v = sp.get::<FirmwareIndex>().unwrap();
                black_box(v.blocks.len());
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_scoped_vs_transient(c: &mut Criterion) {
    struct Session {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("scoped_vs_transient");

    let mut sc_scoped = ServiceCollection::new();
    sc_scoped.add_scoped_factory::<Session, _>(deps![], |_| Ok(Session { data: [0; 64] }));
    let sp_scoped = sc_scoped.build().unwrap();
    let scope = sp_scoped.create_scope();
    let _ = scope.get::<Session>().unwrap();

    group.bench_function("scoped_hit", |b| {
        b.iter(|| black_box(scope.get::<Session>().unwrap().data[0]))
    });

    let mut sc_transient = ServiceCollection::new();
    sc_transient.add_transient_factory::<Session, _>(deps![], |_| Ok(Session { data: [0; 64] }));
    let sp_transient = sc_transient.build().unwrap();

    group.bench_function("transient", |b| {
        b.iter(|| black_box(sp_transient.get::<Session>().unwrap().data[0]))
    });

    group.finish();
}

// ===== Graph Benchmarks =====

const NAMES: [&str; 16] = [
    "l0", "l1", "l2", "l3", "l4", "l5", "l6", "l7", "l8", "l9", "l10", "l11", "l12", "l13", "l14", "l15",
];

struct Layer(u64);

fn transient_chain(depth: usize) -> ServiceProvider {
    let mut sc = ServiceCollection::new();
    sc.add_named_factory::<Layer, _>(NAMES[0], Lifetime::Transient, deps![], |_| Ok(Layer(0)));
    for i in 1..depth {
        sc.add_named_factory::<Layer, _>(NAMES[i], Lifetime::Transient, [Key::named::<Layer>(NAMES[i - 1])], |d| {
            Ok(Layer(d.get::<Layer>(0)?.0 + 1))
        });
    }
    sc.build().unwrap()
}

fn bench_transient_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient_chain");
    for depth in [1usize, 4, 16] {
        let sp = transient_chain(depth);
        let top = NAMES[depth - 1];
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(sp.get_named::<Layer>(top).unwrap().0))
        });
    }
    group.finish();
}

fn bench_build_and_validate(c: &mut Criterion) {
    c.bench_function("build_chain_16", |b| b.iter(|| black_box(transient_chain(16))));
}

// ===== Concurrency =====

fn bench_contended_singleton(c: &mut Criterion) {
    struct Adapter;

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<Adapter, _>(deps![], |_| Ok(Adapter));
    let sp = sc.build().unwrap();
    let _ = sp.get::<Adapter>().unwrap();

    c.bench_function("contended_singleton_4_threads", |b| {
        b.iter(|| {
            crossbeam_utils::thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|_| {
                        for _ in 0..100 {
                            black_box(sp.get::<Adapter>().unwrap());
                        }
                    });
                }
            })
            .unwrap();
        })
    });
}

fn bench_observer_overhead(c: &mut Criterion) {
    struct Gadget;

    let metrics = Arc::new(MetricsObserver::new());
    let mut sc = ServiceCollection::new();
    sc.add_observer(metrics.clone());
    sc.add_transient_factory::<Gadget, _>(deps![], |_| Ok(Gadget));
    let sp = sc.build().unwrap();

    c.bench_function("transient_with_metrics_observer", |b| {
        b.iter(|| black_box(sp.get::<Gadget>().unwrap()))
    });
    black_box(metrics.construction_count());
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_scoped_vs_transient,
    bench_transient_chain,
    bench_build_and_validate,
    bench_contended_singleton,
    bench_observer_overhead
);
criterion_main!(benches);
