//! Benchmarks for the DI container

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use yedi::{Args, Container, Scope, Service};

#[allow(dead_code)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

#[allow(dead_code)]
struct Config {
    debug: bool,
}

#[allow(dead_code)]
struct Repository {
    config: Arc<Config>,
}

#[allow(dead_code)]
struct Handler {
    repository: Arc<Repository>,
    config: Arc<Config>,
}

impl Service for Handler {
    type Dependencies = (Arc<Repository>, Arc<Config>);
    const PARAMETERS: &'static [&'static str] = &["repository", "config"];

    fn create((repository, config): Self::Dependencies) -> Self {
        Handler { repository, config }
    }
}

/// Three-level graph: Handler -> Repository -> Config
fn graph(scope: Scope) -> Container {
    let container = Container::new();
    container
        .provide_fn(Scope::Singleton, || Config { debug: false })
        .provide_fn(scope, |config: Arc<Config>| Repository { config })
        .provide::<Handler>(scope);
    container
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("instance", |b| {
        b.iter(|| {
            let container = Container::new();
            container.provide_instance(SmallService { value: 42 });
            black_box(container)
        })
    });

    group.bench_function("factory", |b| {
        b.iter(|| {
            let container = Container::new();
            container.provide_fn(Scope::Singleton, || SmallService { value: 42 });
            black_box(container)
        })
    });

    group.bench_function("constructor", |b| {
        b.iter(|| {
            let container = Container::new();
            container.provide::<Handler>(Scope::Transient);
            black_box(container)
        })
    });

    group.bench_function("graph_3", |b| b.iter(|| black_box(graph(Scope::Transient))));

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    let container = Container::new();
    container
        .provide_instance(SmallService { value: 42 })
        .provide_fn(Scope::Singleton, || MediumService {
            name: "test".to_string(),
            values: vec![1, 2, 3, 4, 5],
        });
    // Warm the singleton
    let _ = container.get::<MediumService>();

    group.bench_function("get_instance", |b| {
        b.iter(|| black_box(container.get::<SmallService>().unwrap()))
    });

    group.bench_function("get_singleton", |b| {
        b.iter(|| black_box(container.get::<MediumService>().unwrap()))
    });

    group.bench_function("contains_check", |b| {
        b.iter(|| black_box(container.contains::<SmallService>()))
    });

    group.bench_function("try_get_not_found", |b| {
        b.iter(|| black_box(container.try_get::<Config>()))
    });

    let singletons = graph(Scope::Singleton);
    let _ = singletons.get::<Handler>();

    group.bench_function("get_singleton_graph", |b| {
        b.iter(|| black_box(singletons.get::<Handler>().unwrap()))
    });

    group.finish();
}

fn bench_transient_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient");
    group.throughput(Throughput::Elements(1));

    let container = Container::new();
    container.provide_fn(Scope::Transient, || SmallService { value: 42 });

    group.bench_function("get_transient", |b| {
        b.iter(|| black_box(container.get::<SmallService>().unwrap()))
    });

    let transients = graph(Scope::Transient);

    group.bench_function("get_transient_graph", |b| {
        b.iter(|| black_box(transients.get::<Handler>().unwrap()))
    });

    group.finish();
}

fn bench_injection(c: &mut Criterion) {
    let mut group = c.benchmark_group("injection");
    group.throughput(Throughput::Elements(1));

    let container = graph(Scope::Singleton);

    let injected = container
        .inject(|handler: Arc<Handler>, id: u32| handler.config.debug || id > 0)
        .named(["handler", "id"]);

    group.bench_function("function_named_arg", |b| {
        b.iter(|| black_box(injected.call(Args::new().with("id", 7u32)).unwrap()))
    });

    group.bench_function("function_positional_arg", |b| {
        let handler = container.get::<Handler>().unwrap();
        b.iter(|| {
            let args = Args::new().arg_shared(Arc::clone(&handler)).arg(7u32);
            black_box(injected.call(args).unwrap())
        })
    });

    let constructor = container.inject_type::<Handler>();

    group.bench_function("constructor", |b| {
        b.iter(|| black_box(constructor.create(Args::new()).unwrap()))
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("concurrent_reads_4", |b| {
        let container = graph(Scope::Singleton);

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let c = container.clone();
                    thread::spawn(move || {
                        for _ in 0..100 {
                            let _ = c.get::<Handler>().unwrap();
                        }
                    })
                })
                .collect();

            for h in handles {
                h.join().unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_resolution,
    bench_transient_resolution,
    bench_injection,
    bench_concurrent,
);

criterion_main!(benches);
