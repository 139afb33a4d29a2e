//! Routing benchmarks.
//!
//! Run with: `cargo bench -p lamina-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use lamina_router::{PathTemplate, RouteTable};

fn build_table(num_routes: usize) -> RouteTable<usize> {
    let mut table = RouteTable::new();
    let mut add = |path: String, id: usize| {
        let template = PathTemplate::parse(&path).expect("bench template");
        table.insert(Method::GET, template, id).expect("bench route");
    };

    for i in 0..num_routes / 3 {
        add(format!("/api/v1/resource{i}"), i);
    }
    for i in 0..num_routes / 3 {
        add(format!("/api/v1/resource{i}/{{id}}"), i);
    }
    for i in 0..num_routes / 3 {
        add(format!("/api/v1/org/{{org_id}}/resource{i}/{{id}}"), i);
    }

    table
}

fn bench_literal_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("literal_match", |b| {
        b.iter(|| black_box(table.lookup(&Method::GET, "/api/v1/resource30")));
    });
}

fn bench_capture_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("capture_match", |b| {
        b.iter(|| black_box(table.lookup(&Method::GET, "/api/v1/resource25/12345")));
    });
}

fn bench_nested_capture_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("nested_capture_match", |b| {
        b.iter(|| {
            black_box(table.lookup(&Method::GET, "/api/v1/org/acme-corp/resource10/12345"))
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(table.lookup(&Method::GET, "/api/v1/nonexistent/path")));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for num_routes in [10, 50, 100, 500, 1000] {
        let table = build_table(num_routes);

        group.bench_with_input(
            BenchmarkId::new("literal_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}", n / 6);
                b.iter(|| black_box(table.lookup(&Method::GET, &path)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("capture_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}/12345", n / 6);
                b.iter(|| black_box(table.lookup(&Method::GET, &path)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_literal_match,
    bench_capture_match,
    bench_nested_capture_match,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
