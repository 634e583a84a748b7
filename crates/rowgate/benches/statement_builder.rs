use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rowgate::{FieldMap, SqlQb, Statement, qb};

/// A field map with `n` text columns: col0 = "value0", col1 = "value1", ...
fn fields(n: usize) -> FieldMap {
    (0..n)
        .map(|i| (format!("col{i}"), format!("value{i}")))
        .collect()
}

fn build_update(n: usize) -> Statement {
    qb::update("customers")
        .set_fields(fields(n))
        .eq("id", 1i64)
        .build()
        .expect("valid update")
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/build");

    for n in [1, 4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("insert", n), &n, |b, &n| {
            b.iter(|| {
                black_box(
                    qb::insert("customers")
                        .set_fields(fields(n))
                        .returning("id")
                        .build(),
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("update", n), &n, |b, &n| {
            b.iter(|| black_box(build_update(n)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/render");

    for n in [1, 4, 16, 64] {
        let stmt = build_update(n);
        group.bench_with_input(BenchmarkId::new("sql", n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.sql()));
        });
        group.bench_with_input(BenchmarkId::new("inline_sql", n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.inline_sql()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_render);
criterion_main!(benches);
