use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qbd::builder::{select, update};
use qbd::{Dialect, QueryBuilder, Value, args, shift_placeholders};

/// SELECT with `n` WHERE fragments, an IN list and LIMIT/OFFSET.
fn build_select(dialect: Dialect, n: usize) -> QueryBuilder {
    let mut qb = select(dialect, "events e", &["e.id", "e.kind", "e.created_at"]);
    for i in 0..n {
        qb = qb.and_where("e.attr_value <> ?", args![i as i64]);
    }
    qb.where_in("e.source", (0..8).map(Value::from).collect())
        .order_by("created_at", "desc", None)
        .limit(50)
        .offset(100)
}

/// UPDATE with `n` SET columns and `n` WHERE fragments (exercises renumbering).
fn build_update(n: usize) -> QueryBuilder {
    let set: Vec<(String, Value)> = (0..n).map(|i| (format!("c{i:03}"), Value::from(i as i64))).collect();
    let mut qb = update(Dialect::Postgres, "wide").set(set);
    for i in 0..n {
        qb = qb.and_where("k = ?", args![i as i64]);
    }
    qb
}

fn bench_render_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/render_select");

    for n in [1, 10, 50, 100] {
        for dialect in [Dialect::Postgres, Dialect::MySql] {
            let qb = build_select(dialect, n);
            group.bench_with_input(
                BenchmarkId::new(dialect.name(), n),
                &qb,
                |b, qb| b.iter(|| black_box(qb.build())),
            );
        }
    }

    group.finish();
}

fn bench_chain_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/chain_and_render");

    for n in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(Dialect::Postgres, n).build()));
        });
    }

    group.finish();
}

fn bench_render_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/render_update");

    for n in [5, 20, 100] {
        let qb = build_update(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.build()));
        });
    }

    group.finish();
}

fn bench_shift_placeholders(c: &mut Criterion) {
    let fragment = (1..=40)
        .map(|i| format!("col{i} = ${i}"))
        .collect::<Vec<_>>()
        .join(" AND ");

    c.bench_function("placeholder/shift_40", |b| {
        b.iter(|| black_box(shift_placeholders(black_box(&fragment), 12)));
    });
}

criterion_group!(
    benches,
    bench_render_select,
    bench_chain_and_render,
    bench_render_update,
    bench_shift_placeholders
);
criterion_main!(benches);
