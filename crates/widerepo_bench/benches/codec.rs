//! Condition compilation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use time::macros::datetime;
use widerepo_codec::{format_iso_utc, to_attribute_value, ComparisonOperator, Value};
use widerepo_core::ConditionCompiler;
use widerepo_testkit::{playlist_id, playlist_metadata};

/// Benchmark encoding primitive values.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    group.bench_function("text", |b| {
        let value = Value::from("alice");
        b.iter(|| black_box(to_attribute_value(black_box(&value)).unwrap()));
    });

    group.bench_function("integer", |b| {
        let value = Value::Integer(42);
        b.iter(|| black_box(to_attribute_value(black_box(&value)).unwrap()));
    });

    group.bench_function("date_zoned", |b| {
        let date = datetime!(2024-02-01 09:00:00.123 +09:00);
        b.iter(|| black_box(format_iso_utc(black_box(date)).unwrap()));
    });

    group.bench_function("string_set", |b| {
        let value = Value::string_set(["rock", "jazz", "indie", "ambient"]);
        b.iter(|| black_box(to_attribute_value(black_box(&value)).unwrap()));
    });

    group.finish();
}

/// Benchmark compiling conditions through property metadata.
fn bench_compile(c: &mut Criterion) {
    let metadata = playlist_metadata();
    let compiler = ConditionCompiler::new(&metadata);
    let mut group = c.benchmark_group("compile");

    group.bench_function("marshalled_date", |b| {
        let args = [Value::Date(datetime!(2024-02-01 09:00 +09:00))];
        b.iter(|| {
            black_box(
                compiler
                    .compile("created", ComparisonOperator::Ge, black_box(&args))
                    .unwrap(),
            )
        });
    });

    group.bench_function("between", |b| {
        let args = [Value::Integer(5), Value::Integer(25)];
        b.iter(|| {
            black_box(
                compiler
                    .compile("plays", ComparisonOperator::Between, black_box(&args))
                    .unwrap(),
            )
        });
    });

    group.bench_function("in_list_16", |b| {
        let args = [Value::List((0..16).map(Value::Integer).collect())];
        b.iter(|| {
            black_box(
                compiler
                    .compile("plays", ComparisonOperator::In, black_box(&args))
                    .unwrap(),
            )
        });
    });

    group.bench_function("composite_id", |b| {
        let args = [playlist_id("alice", "mix1")];
        b.iter(|| {
            black_box(
                compiler
                    .compile("id", ComparisonOperator::Eq, black_box(&args))
                    .unwrap(),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_compile);
criterion_main!(benches);
