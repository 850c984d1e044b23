//! Result shaping benchmarks against the in-memory store.
//!
//! Offsets are emulated by reading and discarding results, so page cost
//! grows with the offset.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use widerepo_bench::generate_playlists;
use widerepo_codec::Value;
use widerepo_core::{
    PageRequest, Part, PartKind, PredicateTree, QueryMethod, RepositoryConfig, ScanPolicy,
};
use widerepo_store::MemoryStoreConfig;
use widerepo_testkit::{numbered_playlists, playlist_repository, playlist_repository_with_store};

fn by_user() -> QueryMethod {
    QueryMethod::new("find_by_user", PredicateTree::and([Part::eq("user")]))
}

/// Benchmark slices at growing offsets.
fn bench_offsets(c: &mut Criterion) {
    let repo = playlist_repository(
        RepositoryConfig::new().fetch_size(100),
        &numbered_playlists("alice", 5_000),
    );
    let method = by_user();
    let args = [Value::from("alice")];
    let mut group = c.benchmark_group("slice_offset");

    for offset in [0usize, 100, 1_000, 4_900] {
        group.throughput(Throughput::Elements((offset + 20) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(offset), &offset, |b, &offset| {
            b.iter(|| {
                let slice = repo
                    .find_slice(&method, &args, PageRequest::new(offset, 20))
                    .unwrap();
                black_box(slice);
            });
        });
    }

    group.finish();
}

/// Benchmark page totals, which follow count continuations.
fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("count");

    for count_page_size in [100usize, 1_000] {
        let repo = playlist_repository_with_store(
            RepositoryConfig::default(),
            MemoryStoreConfig::new().count_page_size(count_page_size),
            &numbered_playlists("alice", 5_000),
        );
        let method = by_user();
        let args = [Value::from("alice")];

        group.bench_with_input(
            BenchmarkId::new("page_total", count_page_size),
            &count_page_size,
            |b, _| {
                b.iter(|| {
                    let page = repo
                        .find_page(&method, &args, PageRequest::of(0, 10))
                        .unwrap();
                    black_box(page.total);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a filtered scan over many partitions.
fn bench_scan(c: &mut Criterion) {
    let repo = playlist_repository(
        RepositoryConfig::new().scan(ScanPolicy::enabled()),
        &generate_playlists(50, 5_000),
    );
    let method = QueryMethod::new(
        "find_by_tags_containing",
        PredicateTree::and([Part::new("tags", PartKind::Containing)]),
    );
    let args = [Value::from("jazz")];

    c.bench_function("scan_contains", |b| {
        b.iter(|| black_box(repo.find_list(&method, &args).unwrap()));
    });
}

criterion_group!(benches, bench_offsets, bench_count, bench_scan);
criterion_main!(benches);
