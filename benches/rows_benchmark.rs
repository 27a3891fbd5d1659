//! Performance benchmarks for the row view computation.
//!
//! Covers the cold path (full recompute) across thread counts and the warm
//! path (cache hit on an unchanged snapshot). Run with: cargo bench

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use weft::models::ThreadSummary;
use weft::rows::{OrganizeOptions, RowViewCache, SortOrder};

fn timestamp(offset: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(offset as i64)
}

/// Build `count` threads where every third thread is a subagent child of the
/// previous root, so the hierarchy has real depth to resolve.
fn generate_threads(count: usize) -> (Vec<ThreadSummary>, HashMap<String, String>) {
    let mut threads = Vec::with_capacity(count);
    let mut parents = HashMap::new();
    let mut last_root = String::new();

    for i in 0..count {
        let id = format!("th-{i}");
        let is_subagent = i % 3 != 0;
        if is_subagent {
            parents.insert(id.clone(), last_root.clone());
        } else {
            last_root = id.clone();
        }
        threads.push(ThreadSummary {
            id,
            workspace_id: "ws-bench".to_string(),
            name: Some(format!("thread {i}")),
            is_subagent,
            created_at: timestamp(i as u32),
            updated_at: timestamp((count - i) as u32),
        });
    }
    (threads, parents)
}

fn no_pins(_: &str, _: &str) -> Option<DateTime<Utc>> {
    None
}

fn bench_rows_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("rows_recompute");
    let options = OrganizeOptions {
        show_subagent_sessions: true,
        collapsed_parent_thread_ids: Default::default(),
    };

    for size in [50, 250, 1000].iter() {
        let (threads, parents) = generate_threads(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_threads", size)),
            &(threads, parents),
            |b, (threads, parents)| {
                let mut cache = RowViewCache::new();
                let mut version = 0u64;
                b.iter(|| {
                    // Bump the version each iteration to force a recompute.
                    version += 1;
                    let rows = cache.rows(
                        black_box(threads),
                        SortOrder::UpdatedAt,
                        "ws-bench",
                        parents,
                        &no_pins,
                        version,
                        &options,
                    );
                    black_box(rows.unpinned.len())
                });
            },
        );
    }

    group.finish();
}

fn bench_rows_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("rows_cache_hit");
    let options = OrganizeOptions {
        show_subagent_sessions: true,
        collapsed_parent_thread_ids: Default::default(),
    };

    for size in [250, 1000].iter() {
        let (threads, parents) = generate_threads(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_threads", size)),
            &(threads, parents),
            |b, (threads, parents)| {
                let mut cache = RowViewCache::new();
                // Warm the cache once, then every iteration is a hit.
                cache.rows(
                    threads,
                    SortOrder::UpdatedAt,
                    "ws-bench",
                    parents,
                    &no_pins,
                    0,
                    &options,
                );
                b.iter(|| {
                    let rows = cache.rows(
                        black_box(threads),
                        SortOrder::UpdatedAt,
                        "ws-bench",
                        parents,
                        &no_pins,
                        0,
                        &options,
                    );
                    black_box(rows.unpinned.len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rows_recompute, bench_rows_cache_hit);
criterion_main!(benches);
