#![allow(dead_code, unused_variables)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pacc::core::source::{content_hash, normalize_content};
use pacc::core::store::{MergeStrategy, merge};
use serde_json::json;
use std::time::Duration;

/// Benchmark content normalization and hashing over representative file sizes.
fn bench_content_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_hash");
    group.measurement_time(Duration::from_secs(10));

    for size in [256usize, 4096, 65536] {
        let raw = vec![b'a'; size];
        group.bench_with_input(BenchmarkId::new("normalize_and_hash", size), &raw, |b, raw| {
            b.iter(|| {
                let normalized = normalize_content(black_box(raw));
                black_box(content_hash(&normalized));
            });
        });
    }

    let crlf = "line one\r\nline two\r\nline three\r\n".repeat(200);
    group.bench_function("normalize_crlf_document", |b| {
        b.iter(|| black_box(normalize_content(black_box(crlf.as_bytes()))));
    });

    group.finish();
}

/// Benchmark the structured-config merge against a growing number of bucket
/// entries, the shape every `install`/`sync` call pays once per transaction.
fn bench_document_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_merge");
    group.measurement_time(Duration::from_secs(10));

    for entry_count in [10usize, 100, 1000] {
        let mut hooks = serde_json::Map::new();
        for i in 0..entry_count {
            hooks.insert(format!("hook-{i}"), json!({"name": format!("hook-{i}"), "eventTypes": ["PreToolUse"]}));
        }
        let current = json!({"hooks": hooks, "mcpServers": {}, "agents": {}, "commands": {}, "enabledPlugins": []});
        let patch = json!({"hooks": {"new-hook": {"name": "new-hook", "eventTypes": ["Stop"]}}});

        group.bench_with_input(BenchmarkId::new("prefer_incoming", entry_count), &(current, patch), |b, (current, patch)| {
            b.iter(|| black_box(merge(black_box(current), black_box(patch), MergeStrategy::PreferIncoming).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_content_hash, bench_document_merge);
criterion_main!(benches);
