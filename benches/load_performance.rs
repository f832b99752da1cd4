//! Performance benchmarks for dirconfig.
//!
//! Measures the cost of the pieces that run on every filesystem event:
//! - Deep merge of wide and deep mappings
//! - A full load of directories with a growing number of files
//! - Typed extraction from a snapshot

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dirconfig::core::{ConfigMap, Value, deep_merge};
use dirconfig::sources::load_directory;
use serde::Deserialize;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct BenchConfig {
    service: ServiceConfig,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ServiceConfig {
    name: String,
    port: u16,
    tags: Vec<String>,
}

/// A mapping with `width` keys per level, nested `depth` levels deep.
fn nested_map(width: usize, depth: usize, seed: i64) -> ConfigMap {
    let mut map = ConfigMap::new();
    for i in 0..width {
        let value = if depth == 0 {
            Value::Integer(seed + i as i64)
        } else {
            Value::Mapping(nested_map(width, depth - 1, seed))
        };
        map.insert(format!("key_{}", i), value);
    }
    map
}

/// A directory of `files` YAML files that all touch the same `service` section.
fn config_dir(files: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..files {
        let sub = temp_dir.path().join(format!("group_{}", i % 4));
        fs::create_dir_all(&sub).unwrap();
        fs::write(
            sub.join(format!("{:03}.yaml", i)),
            format!(
                "service:\n  name: svc\n  port: {}\n  tags: [a, b, c]\nfile_{}:\n  enabled: true\n",
                8000 + i,
                i
            ),
        )
        .unwrap();
    }
    temp_dir
}

/// Benchmark merging two overlapping trees
fn benchmark_deep_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_merge");

    for (width, depth) in [(8, 2), (16, 2), (8, 4)] {
        let base = nested_map(width, depth, 0);
        let overlay = nested_map(width, depth, 1);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, depth)),
            &(base, overlay),
            |b, (base, overlay)| {
                b.iter(|| {
                    let mut dst = base.clone();
                    deep_merge(&mut dst, overlay.clone());
                    black_box(dst);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a full directory load with a growing number of files
fn benchmark_load_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_directory");

    for files in [1, 10, 50] {
        let dir = config_dir(files);
        group.throughput(Throughput::Elements(files as u64));

        group.bench_with_input(BenchmarkId::from_parameter(files), &dir, |b, dir| {
            b.iter(|| {
                let data = load_directory(dir.path()).unwrap();
                black_box(data);
            });
        });
    }

    group.finish();
}

/// Benchmark typed extraction from a loaded snapshot
fn benchmark_deserialize_into(c: &mut Criterion) {
    let dir = config_dir(10);
    let data = load_directory(dir.path()).unwrap();

    let mut group = c.benchmark_group("deserialize_into");
    group.bench_function("bench_config", |b| {
        b.iter(|| {
            let config: BenchConfig = data.deserialize_into().unwrap();
            black_box(config);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_deep_merge,
    benchmark_load_directory,
    benchmark_deserialize_into,
);

criterion_main!(benches);
