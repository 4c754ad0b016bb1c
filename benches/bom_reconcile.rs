//! Performance benchmarks for BOM reconciliation.
//!
//! Run with: cargo bench --bench bom_reconcile
//!
//! Manifests declare every generated component plus a share of missing
//! versions, so each pass scores every candidate for each gap.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sbomgen::model::{Bom, Component, DeclaredManifest, Metadata, PackageCoordinate};
use sbomgen::parsers::{parse_bom_str, write_bom};
use sbomgen::reconcile::BomReconciler;
use std::hint::black_box;

fn coordinate(i: usize, patch: usize) -> PackageCoordinate {
    PackageCoordinate::maven(
        format!("org.acme.group{}", i % 25),
        format!("artifact-{i}"),
        Some(format!("1.{}.{patch}", i % 10)),
        Some("jar"),
        None,
    )
}

/// Generate a BOM with `count` components and a manifest declaring them all
/// plus `missing_percent` percent additional patch versions.
fn generate_case(count: usize, missing_percent: usize) -> (DeclaredManifest, Bom) {
    let root = PackageCoordinate::maven("org.acme", "product", Some("1.0".into()), Some("pom"), None);
    let components: Vec<Component> = (0..count)
        .map(|i| Component::library(&coordinate(i, 0)))
        .collect();

    let missing = count * missing_percent / 100;
    let dependencies = (0..count)
        .map(|i| coordinate(i, 0))
        .chain((0..missing).map(|i| coordinate(i, 1)))
        .collect();

    let bom = Bom {
        metadata: Some(Metadata {
            component: Some(Component::library(&root)),
            ..Metadata::default()
        }),
        components,
        ..Bom::default()
    };
    (
        DeclaredManifest {
            root: Some(root),
            dependencies,
        },
        bom,
    )
}

fn bench_reconcile_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_scaling");
    let engine = BomReconciler::new();

    for size in [100, 500, 1000, 2500] {
        let (manifest, bom) = generate_case(size, 10);
        group.bench_with_input(BenchmarkId::new("missing_10pct", size), &size, |b, _| {
            b.iter(|| black_box(engine.reconcile(black_box(&manifest), black_box(&bom))));
        });
    }

    group.finish();
}

fn bench_fast_path(c: &mut Criterion) {
    let (manifest, bom) = generate_case(2500, 0);
    let engine = BomReconciler::new();

    c.bench_function("reconcile_2500_fast_path", |b| {
        b.iter(|| black_box(engine.reconcile(black_box(&manifest), black_box(&bom))));
    });
}

fn bench_parse_and_write(c: &mut Criterion) {
    let (_, bom) = generate_case(1000, 0);
    let json = write_bom(&bom).expect("serializable bom");

    let mut group = c.benchmark_group("bom_io");
    group.bench_function("parse_1000", |b| {
        b.iter(|| black_box(parse_bom_str(black_box(&json))));
    });
    group.bench_function("write_1000", |b| {
        b.iter(|| black_box(write_bom(black_box(&bom))));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_reconcile_scaling,
    bench_fast_path,
    bench_parse_and_write,
);

criterion_main!(benches);
