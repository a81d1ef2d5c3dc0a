//! Criterion microbenches for datakitten detection and descriptor parsing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Data package descriptor parsing (from_json_str, from_json_slice)
//! - Full dataset detection against in-memory responses
//! - Origin classification of repository addresses

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use datakitten::fetcher::{Fetcher, StaticFetcher};
use datakitten::format::datapackage::Datapackage;
use datakitten::format::MetadataAdapter;
use datakitten::origin::is_git_address;
use datakitten::Dataset;

// Include test fixtures at compile time (no file I/O during benchmark)
const DATAPACKAGE_FIXTURE: &str = include_str!("../tests/fixtures/datapackage.json");
const CKAN_FIXTURE: &str = include_str!("../tests/fixtures/ckan_package_show.json");

const RAW_DATAPACKAGE: &str =
    "https://raw.githubusercontent.com/theodi/dataset-metadata-survey/HEAD/datapackage.json";

/// Benchmark descriptor parsing from string and from bytes.
fn bench_datapackage_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("datapackage_parse");
    group.throughput(Throughput::Bytes(DATAPACKAGE_FIXTURE.len() as u64));

    group.bench_function("from_json_str", |b| {
        b.iter(|| {
            let package = Datapackage::from_json_str(black_box(DATAPACKAGE_FIXTURE)).unwrap();
            black_box(package)
        })
    });

    group.bench_function("from_json_slice", |b| {
        b.iter(|| {
            let package =
                Datapackage::from_json_slice(black_box(DATAPACKAGE_FIXTURE.as_bytes())).unwrap();
            black_box(package)
        })
    });

    group.finish();
}

/// Benchmark mapping a parsed descriptor to distributions.
fn bench_datapackage_distributions(c: &mut Criterion) {
    let package = Datapackage::from_json_str(DATAPACKAGE_FIXTURE).unwrap();

    c.bench_function("datapackage_distributions", |b| {
        b.iter(|| black_box(black_box(&package).distributions()))
    });
}

/// Benchmark end-to-end detection, with every response served from memory.
fn bench_dataset_detection(c: &mut Criterion) {
    let github: Arc<dyn Fetcher> =
        Arc::new(StaticFetcher::new().with_body(RAW_DATAPACKAGE, DATAPACKAGE_FIXTURE));
    let ckan: Arc<dyn Fetcher> = Arc::new(
        StaticFetcher::new()
            .with_body("https://data.example.gov.uk/dataset/spend", "<html></html>")
            .with_body(
                "https://data.example.gov.uk/api/3/action/package_show?id=spend",
                CKAN_FIXTURE,
            ),
    );

    let mut group = c.benchmark_group("dataset_detection");

    group.bench_function("github_datapackage", |b| {
        b.iter(|| {
            let dataset = Dataset::with_fetcher(
                black_box("git://github.com/theodi/dataset-metadata-survey.git"),
                github.clone(),
            );
            black_box(dataset.supported())
        })
    });

    group.bench_function("ckan_package", |b| {
        b.iter(|| {
            let dataset = Dataset::with_fetcher(
                black_box("https://data.example.gov.uk/dataset/spend"),
                ckan.clone(),
            );
            black_box(dataset.supported())
        })
    });

    group.finish();
}

/// Benchmark syntactic origin classification.
fn bench_origin_classification(c: &mut Criterion) {
    let addresses = [
        "git://github.com/theodi/dataset-metadata-survey.git",
        "git@gitlab.com:group/sub/project.git",
        "https://github.com/theodi/dataset-metadata-survey",
        "https://data.example.gov.uk/dataset/spend",
    ];

    c.bench_function("is_git_address", |b| {
        b.iter(|| {
            for address in addresses {
                black_box(is_git_address(black_box(address)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_datapackage_parse,
    bench_datapackage_distributions,
    bench_dataset_detection,
    bench_origin_classification,
);
criterion_main!(benches);
