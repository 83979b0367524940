use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tldw_core::{Draft, extract_summary, split, synthesize};

fn bench_split(c: &mut Criterion) {
    let small = std::fs::read_to_string("../../tests/fixtures/rockets.md").unwrap();
    let large = small.repeat(200);

    let mut group = c.benchmark_group("split");

    group.bench_with_input(BenchmarkId::new("small", "1 doc"), &small, |b, text| {
        b.iter(|| split(black_box(text)))
    });

    group.bench_with_input(BenchmarkId::new("large", "200 docs"), &large, |b, text| {
        b.iter(|| split(black_box(text)))
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let text = std::fs::read_to_string("../../tests/fixtures/rockets.md").unwrap();
    let sections = split(&text);

    c.bench_function("normalize", |b| b.iter(|| Draft::from_sections(black_box(&sections))));
}

fn bench_full_extraction(c: &mut Criterion) {
    let text = std::fs::read_to_string("../../tests/fixtures/rockets.md").unwrap();

    c.bench_function("full_extraction", |b| b.iter(|| extract_summary(black_box(&text), "bench")));
}

fn bench_synthesis(c: &mut Criterion) {
    let text = std::fs::read_to_string("../../tests/fixtures/rockets.md").unwrap();
    let summary = extract_summary(&text, "bench").unwrap();

    c.bench_function("synthesis", |b| b.iter(|| synthesize(black_box(&summary))));
}

criterion_group!(benches, bench_split, bench_normalize, bench_full_extraction, bench_synthesis);
criterion_main!(benches);
