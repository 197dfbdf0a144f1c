use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use typeline::text::{normalize, text_width};
use typeline::wrap::wrap;

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog. Caf\u{e9} na\u{ef}ve r\u{e9}sum\u{e9}, \
    \u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467} \u{1F44D}\u{1F3FD} \u{4E2D}\u{6587} supercalifragilisticexpialidocious. ";

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for repeat in [1, 10, 100] {
        let text = PARAGRAPH.repeat(repeat);
        group.bench_with_input(BenchmarkId::new("nfd", text.len()), &text, |b, text| {
            b.iter(|| normalize(black_box(text)))
        });
    }

    group.finish();
}

fn benchmark_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_width");

    for repeat in [1, 10, 100] {
        let text = normalize(&PARAGRAPH.repeat(repeat));
        group.bench_with_input(BenchmarkId::new("width", text.len()), &text, |b, text| {
            b.iter(|| text_width(black_box(text), 4))
        });
    }

    group.finish();
}

fn benchmark_wrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrap");
    let text = normalize(&PARAGRAPH.repeat(50));

    for width in [10, 40, 80, 200] {
        group.bench_with_input(BenchmarkId::new("width", width), &width, |b, &width| {
            b.iter(|| wrap(black_box(&text), black_box(width), 4))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalize,
    benchmark_width,
    benchmark_wrap
);
criterion_main!(benches);
