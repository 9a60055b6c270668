use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vellum_core::fingerprint::Fingerprint;
use vellum_core::markup::{apply_indent, apply_wrap, IndentDirection, Selection, StyleKind};

fn sample_text(lines: usize) -> String {
    "The quick brown fox jumps over the lazy dog.\n".repeat(lines)
}

fn bench_wrap_bold(c: &mut Criterion) {
    let text = sample_text(50);
    let sel = Selection::new(0, 44);

    c.bench_function("wrap_bold_50_lines", |b| {
        b.iter(|| {
            black_box(apply_wrap(black_box(&text), sel, &StyleKind::Bold).unwrap());
        })
    });
}

fn bench_indent_forward(c: &mut Criterion) {
    let text = sample_text(100);
    let sel = Selection::new(0, text.len());

    c.bench_function("indent_100_lines", |b| {
        b.iter(|| {
            black_box(apply_indent(black_box(&text), sel, IndentDirection::Forward).unwrap());
        })
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let text = sample_text(200);

    c.bench_function("fingerprint_200_lines", |b| {
        b.iter(|| {
            black_box(Fingerprint::of(black_box(&text), "title", "author"));
        })
    });
}

criterion_group!(
    benches,
    bench_wrap_bold,
    bench_indent_forward,
    bench_fingerprint
);
criterion_main!(benches);
