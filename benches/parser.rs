//! Scanner benchmarks

use ansiloom::core::Style;
use ansiloom::parser::parse;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_parse_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    // Plain ASCII text
    let plain_text = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(plain_text.len() as u64));

    group.bench_function("plain_text", |b| {
        b.iter(|| {
            let ops = parse(black_box(&plain_text), &Style::default());
            black_box(ops)
        })
    });

    group.finish();
}

fn bench_parse_csi_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    // CSI sequences (cursor movement, SGR)
    let csi_heavy = "\x1b[1;31mRed\x1b[0m \x1b[5;10H\x1b[2J".repeat(100);
    group.throughput(Throughput::Bytes(csi_heavy.len() as u64));

    group.bench_function("csi_sequences", |b| {
        b.iter(|| {
            let ops = parse(black_box(&csi_heavy), &Style::default());
            black_box(ops)
        })
    });

    group.finish();
}

fn bench_parse_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    // Mixed content (typical console output)
    let mixed = "Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n".repeat(500);
    group.throughput(Throughput::Bytes(mixed.len() as u64));

    group.bench_function("mixed_content", |b| {
        b.iter(|| {
            let ops = parse(black_box(&mixed), &Style::default());
            black_box(ops)
        })
    });

    group.finish();
}

fn bench_parse_backslash_escapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    // Textual escape spelling, quote mode, and unicode escapes
    let textual = "\\ESC[32mok\\ESC[0m \\Qraw \\\\E text\\E \\u00e9\\n".repeat(500);
    group.throughput(Throughput::Bytes(textual.len() as u64));

    group.bench_function("backslash_escapes", |b| {
        b.iter(|| {
            let ops = parse(black_box(&textual), &Style::default());
            black_box(ops)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_plain_text,
    bench_parse_csi_sequences,
    bench_parse_mixed,
    bench_parse_backslash_escapes
);

criterion_main!(benches);
