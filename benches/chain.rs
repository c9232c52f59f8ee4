//! Segment chain and buffer benchmarks

use ansiloom::buffer::ConsoleBuffer;
use ansiloom::core::{Color, SegmentChain, Style, VecMirror};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn styles() -> [Style; 3] {
    [
        Style::default(),
        Style {
            bold: true,
            ..Style::default()
        },
        Style {
            fg: Color::GREEN,
            ..Style::default()
        },
    ]
}

fn bench_chain_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    let palette = styles();

    // Alternating styles so every third append opens a new run
    group.bench_function("append_runs", |b| {
        b.iter(|| {
            let mut chain: SegmentChain<VecMirror> = SegmentChain::default();
            for i in 0..300 {
                chain.append("chunk ", palette[i % 3]);
            }
            black_box(chain)
        })
    });

    group.finish();
}

fn bench_chain_overwrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    let palette = styles();

    group.bench_function("overwrite_middle", |b| {
        b.iter(|| {
            let mut chain: SegmentChain<VecMirror> = SegmentChain::default();
            for i in 0..40 {
                chain.append("0123456789", palette[i % 3]);
            }
            // Sweep overwrites across run boundaries
            for i in 0..40 {
                let position = (i * 9) % 350;
                chain
                    .overwrite_run(position, "XXXXX", palette[(i + 1) % 3])
                    .unwrap();
            }
            black_box(chain)
        })
    });

    group.finish();
}

fn bench_chain_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");

    group.bench_function("insert_middle", |b| {
        b.iter(|| {
            let mut chain: SegmentChain<VecMirror> = SegmentChain::default();
            chain.append("base line content", Style::default());
            for _ in 0..100 {
                let middle = chain.line_len() / 2;
                chain
                    .insert_run(middle, "word ", Style::default())
                    .unwrap();
            }
            black_box(chain)
        })
    });

    group.finish();
}

fn bench_buffer_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");

    // A progress-style stream that rewrites the same line repeatedly
    let mut stream = String::new();
    for i in 0..100 {
        stream.push_str(&format!("\r\x1b[Kstep {}: \x1b[32mok\x1b[0m", i));
    }
    stream.push('\n');
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("progress_stream", |b| {
        b.iter(|| {
            let mut buffer = ConsoleBuffer::<VecMirror>::new();
            buffer.process(black_box(&stream));
            black_box(buffer.snapshot())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_chain_append,
    bench_chain_overwrite,
    bench_chain_insert,
    bench_buffer_process
);

criterion_main!(benches);
