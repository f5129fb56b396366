use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use romdumplib::{DisplayLayout, DumpOptions, StreamDumper, dump_buffer, format_line, parse_patch};
use std::io::Cursor;

fn random_data(len: usize) -> Vec<u8> {
    rand::rng()
        .sample_iter(rand::distr::StandardUniform)
        .take(len)
        .collect()
}

#[allow(clippy::expect_used)]
fn bench_dump(c: &mut Criterion) {
    let data = random_data(1024 * 1024);
    let layout = DisplayLayout::default();

    c.bench_function("format_line_16", |b| {
        let chunk = &data[..16];
        b.iter(|| format_line(std::hint::black_box(0x7FC0), std::hint::black_box(chunk), &layout));
    });

    c.bench_function("stream_dump_1mb", |b| {
        b.iter(|| {
            let source = Cursor::new(std::hint::black_box(&data));
            let out = StreamDumper::new(source, DumpOptions::default())
                .expect("Failed to create dumper")
                .into_output()
                .expect("Failed to dump buffer");
            std::hint::black_box(out);
        });
    });

    c.bench_function("parse_patch_1mb", |b| {
        let text = dump_buffer(&data, 0, &layout);
        b.iter(|| {
            let bytes = parse_patch(std::hint::black_box(&text), &layout)
                .expect("Failed to parse dump");
            std::hint::black_box(bytes);
        });
    });
}

criterion_group!(
    name = romdumplib_benches;
    config = Criterion::default().sample_size(20);
    targets = bench_dump
);
criterion_main!(romdumplib_benches);
