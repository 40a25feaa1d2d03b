//! Benchmarks for the fixed-point logarithm and byte stream adapters.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use oxilzp_core::io::{ByteSink, ByteSource};
use oxilzp_core::lg2::nlog2;
use std::hint::black_box;

fn bench_nlog2(c: &mut Criterion) {
    let mut group = c.benchmark_group("nlog2");
    group.throughput(Throughput::Elements(32767));
    group.bench_function("full_range", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for v in 1..32768u32 {
                acc = acc.wrapping_add(nlog2(black_box(v)));
            }
            black_box(acc)
        });
    });
    group.finish();
}

fn bench_byte_streams(c: &mut Criterion) {
    let data = vec![0x5Au8; 64 * 1024];
    let mut group = c.benchmark_group("byte_streams");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("slice_source", |b| {
        b.iter(|| {
            let mut input = black_box(data.as_slice());
            let mut acc = 0u32;
            while let Some(byte) = input.read_byte().unwrap() {
                acc = acc.wrapping_add(u32::from(byte));
            }
            black_box(acc)
        });
    });

    group.bench_function("vec_sink", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(data.len());
            for &byte in &data {
                out.write_byte(byte).unwrap();
            }
            black_box(out)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_nlog2, bench_byte_streams);
criterion_main!(benches);
