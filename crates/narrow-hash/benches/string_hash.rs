//! crates/narrow-hash/benches/string_hash.rs
//!
//! Benchmarks for hashing one-byte and two-byte strings.
//!
//! Run with: `cargo bench -p narrow-hash`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use narrow_hash::StringHasher;
use simd_dispatch::compiled_readers;

/// Narrow text cycling through the printable ASCII range.
fn generate_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| 0x20 + (i % 0x5f) as u8).collect()
}

/// Benchmark the one-byte path against the converting path per reader.
fn bench_string_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_hash");

    for size in [7, 16, 64, 1024] {
        let bytes = generate_bytes(size);
        let units: Vec<u16> = bytes.iter().map(|&b| u16::from(b)).collect();

        group.throughput(Throughput::Elements(size as u64));
        let hasher = StringHasher::new(0);
        group.bench_with_input(BenchmarkId::new("one_byte", size), &bytes, |b, bytes| {
            b.iter(|| hasher.hash_one_byte(black_box(bytes)));
        });

        for reader in compiled_readers() {
            let hasher = StringHasher::new(0).reader(reader);
            let id = BenchmarkId::new(
                format!("converting/{}", reader.instruction_set().name()),
                size,
            );
            group.bench_with_input(id, &units, |b, units| {
                b.iter(|| hasher.hash_converting_to_8bit(black_box(units)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_string_hash);
criterion_main!(benches);
