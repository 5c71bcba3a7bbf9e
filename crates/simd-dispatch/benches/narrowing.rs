//! crates/simd-dispatch/benches/narrowing.rs
//!
//! Benchmarks for the narrowing readers and the operation table, one entry
//! per backend compiled for the target.
//!
//! Run with: `cargo bench -p simd-dispatch`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use simd_dispatch::{Operation, OperationTable, VectorValue, compiled_readers};

/// Narrow units cycling through the printable ASCII range.
fn generate_units(len: usize) -> Vec<u16> {
    (0..len).map(|i| 0x20 + (i % 0x5f) as u16).collect()
}

/// Benchmark `read8` over a buffer for every compiled reader.
fn bench_read8(c: &mut Criterion) {
    let mut group = c.benchmark_group("read8");
    let units = generate_units(4096);
    let (blocks, _) = units.as_chunks::<8>();

    group.throughput(Throughput::Elements(units.len() as u64));
    for reader in compiled_readers() {
        let name = reader.instruction_set().name();
        group.bench_with_input(BenchmarkId::from_parameter(name), blocks, |b, blocks| {
            b.iter(|| {
                blocks
                    .iter()
                    .fold(0u64, |acc, block| acc ^ reader.read8(black_box(block)))
            });
        });
    }

    group.finish();
}

/// Benchmark `read4` over a buffer for every compiled reader.
fn bench_read4(c: &mut Criterion) {
    let mut group = c.benchmark_group("read4");
    let units = generate_units(4096);
    let (blocks, _) = units.as_chunks::<4>();

    group.throughput(Throughput::Elements(units.len() as u64));
    for reader in compiled_readers() {
        let name = reader.instruction_set().name();
        group.bench_with_input(BenchmarkId::from_parameter(name), blocks, |b, blocks| {
            b.iter(|| {
                blocks
                    .iter()
                    .fold(0u64, |acc, block| acc ^ reader.read4(black_box(block)))
            });
        });
    }

    group.finish();
}

/// Benchmark each table slot of every compiled backend.
fn bench_operation_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("operation_table");
    let a = VectorValue::from_f32x4([1.5, -2.25, 3.0, 1e-3]);
    let b = VectorValue::from_f32x4([0.5, 4.0, -7.5, 1e3]);

    for reader in compiled_readers() {
        let set = reader.instruction_set();
        let table = OperationTable::for_instruction_set(set);
        for op in Operation::ALL {
            let id = BenchmarkId::new(op.name(), set.name());
            group.bench_function(id, |bench| {
                bench.iter(|| match op {
                    Operation::AddPs => table.add_ps(black_box(a), black_box(b)),
                    Operation::MulPs => table.mul_ps(black_box(a), black_box(b)),
                    Operation::SubPs => table.sub_ps(black_box(a), black_box(b)),
                    Operation::AddEpi32 => table.add_epi32(black_box(a), black_box(b)),
                    Operation::ShuffleEpi32 => table.shuffle_epi32(black_box(a), black_box(0x1b)),
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_read8, bench_read4, bench_operation_table);
criterion_main!(benches);
