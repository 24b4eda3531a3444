//! Performance benchmarks for oxiarc-brotli
//!
//! This benchmark suite evaluates:
//! - Compression speed across quality levels
//! - Decompression throughput for different data patterns
//! - Cost of streaming through the reader with small source reads

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxiarc_brotli::{BrotliReader, EncoderParams, compress, compress_with, decompress};
use std::hint::black_box;
use std::io::Read;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Random data - no patterns (worst compression)
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Text-like data - realistic scenario
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! ";
        text.iter().copied().cycle().take(size).collect()
    }

    /// JSON-like data - typical HTTP payload
    pub fn json_like(size: usize) -> Vec<u8> {
        let json = br#"{"id":42,"name":"widget","tags":["a","b"],"price":9.99},"#;
        json.iter().copied().cycle().take(size).collect()
    }
}

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 10 * 1024; // 10 KB
    pub const MEDIUM: usize = 100 * 1024; // 100 KB
    pub const LARGE: usize = 1024 * 1024; // 1 MB
}

/// Benchmark compression across quality levels
fn bench_compression_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_quality");

    let size = data_sizes::MEDIUM;
    let data = test_data::text_like(size);

    for quality in [1u32, 5, 9, 11] {
        let params = EncoderParams::default()
            .with_quality(quality)
            .expect("valid quality");
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(quality), &data, |b, data| {
            b.iter(|| {
                let compressed = compress_with(black_box(data), params).unwrap();
                black_box(compressed);
            });
        });
    }

    group.finish();
}

/// Benchmark decompression for different data patterns
fn bench_decompression_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_patterns");

    let patterns: [(&str, PatternGenerator); 3] = [
        ("random", test_data::random),
        ("text", test_data::text_like),
        ("json", test_data::json_like),
    ];

    for size in [data_sizes::SMALL, data_sizes::LARGE] {
        for (name, generator) in patterns {
            let data = generator(size);
            let compressed = compress(&data).unwrap();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(name, size),
                &compressed,
                |b, compressed| {
                    b.iter(|| {
                        let plain = decompress(black_box(compressed)).unwrap();
                        black_box(plain);
                    });
                },
            );
        }
    }

    group.finish();
}

/// Source handing out at most 512 bytes per read
struct SmallReads<'a>(&'a [u8]);

impl Read for SmallReads<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(512);
        self.0.read(&mut buf[..n])
    }
}

/// Benchmark the streaming reader fed by a slow source
fn bench_streaming_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming_reader");

    let size = data_sizes::LARGE;
    let data = test_data::json_like(size);
    let compressed = compress(&data).unwrap();

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("small_source_reads", |b| {
        b.iter(|| {
            let mut reader = BrotliReader::new(SmallReads(black_box(&compressed))).unwrap();
            let mut out = Vec::with_capacity(size);
            reader.read_to_end(&mut out).unwrap();
            black_box(out);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compression_quality,
    bench_decompression_patterns,
    bench_streaming_reader,
);
criterion_main!(benches);
