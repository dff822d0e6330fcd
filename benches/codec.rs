//! Benchmark map decode/encode performance.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use map_server::{DecodeConfig, MapEncoder, Raster, RasterFormat, decode};

/// Room-like map: walls on the border, a few pillars, unknown outside a circle.
fn room_raster(size: u32) -> Raster {
    let center = size as f64 / 2.0;
    Raster::from_fn_gray(size, size, |x, y| {
        let dx = x as f64 - center;
        let dy = y as f64 - center;
        if dx * dx + dy * dy > center * center {
            205
        } else if x % 50 < 3 && y % 50 < 3 {
            0
        } else {
            255
        }
    })
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let config = DecodeConfig::new(0.05);

    for size in [256u32, 1024, 2048] {
        let raster = room_raster(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &raster, |b, raster| {
            b.iter(|| decode(black_box(raster), &config))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let encoder = MapEncoder::default();

    for size in [256u32, 1024, 2048] {
        let grid = decode(&room_raster(size), &DecodeConfig::new(0.05)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &grid, |b, grid| {
            b.iter(|| encoder.encode(black_box(grid)))
        });
    }
    group.finish();
}

fn bench_file_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_bytes");
    let raster = room_raster(1024);

    for format in [RasterFormat::Pgm, RasterFormat::Png] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format.extension()),
            &raster,
            |b, raster| b.iter(|| format.encode(black_box(raster))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode, bench_file_bytes);
criterion_main!(benches);
