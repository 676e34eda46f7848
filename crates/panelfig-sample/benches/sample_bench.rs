//! Benchmarks for the quad sampler.
//!
//! Run with: cargo bench -p panelfig-sample

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use panelfig_core::{Calibration, Interpolation, PlaneIndex, Quad, Raster, StackDims};
use panelfig_sample::{SampleRequest, Sampler};
use std::hint::black_box;

fn source(width: u32, height: u32, channels: u32) -> Raster {
    Raster::from_fn(
        width,
        height,
        StackDims::new(channels, 1, 1),
        Calibration::default(),
        |p, x, y| ((x * 7 + y * 13 + p.channel * 31) % 255) as f32,
    )
    .expect("valid raster")
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample/kernel");
    let raster = source(1024, 1024, 1);
    let planes = [PlaneIndex::ORIGIN];
    let quad = Quad::from_xy([100.0, 900.0, 860.0, 60.0], [80.0, 140.0, 950.0, 880.0]);
    let request = SampleRequest {
        source: &raster,
        quad,
        width: 512,
        height: 512,
        planes: &planes,
    };
    group.throughput(Throughput::Elements(512 * 512));

    for kernel in Interpolation::ALL {
        let sampler = Sampler::new(kernel);
        group.bench_with_input(
            BenchmarkId::new("rotated_512", kernel.as_str()),
            &sampler,
            |b, sampler| b.iter(|| black_box(sampler.sample(&request))),
        );
    }

    group.finish();
}

fn bench_parallelism(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample/parallel");
    let raster = source(2048, 2048, 3);
    let planes = raster.dims().channels_at(0, 0);
    let request = SampleRequest {
        source: &raster,
        quad: Quad::from_rect(0.0, 0.0, 2048.0, 2048.0),
        width: 1024,
        height: 1024,
        planes: &planes,
    };

    for parallel in [false, true] {
        let sampler = Sampler::new(Interpolation::Bilinear).with_parallel(parallel);
        let label = if parallel { "rayon" } else { "sequential" };
        group.bench_function(BenchmarkId::new("rgb_downscale_1024", label), |b| {
            b.iter(|| black_box(sampler.sample(&request)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kernels, bench_parallelism);
criterion_main!(benches);
