#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use panelfig_core::{Interpolation, PlaneIndex, Quad, Raster};
use panelfig_sample::{SampleError, SampleRequest, Sampler};

#[derive(Debug, Arbitrary)]
struct Input {
    xs: [f64; 4],
    ys: [f64; 4],
    width: u8,
    height: u8,
    kernel: u8,
}

fuzz_target!(|input: Input| {
    let source = Raster::single_plane(16, 12, (0..16 * 12).map(|v| v as f32).collect())
        .expect("source raster");
    let planes = [PlaneIndex::ORIGIN];
    let request = SampleRequest {
        source: &source,
        quad: Quad::from_xy(input.xs, input.ys),
        width: u32::from(input.width % 48),
        height: u32::from(input.height % 48),
        planes: &planes,
    };
    let kernel = Interpolation::ALL[usize::from(input.kernel) % Interpolation::ALL.len()];
    match Sampler::new(kernel).with_parallel(false).sample(&request) {
        Ok(output) => {
            assert!(output.buffer.matches_size(request.width, request.height));
            for v in 0..request.height {
                for u in 0..request.width {
                    let value = output.buffer.get(0, u, v).expect("in range");
                    assert!(value.is_finite(), "non-finite sample at ({u},{v})");
                }
            }
        }
        Err(SampleError::DegenerateRegion(_) | SampleError::EmptyDestination { .. }) => {}
        Err(err) => panic!("unexpected sampling error: {err}"),
    }
});
