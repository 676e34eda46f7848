#![forbid(unsafe_code)]

//! Resampling of quadrilateral source regions into panel rasters.
//!
//! Three layers, leaf first:
//! - [`mapper`]: bilinear unit-square to quad mapping, edge lengths, and the
//!   calibration factor.
//! - [`kernel`]: nearest, linear, Catmull-Rom, and Spline36 weights with
//!   edge clamping.
//! - [`sampler`]: drives both over every destination row of every selected
//!   plane, in parallel, with cancellation and progress.

pub mod kernel;
pub mod mapper;
pub mod sampler;

pub use mapper::{DegenerateReason, DegenerateRegion, MIN_TRIANGLE_AREA, QuadMapper, RowMapping};
pub use sampler::{
    DEFAULT_PROGRESS_EVERY_ROWS, SampleError, SampleOutput, SampleRequest, Sampler,
};
