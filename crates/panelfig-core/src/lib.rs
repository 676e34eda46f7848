#![forbid(unsafe_code)]

//! Core: geometry, rasters, kernel names, and task control.
//!
//! # Role in panelfig
//! `panelfig-core` holds the value types shared by the panel tree
//! (`panelfig-layout`) and the resampler (`panelfig-sample`). It has no
//! behavior beyond construction, validation, and simple queries, so both
//! sides can depend on it without depending on each other.
//!
//! # Primary responsibilities
//! - **Geometry**: canvas [`Rect`]s, continuous [`Point`]s, source [`Quad`]s.
//! - **Rasters**: multi-plane source [`Raster`]s and per-panel [`RasterBuffer`]s.
//! - **Kernel names**: the closed [`Interpolation`] set.
//! - **Task control**: cooperative cancellation and advisory progress.

pub mod cancellation;
pub mod geometry;
pub mod interpolation;
pub mod progress;
pub mod raster;

pub use cancellation::{CancellationSource, CancellationToken};
pub use geometry::{Corner, Point, Quad, Rect};
pub use interpolation::{Interpolation, UnknownInterpolation};
pub use progress::{NoProgress, Progress, ProgressCounter, ProgressSink};
pub use raster::{
    BufferPlane, Calibration, PlaneIndex, PlaneView, Raster, RasterBuffer, RasterError, StackDims,
};
