#![forbid(unsafe_code)]

//! Image sampler: fills a destination raster from a quadrilateral over a
//! multi-plane source.
//!
//! Every destination row of every selected plane is independent and reads the
//! source immutably, so rows are distributed over the rayon pool. Each row
//! checks the cancellation token before it starts; a cancelled run discards
//! everything it wrote and returns [`SampleError::Cancelled`].
//!
//! Progress is reported in whole rows, at most once per
//! `progress_every_rows` rows plus a final report. Reporting never changes the
//! output.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use panelfig_core::{
    BufferPlane, CancellationToken, Interpolation, PlaneIndex, Progress, ProgressSink, Quad,
    Raster, RasterBuffer, StackDims,
};
use rayon::prelude::*;

use crate::kernel;
use crate::mapper::{DegenerateRegion, QuadMapper, RowMapping};

/// Default row interval between progress reports.
pub const DEFAULT_PROGRESS_EVERY_ROWS: u32 = 16;

/// Inputs of one sampling run.
#[derive(Debug, Clone, Copy)]
pub struct SampleRequest<'a> {
    pub source: &'a Raster,
    pub quad: Quad,
    pub width: u32,
    pub height: u32,
    /// Source planes to sample, in output order.
    pub planes: &'a [PlaneIndex],
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutput {
    pub buffer: RasterBuffer,
    /// Source pixels per destination pixel along the calibration edge.
    pub calibration_factor: f64,
}

/// Why a sampling run produced no buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    DegenerateRegion(DegenerateRegion),
    EmptyDestination { width: u32, height: u32 },
    NoPlanesSelected,
    PlaneOutOfRange { index: PlaneIndex, dims: StackDims },
    Cancelled,
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateRegion(err) => err.fmt(f),
            Self::EmptyDestination { width, height } => {
                write!(f, "destination {width}x{height} has no pixels")
            }
            Self::NoPlanesSelected => write!(f, "no source planes selected"),
            Self::PlaneOutOfRange { index, dims } => write!(
                f,
                "plane {index} is outside a stack of {}x{}x{} (c/z/t)",
                dims.channels, dims.slices, dims.frames
            ),
            Self::Cancelled => write!(f, "sampling cancelled"),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DegenerateRegion(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DegenerateRegion> for SampleError {
    fn from(err: DegenerateRegion) -> Self {
        Self::DegenerateRegion(err)
    }
}

/// Configured sampler. Cheap to clone; holds no per-run state.
#[derive(Debug, Clone)]
pub struct Sampler {
    interpolation: Interpolation,
    parallel: bool,
    progress_every_rows: u32,
    cancel: CancellationToken,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(Interpolation::default())
    }
}

impl Sampler {
    #[must_use]
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            parallel: true,
            progress_every_rows: DEFAULT_PROGRESS_EVERY_ROWS,
            cancel: CancellationToken::never(),
        }
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Rows between progress reports; zero is treated as one.
    #[must_use]
    pub fn with_progress_every_rows(mut self, rows: u32) -> Self {
        self.progress_every_rows = rows.max(1);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub const fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Run without progress reporting.
    pub fn sample(&self, request: &SampleRequest<'_>) -> Result<SampleOutput, SampleError> {
        self.sample_with_progress(request, &panelfig_core::NoProgress)
    }

    /// Fill a `width x height` buffer with one plane per requested source plane.
    pub fn sample_with_progress(
        &self,
        request: &SampleRequest<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<SampleOutput, SampleError> {
        let SampleRequest {
            source,
            quad,
            width,
            height,
            planes,
        } = *request;

        let _span = tracing::debug_span!(
            "sample.run",
            kernel = %self.interpolation,
            width,
            height,
            planes = planes.len(),
        )
        .entered();

        if width == 0 || height == 0 {
            return Err(SampleError::EmptyDestination { width, height });
        }
        if planes.is_empty() {
            return Err(SampleError::NoPlanesSelected);
        }
        let mut views = Vec::with_capacity(planes.len());
        for &index in planes {
            let view = source.plane(index).ok_or(SampleError::PlaneOutOfRange {
                index,
                dims: source.dims(),
            })?;
            views.push(view);
        }
        let mapper = match QuadMapper::new(quad) {
            Ok(mapper) => mapper,
            Err(err) => {
                tracing::warn!(target: "panelfig.sample", error = %err, "sampling refused");
                return Err(err.into());
            }
        };
        if self.cancel.is_cancelled() {
            return Err(SampleError::Cancelled);
        }

        let start = Instant::now();
        let rows: Vec<RowMapping> = (0..height).map(|v| mapper.row(v, height)).collect();
        let row_len = width as usize;
        let plane_len = row_len * height as usize;
        let total_rows = planes.len() as u64 * u64::from(height);
        let done = AtomicU64::new(0);
        let every = u64::from(self.progress_every_rows);
        let interpolation = self.interpolation;
        let mut data = vec![0.0_f32; plane_len * planes.len()];

        let fill_row = |(i, out): (usize, &mut [f32])| -> Result<(), SampleError> {
            if self.cancel.is_cancelled() {
                return Err(SampleError::Cancelled);
            }
            let plane = &views[i / height as usize];
            let row = &rows[i % height as usize];
            for (u, px) in out.iter_mut().enumerate() {
                let p = row.at(u as u32, width);
                *px = kernel::sample(plane, interpolation, p.x, p.y);
            }
            let finished = done.fetch_add(1, Ordering::AcqRel) + 1;
            if finished % every == 0 || finished == total_rows {
                progress.report(Progress::new(finished, total_rows));
            }
            Ok(())
        };

        let outcome = if self.parallel {
            data.par_chunks_mut(row_len)
                .enumerate()
                .try_for_each(fill_row)
        } else {
            data.chunks_mut(row_len).enumerate().try_for_each(fill_row)
        };
        if let Err(err) = outcome {
            tracing::debug!(
                target: "panelfig.sample",
                rows_done = done.load(Ordering::Acquire),
                total_rows,
                "sampling cancelled; partial output discarded"
            );
            return Err(err);
        }

        let buffer_planes = planes
            .iter()
            .zip(data.chunks_exact(plane_len))
            .map(|(&index, chunk)| BufferPlane {
                index,
                data: chunk.to_vec(),
            })
            .collect();
        let buffer = RasterBuffer::new(width, height, buffer_planes)
            .map_err(|_| SampleError::EmptyDestination { width, height })?;
        let calibration_factor = mapper.calibration_factor(width);

        tracing::debug!(
            target: "panelfig.sample",
            kernel = %interpolation,
            width,
            height,
            planes = planes.len(),
            calibration_factor,
            duration_us = start.elapsed().as_micros() as u64,
            "sampling completed"
        );
        Ok(SampleOutput {
            buffer,
            calibration_factor,
        })
    }
}
