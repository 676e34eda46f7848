#![forbid(unsafe_code)]

//! Filling leaves from source regions, inline or on a worker thread.
//!
//! A fill resolves the leaf's source, samples the recorded quad into a buffer
//! of the leaf's current size, and only then installs the buffer and the
//! updated [`DataSource`] in one publish. A failed or cancelled fill leaves
//! the previous buffer in place.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use panelfig_core::{
    Calibration, CancellationSource, CancellationToken, Progress, ProgressCounter, ProgressSink,
};
use panelfig_layout::{DataSource, PanelId, SharedPanelTree};
use panelfig_sample::SampleRequest;

use crate::config::FigureConfig;
use crate::error::FigureError;
use crate::source::SourceProvider;

/// What a successful fill installed.
#[derive(Debug, Clone, PartialEq)]
pub struct FillReport {
    pub leaf: PanelId,
    pub width: u32,
    pub height: u32,
    pub planes: usize,
    /// Effective calibration recorded on the leaf.
    pub calibration: Calibration,
}

/// Everything a fill needs, cheap to clone into a worker.
#[derive(Clone)]
pub(crate) struct FillContext {
    pub(crate) tree: Arc<SharedPanelTree>,
    pub(crate) sources: Arc<dyn SourceProvider>,
    pub(crate) config: FigureConfig,
}

impl fmt::Debug for FillContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillContext")
            .field("tree", &self.tree)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FillContext {
    /// Sample `data` into `leaf` at its current size and install the result.
    pub(crate) fn fill(
        &self,
        leaf: PanelId,
        mut data: DataSource,
        cancel: CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<FillReport, FigureError> {
        let _span = tracing::debug_span!(
            "figure.fill",
            leaf = %leaf,
            source = %data.source,
            kernel = %data.interpolation
        )
        .entered();

        let region = match self.tree.load().node(leaf) {
            Some(node) if node.is_leaf() => node.region,
            _ => return Err(FigureError::NotALeaf { id: leaf }),
        };
        let Some(quad) = data.corners else {
            return Err(FigureError::NothingToResample { id: leaf });
        };

        let raster = self.sources.resolve(&data.source).inspect_err(|err| {
            tracing::warn!(
                target: "panelfig.figure",
                leaf = %leaf,
                error = %err,
                "source unavailable"
            );
        })?;
        let planes = data.selected_planes(raster.dims());
        let request = SampleRequest {
            source: &raster,
            quad,
            width: region.width,
            height: region.height,
            planes: &planes,
        };
        let output = self
            .config
            .sampler(data.interpolation)
            .with_cancellation(cancel)
            .sample_with_progress(&request, progress)?;

        let calibration = raster.calibration().scaled(output.calibration_factor);
        data.calibration = calibration.clone();
        let pixels = Arc::new(output.buffer);
        self.tree
            .update_leaf(leaf, |panel| {
                // Notes may have been edited while the fill ran.
                data.notes = std::mem::take(&mut panel.data.notes);
                panel.data = data;
                panel.pixels = Some(pixels);
            })
            .ok_or(FigureError::NotALeaf { id: leaf })?;

        tracing::debug!(
            target: "panelfig.figure",
            leaf = %leaf,
            width = region.width,
            height = region.height,
            planes = planes.len(),
            pixel_width = calibration.pixel_width,
            "leaf filled"
        );
        Ok(FillReport {
            leaf,
            width: region.width,
            height: region.height,
            planes: planes.len(),
            calibration,
        })
    }
}

/// A fill running on its own thread.
///
/// Progress can be polled while it runs. [`join`](Self::join) waits for the
/// result. Dropping an unfinished task cancels it and waits for the worker
/// to stop.
#[derive(Debug)]
pub struct FillTask {
    leaf: PanelId,
    cancel: CancellationSource,
    progress: ProgressCounter,
    handle: Option<JoinHandle<Result<FillReport, FigureError>>>,
}

impl FillTask {
    pub(crate) fn spawn(
        context: FillContext,
        leaf: PanelId,
        data: DataSource,
    ) -> Result<Self, FigureError> {
        let cancel = CancellationSource::new();
        let token = cancel.token();
        let progress = ProgressCounter::new();
        let sink = progress.clone();
        let handle = thread::Builder::new()
            .name("panelfig-fill".into())
            .spawn(move || context.fill(leaf, data, token, &sink))?;
        Ok(Self {
            leaf,
            cancel,
            progress,
            handle: Some(handle),
        })
    }

    #[must_use]
    pub const fn leaf(&self) -> PanelId {
        self.leaf
    }

    /// Rows sampled so far.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress.snapshot()
    }

    /// Ask the worker to stop. The leaf keeps its previous buffer.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// True once the worker has returned, successfully or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker and return its result.
    pub fn join(mut self) -> Result<FillReport, FigureError> {
        let Some(handle) = self.handle.take() else {
            return Err(FigureError::WorkerPanicked);
        };
        handle.join().unwrap_or(Err(FigureError::WorkerPanicked))
    }
}

impl Drop for FillTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.cancel();
            let _ = handle.join();
        }
    }
}
