#![forbid(unsafe_code)]

//! The figure: a shared panel tree plus the collaborators that fill it.
//!
//! Structural edits go through the tree's operations and are published
//! atomically. Content edits (fills, clears, annotations) replace one leaf's
//! record in a single publish. Readers holding a tree snapshot never see a
//! half-applied edit.

use std::fmt;
use std::sync::Arc;

use panelfig_core::{
    Calibration, CancellationToken, Interpolation, NoProgress, PlaneIndex, Point, ProgressSink,
    Quad, RasterBuffer, Rect,
};
use panelfig_layout::{
    BufferState, DataSource, DisplayRange, LabelState, PanelActions, PanelId, PanelOperation,
    PanelOperationOutcome, PanelTree, Rgb, ScalebarState, SharedPanelTree, SourceRef, SplitAxis,
};

use crate::config::FigureConfig;
use crate::error::FigureError;
use crate::fill::{FillContext, FillReport, FillTask};
use crate::source::SourceProvider;

/// A new region to transfer into a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub source: SourceRef,
    pub quad: Quad,
    pub position: PlaneIndex,
    pub active_channels: Option<String>,
    /// Kernel to sample with; the figure default when `None`.
    pub interpolation: Option<Interpolation>,
    pub display_range: Option<DisplayRange>,
    pub macro_text: String,
}

impl TransferRequest {
    #[must_use]
    pub fn new(source: SourceRef, quad: Quad) -> Self {
        Self {
            source,
            quad,
            position: PlaneIndex::ORIGIN,
            active_channels: None,
            interpolation: None,
            display_range: None,
            macro_text: String::new(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: PlaneIndex) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_active_channels(mut self, mask: impl Into<String>) -> Self {
        self.active_channels = Some(mask.into());
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    #[must_use]
    pub fn with_display_range(mut self, range: DisplayRange) -> Self {
        self.display_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_macro_text(mut self, text: impl Into<String>) -> Self {
        self.macro_text = text.into();
        self
    }

    fn into_data_source(self, default_kernel: Interpolation, notes: String) -> DataSource {
        DataSource {
            source: self.source,
            corners: Some(self.quad),
            position: self.position,
            active_channels: self.active_channels,
            calibration: Default::default(),
            display_range: self.display_range,
            interpolation: self.interpolation.unwrap_or(default_kernel),
            notes,
            macro_text: self.macro_text,
        }
    }
}

/// Outcome of [`Figure::refresh_stale`].
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Stale leaves re-sampled at their new size.
    pub refilled: Vec<PanelId>,
    /// Stale leaves with nothing to re-sample; their pixels were dropped.
    pub cleared: Vec<PanelId>,
    /// Leaves that could not be re-sampled; they keep their stale pixels.
    pub failed: Vec<(PanelId, FigureError)>,
}

/// Editable figure.
pub struct Figure {
    context: FillContext,
    /// Physical size of one canvas pixel.
    calibration: Calibration,
    clipboard: Option<DataSource>,
    next_operation_id: u64,
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("context", &self.context)
            .field("calibration", &self.calibration)
            .field("clipboard", &self.clipboard)
            .field("next_operation_id", &self.next_operation_id)
            .finish()
    }
}

impl Figure {
    /// Figure with one empty leaf covering `canvas`.
    pub fn new(
        canvas: Rect,
        config: FigureConfig,
        sources: Arc<dyn SourceProvider>,
    ) -> Result<Self, FigureError> {
        let tree = PanelTree::new(canvas)?
            .with_style(config.separator_style())
            .with_min_extent(config.min_panel_extent);
        Self::from_tree(tree, config, sources)
    }

    /// Wrap an existing tree. The tree keeps its own separator style.
    pub fn from_tree(
        tree: PanelTree,
        config: FigureConfig,
        sources: Arc<dyn SourceProvider>,
    ) -> Result<Self, FigureError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(crate::config::ConfigError::Validation(errors).into());
        }
        tree.validate()?;
        Ok(Self {
            context: FillContext {
                tree: Arc::new(SharedPanelTree::new(tree)),
                sources,
                config,
            },
            calibration: Calibration::default(),
            clipboard: None,
            next_operation_id: 1,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FigureConfig {
        &self.context.config
    }

    #[must_use]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Set the physical size of one canvas pixel.
    pub fn set_calibration(&mut self, calibration: Calibration) -> Result<(), FigureError> {
        if !calibration.pixel_width.is_finite() || calibration.pixel_width <= 0.0 {
            return Err(FigureError::InvalidCalibration {
                pixel_width: calibration.pixel_width,
            });
        }
        self.calibration = calibration;
        Ok(())
    }

    /// Canvas width and height in calibrated units.
    #[must_use]
    pub fn physical_size(&self) -> (f64, f64) {
        let canvas = self.context.tree.load().canvas();
        (
            f64::from(canvas.width) * self.calibration.pixel_width,
            f64::from(canvas.height) * self.calibration.pixel_width,
        )
    }

    /// Current tree.
    #[must_use]
    pub fn tree(&self) -> Arc<PanelTree> {
        self.context.tree.snapshot()
    }

    /// Shared handle for readers on other threads.
    #[must_use]
    pub fn shared_tree(&self) -> Arc<SharedPanelTree> {
        Arc::clone(&self.context.tree)
    }

    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<PanelId> {
        self.context.tree.load().hit_test(point)
    }

    /// Actions that apply to `selection` right now.
    #[must_use]
    pub fn available_actions(&self, selection: Option<PanelId>) -> PanelActions {
        PanelActions::available(
            &self.context.tree.load(),
            selection,
            self.clipboard.is_some(),
        )
    }

    // ---------------------------------------------------------------------
    // Structure
    // ---------------------------------------------------------------------

    pub fn apply(&mut self, operation: PanelOperation) -> Result<PanelOperationOutcome, FigureError> {
        let operation_id = self.next_operation_id;
        self.next_operation_id += 1;
        Ok(self.context.tree.apply_operation(operation_id, operation)?)
    }

    pub fn split(
        &mut self,
        target: PanelId,
        axis: SplitAxis,
        count: u32,
    ) -> Result<PanelOperationOutcome, FigureError> {
        self.apply(PanelOperation::Split {
            target,
            axis,
            count,
        })
    }

    pub fn remove(&mut self, target: PanelId) -> Result<PanelOperationOutcome, FigureError> {
        self.apply(PanelOperation::Remove { target })
    }

    pub fn resize_boundary(
        &mut self,
        separator: PanelId,
        index: usize,
        boundary: i64,
    ) -> Result<PanelOperationOutcome, FigureError> {
        self.apply(PanelOperation::ResizeBoundary {
            separator,
            index,
            boundary,
        })
    }

    // ---------------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------------

    /// Fill `leaf` from a new region. Notes on the leaf are kept.
    pub fn transfer_region(
        &self,
        leaf: PanelId,
        request: TransferRequest,
    ) -> Result<FillReport, FigureError> {
        self.transfer_region_with(leaf, request, CancellationToken::never(), &NoProgress)
    }

    /// [`transfer_region`](Self::transfer_region) with cancellation and
    /// progress.
    pub fn transfer_region_with(
        &self,
        leaf: PanelId,
        request: TransferRequest,
        cancel: CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<FillReport, FigureError> {
        let data = self.transfer_data(leaf, request)?;
        self.context.fill(leaf, data, cancel, progress)
    }

    /// Run a transfer on a worker thread.
    pub fn spawn_transfer(
        &self,
        leaf: PanelId,
        request: TransferRequest,
    ) -> Result<FillTask, FigureError> {
        let data = self.transfer_data(leaf, request)?;
        FillTask::spawn(self.context.clone(), leaf, data)
    }

    /// Re-sample `leaf` from its recorded region at its current size.
    pub fn refill_leaf(&self, leaf: PanelId) -> Result<FillReport, FigureError> {
        let data = self.resample_data(leaf)?;
        self.context
            .fill(leaf, data, CancellationToken::never(), &NoProgress)
    }

    /// Run a refill on a worker thread.
    pub fn spawn_refill(&self, leaf: PanelId) -> Result<FillTask, FigureError> {
        let data = self.resample_data(leaf)?;
        FillTask::spawn(self.context.clone(), leaf, data)
    }

    /// Bring every stale leaf back in line with its region.
    pub fn refresh_stale(&self) -> RefreshReport {
        let mut report = RefreshReport::default();
        let tree = self.tree();
        for leaf in tree.stale_leaves() {
            let has_data = tree.leaf(leaf).is_some_and(|panel| !panel.data.is_empty());
            if !has_data {
                if self.context.tree.update_leaf(leaf, |panel| panel.pixels = None).is_some() {
                    report.cleared.push(leaf);
                }
                continue;
            }
            match self.refill_leaf(leaf) {
                Ok(_) => report.refilled.push(leaf),
                Err(err) => {
                    tracing::warn!(
                        target: "panelfig.figure",
                        leaf = %leaf,
                        error = %err,
                        "stale leaf could not be re-sampled"
                    );
                    report.failed.push((leaf, err));
                }
            }
        }
        report
    }

    /// Recolor every separator in the figure and use `color` for later
    /// splits. Returns the separators that changed.
    pub fn set_separator_color(&self, color: Rgb) -> Vec<PanelId> {
        let changed = self.context.tree.recolor_separators(color);
        tracing::debug!(
            target: "panelfig.figure",
            separators = changed.len(),
            r = color.r,
            g = color.g,
            b = color.b,
            "separators recolored"
        );
        changed
    }

    /// Drop the leaf's region, source, and pixels. Notes are kept.
    pub fn clear_leaf(&self, leaf: PanelId) -> Result<(), FigureError> {
        self.edit_leaf(leaf, |panel| {
            panel.data.clear();
            panel.pixels = None;
        })
    }

    /// Copy the leaf's data source to the figure clipboard.
    pub fn copy_data(&mut self, leaf: PanelId) -> Result<(), FigureError> {
        let tree = self.context.tree.load();
        let panel = tree.leaf(leaf).ok_or(FigureError::NotALeaf { id: leaf })?;
        if panel.data.is_empty() {
            return Err(FigureError::NothingToResample { id: leaf });
        }
        self.clipboard = Some(panel.data.clone());
        Ok(())
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&DataSource> {
        self.clipboard.as_ref()
    }

    /// Fill `leaf` from the copied data source, at the leaf's own size.
    pub fn paste_data(&self, leaf: PanelId) -> Result<FillReport, FigureError> {
        let copied = self.clipboard.clone().ok_or(FigureError::ClipboardEmpty)?;
        let notes = self.leaf_notes(leaf)?;
        let data = DataSource { notes, ..copied };
        self.context
            .fill(leaf, data, CancellationToken::never(), &NoProgress)
    }

    /// Fill `target` from the region recorded on `template`, taken from a
    /// different `source`.
    pub fn reuse_geometry(
        &self,
        template: PanelId,
        target: PanelId,
        source: SourceRef,
    ) -> Result<FillReport, FigureError> {
        let template_data = {
            let tree = self.context.tree.load();
            let panel = tree
                .leaf(template)
                .ok_or(FigureError::NotALeaf { id: template })?;
            if panel.data.corners.is_none() {
                return Err(FigureError::NothingToResample { id: template });
            }
            panel.data.clone()
        };
        let notes = self.leaf_notes(target)?;
        let data = DataSource {
            source,
            notes,
            ..template_data
        };
        self.context
            .fill(target, data, CancellationToken::never(), &NoProgress)
    }

    /// Install pixels edited outside the figure. They must match the leaf's
    /// size; the data source is kept.
    pub fn adopt_pixels(&self, leaf: PanelId, buffer: RasterBuffer) -> Result<(), FigureError> {
        let region = self
            .context
            .tree
            .load()
            .node(leaf)
            .filter(|node| node.is_leaf())
            .map(|node| node.region)
            .ok_or(FigureError::NotALeaf { id: leaf })?;
        if !buffer.matches_size(region.width, region.height) {
            return Err(FigureError::SizeMismatch {
                id: leaf,
                expected: (region.width, region.height),
                actual: (buffer.width(), buffer.height()),
            });
        }
        let pixels = Arc::new(buffer);
        self.edit_leaf(leaf, |panel| panel.pixels = Some(pixels))
    }

    pub fn set_label(&self, leaf: PanelId, label: Option<LabelState>) -> Result<(), FigureError> {
        self.edit_leaf(leaf, |panel| panel.label = label)
    }

    pub fn set_scalebar(
        &self,
        leaf: PanelId,
        scalebar: Option<ScalebarState>,
    ) -> Result<(), FigureError> {
        self.edit_leaf(leaf, |panel| panel.scalebar = scalebar)
    }

    pub fn set_notes(&self, leaf: PanelId, notes: impl Into<String>) -> Result<(), FigureError> {
        let notes = notes.into();
        self.edit_leaf(leaf, |panel| panel.data.notes = notes)
    }

    #[must_use]
    pub fn buffer_state(&self, leaf: PanelId) -> Option<BufferState> {
        self.context.tree.load().buffer_state(leaf)
    }

    fn edit_leaf(
        &self,
        leaf: PanelId,
        edit: impl FnOnce(&mut panelfig_layout::LeafPanel),
    ) -> Result<(), FigureError> {
        self.context
            .tree
            .update_leaf(leaf, edit)
            .ok_or(FigureError::NotALeaf { id: leaf })
    }

    fn leaf_notes(&self, leaf: PanelId) -> Result<String, FigureError> {
        self.context
            .tree
            .load()
            .leaf(leaf)
            .map(|panel| panel.data.notes.clone())
            .ok_or(FigureError::NotALeaf { id: leaf })
    }

    fn transfer_data(
        &self,
        leaf: PanelId,
        request: TransferRequest,
    ) -> Result<DataSource, FigureError> {
        let notes = self.leaf_notes(leaf)?;
        Ok(request.into_data_source(self.context.config.interpolation, notes))
    }

    fn resample_data(&self, leaf: PanelId) -> Result<DataSource, FigureError> {
        let tree = self.context.tree.load();
        let panel = tree.leaf(leaf).ok_or(FigureError::NotALeaf { id: leaf })?;
        if panel.data.is_empty() {
            return Err(FigureError::NothingToResample { id: leaf });
        }
        Ok(panel.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceProvider;
    use crate::ErrorClass;
    use panelfig_core::{BufferPlane, Progress, Raster, StackDims};

    fn ramp(width: u32, height: u32) -> Raster {
        Raster::from_fn(
            width,
            height,
            StackDims::new(2, 1, 1),
            Calibration::new(0.5, "µm"),
            |plane, x, y| (plane.channel * 1000 + y * width + x) as f32,
        )
        .expect("valid raster")
    }

    fn new_figure() -> (Figure, Arc<MemorySourceProvider>) {
        let sources = Arc::new(MemorySourceProvider::new());
        sources.insert("ramp", ramp(200, 100));
        let figure = Figure::new(
            Rect::from_size(102, 50),
            FigureConfig::default(),
            sources.clone(),
        )
        .expect("figure");
        (figure, sources)
    }

    fn crop(x: f64, y: f64, w: f64, h: f64) -> TransferRequest {
        TransferRequest::new(SourceRef::external("ramp"), Quad::from_rect(x, y, w, h))
    }

    #[test]
    fn transfer_fills_leaf_and_records_provenance() {
        let (mut figure, _) = new_figure();
        figure
            .split(figure.tree().root(), SplitAxis::Horizontal, 2)
            .expect("split");
        let leaf = figure.tree().leaves()[0];
        figure.set_notes(leaf, "left").expect("notes");

        let report = figure
            .transfer_region(leaf, crop(0.0, 0.0, 100.0, 100.0).with_active_channels("01"))
            .expect("transfer");
        assert_eq!((report.width, report.height, report.planes), (50, 50, 1));
        // 100 source px over 50 destination px at 0.5 µm/px.
        assert!((report.calibration.pixel_width - 1.0).abs() < 1e-12);

        let tree = figure.tree();
        let panel = tree.leaf(leaf).expect("leaf");
        assert_eq!(panel.data.notes, "left");
        assert_eq!(panel.data.source, SourceRef::external("ramp"));
        assert_eq!(panel.data.interpolation, Interpolation::Bilinear);
        let pixels = panel.pixels.as_ref().expect("pixels");
        assert_eq!(pixels.planes()[0].index, PlaneIndex::new(1, 0, 0));
        assert_eq!(figure.buffer_state(leaf), Some(BufferState::Valid));
    }

    #[test]
    fn degenerate_region_keeps_old_buffer() {
        let (figure, _) = new_figure();
        let leaf = figure.tree().root();
        figure
            .transfer_region(leaf, crop(0.0, 0.0, 102.0, 50.0))
            .expect("first fill");
        let before = figure.tree().leaf(leaf).expect("leaf").clone();

        let err = figure
            .transfer_region(
                leaf,
                TransferRequest::new(
                    SourceRef::external("ramp"),
                    Quad::from_xy([0.0; 4], [0.0; 4]),
                ),
            )
            .expect_err("degenerate");
        assert_eq!(err.class(), ErrorClass::DegenerateRegion);
        assert_eq!(figure.tree().leaf(leaf), Some(&before));
    }

    #[test]
    fn missing_source_is_unavailable() {
        let (figure, _) = new_figure();
        let leaf = figure.tree().root();
        let err = figure
            .transfer_region(
                leaf,
                TransferRequest::new(SourceRef::external("nope"), Quad::from_rect(0.0, 0.0, 5.0, 5.0)),
            )
            .expect_err("unknown source");
        assert_eq!(err.class(), ErrorClass::SourceUnavailable);
    }

    #[test]
    fn invalid_split_is_classified() {
        let (mut figure, _) = new_figure();
        let err = figure
            .split(figure.tree().root(), SplitAxis::Horizontal, 200)
            .expect_err("too many");
        assert_eq!(err.class(), ErrorClass::InvalidSplit);
    }

    #[test]
    fn resize_marks_stale_and_refresh_resamples() {
        let (mut figure, _) = new_figure();
        figure
            .split(figure.tree().root(), SplitAxis::Horizontal, 2)
            .expect("split");
        let separator = figure.tree().root();
        let [left, right] = figure.tree().leaves()[..] else {
            panic!("two leaves");
        };
        figure
            .transfer_region(left, crop(0.0, 0.0, 50.0, 50.0))
            .expect("fill left");
        figure
            .adopt_pixels(
                right,
                RasterBuffer::new(
                    50,
                    50,
                    vec![BufferPlane {
                        index: PlaneIndex::ORIGIN,
                        data: vec![0.0; 2500],
                    }],
                )
                .expect("buffer"),
            )
            .expect("adopt");

        let outcome = figure.resize_boundary(separator, 0, 70).expect("resize");
        assert_eq!(outcome.stale_leaves, vec![left, right]);

        let report = figure.refresh_stale();
        assert_eq!(report.refilled, vec![left]);
        assert_eq!(report.cleared, vec![right]);
        assert!(report.failed.is_empty());
        assert_eq!(figure.buffer_state(left), Some(BufferState::Valid));
        assert_eq!(figure.buffer_state(right), Some(BufferState::Empty));
        let tree = figure.tree();
        let pixels = tree.leaf(left).and_then(|l| l.pixels.as_ref()).expect("pixels");
        assert_eq!((pixels.width(), pixels.height()), (70, 50));
    }

    #[test]
    fn adopt_pixels_rejects_wrong_size() {
        let (figure, _) = new_figure();
        let err = figure
            .adopt_pixels(
                figure.tree().root(),
                RasterBuffer::new(
                    3,
                    3,
                    vec![BufferPlane {
                        index: PlaneIndex::ORIGIN,
                        data: vec![0.0; 9],
                    }],
                )
                .expect("buffer"),
            )
            .expect_err("size mismatch");
        assert!(matches!(err, FigureError::SizeMismatch { .. }));
    }

    #[test]
    fn copy_paste_and_reuse_geometry() {
        let (mut figure, sources) = new_figure();
        sources.insert("other", ramp(200, 100));
        figure
            .split(figure.tree().root(), SplitAxis::Vertical, 2)
            .expect("split");
        let [top, bottom] = figure.tree().leaves()[..] else {
            panic!("two leaves");
        };
        assert!(matches!(figure.paste_data(bottom), Err(FigureError::ClipboardEmpty)));
        figure
            .transfer_region(top, crop(10.0, 10.0, 102.0, 24.0))
            .expect("fill");
        figure.copy_data(top).expect("copy");
        assert!(
            figure
                .available_actions(Some(bottom))
                .contains(PanelActions::PASTE)
        );
        figure.paste_data(bottom).expect("paste");
        let tree = figure.tree();
        assert_eq!(
            tree.leaf(bottom).expect("leaf").data.corners,
            tree.leaf(top).expect("leaf").data.corners
        );

        figure
            .reuse_geometry(top, bottom, SourceRef::external("other"))
            .expect("reuse");
        let tree = figure.tree();
        let bottom_data = &tree.leaf(bottom).expect("leaf").data;
        assert_eq!(bottom_data.source, SourceRef::external("other"));
        assert_eq!(bottom_data.corners, tree.leaf(top).expect("leaf").data.corners);
    }

    #[test]
    fn clear_keeps_notes_and_annotations_are_stored() {
        let (figure, _) = new_figure();
        let leaf = figure.tree().root();
        figure.set_notes(leaf, "keep me").expect("notes");
        figure
            .set_label(leaf, Some(LabelState::new("A")))
            .expect("label");
        figure
            .transfer_region(leaf, crop(0.0, 0.0, 102.0, 50.0))
            .expect("fill");
        figure.clear_leaf(leaf).expect("clear");
        let tree = figure.tree();
        let panel = tree.leaf(leaf).expect("leaf");
        assert!(panel.data.is_empty());
        assert!(panel.pixels.is_none());
        assert_eq!(panel.data.notes, "keep me");
        assert_eq!(panel.label, Some(LabelState::new("A")));
        assert!(matches!(
            figure.refill_leaf(leaf),
            Err(FigureError::NothingToResample { .. })
        ));
    }

    #[test]
    fn background_fill_completes_and_reports_progress() {
        let (figure, _) = new_figure();
        let leaf = figure.tree().root();
        let task = figure
            .spawn_transfer(leaf, crop(0.0, 0.0, 200.0, 100.0))
            .expect("spawn");
        assert_eq!(task.leaf(), leaf);
        let report = task.join().expect("fill");
        assert_eq!(report.leaf, leaf);
        assert_eq!(figure.buffer_state(leaf), Some(BufferState::Valid));
    }

    #[test]
    fn cancelled_background_fill_keeps_previous_buffer() {
        let (figure, sources) = new_figure();
        sources.insert("big", ramp(2000, 2000));
        let leaf = figure.tree().root();
        figure
            .transfer_region(leaf, crop(0.0, 0.0, 10.0, 10.0))
            .expect("first fill");
        let before = figure.tree().leaf(leaf).expect("leaf").clone();

        let task = figure
            .spawn_transfer(
                leaf,
                TransferRequest::new(
                    SourceRef::external("big"),
                    Quad::from_rect(0.0, 0.0, 2000.0, 2000.0),
                )
                .with_interpolation(Interpolation::HighOrderSpline),
            )
            .expect("spawn");
        task.cancel();
        assert!(task.is_cancelled());
        match task.join() {
            Err(err) => {
                assert_eq!(err.class(), ErrorClass::Cancelled);
                assert_eq!(figure.tree().leaf(leaf), Some(&before));
            }
            // The worker may finish before it sees the cancel.
            Ok(report) => assert_eq!(report.leaf, leaf),
        }
    }

    #[test]
    fn notes_edited_during_fill_survive() {
        let (figure, _) = new_figure();
        let leaf = figure.tree().root();
        figure.set_notes(leaf, "before fill").expect("notes");
        let edit_notes = |_: Progress| {
            figure.set_notes(leaf, "edited mid-fill").expect("notes");
        };
        figure
            .transfer_region_with(
                leaf,
                crop(0.0, 0.0, 102.0, 50.0),
                CancellationToken::never(),
                &edit_notes,
            )
            .expect("fill");
        let tree = figure.tree();
        let panel = tree.leaf(leaf).expect("leaf");
        assert_eq!(panel.data.notes, "edited mid-fill");
        assert_eq!(panel.data.source, SourceRef::external("ramp"));
        assert_eq!(figure.buffer_state(leaf), Some(BufferState::Valid));
    }

    #[test]
    fn refresh_without_stale_leaves_reports_nothing() {
        let (figure, _) = new_figure();
        let leaf = figure.tree().root();
        figure
            .transfer_region(leaf, crop(0.0, 0.0, 102.0, 50.0))
            .expect("fill");
        let report = figure.refresh_stale();
        assert!(report.refilled.is_empty());
        assert!(report.cleared.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn separator_color_applies_to_existing_and_later_splits() {
        let (mut figure, _) = new_figure();
        let root = figure.tree().root();
        figure.split(root, SplitAxis::Horizontal, 2).expect("split");
        let right = figure.tree().leaves()[1];
        figure.split(right, SplitAxis::Vertical, 2).expect("nested split");
        let hash = figure.tree().state_hash();

        let changed = figure.set_separator_color(Rgb::BLACK);
        assert_eq!(changed, vec![root, right]);
        assert_ne!(figure.tree().state_hash(), hash);

        let leaf = figure.tree().leaves()[0];
        figure.split(leaf, SplitAxis::Vertical, 2).expect("later split");
        let tree = figure.tree();
        let colors: Vec<Rgb> = tree
            .nodes()
            .filter_map(|node| node.as_separator().map(|separator| separator.color))
            .collect();
        assert_eq!(colors, vec![Rgb::BLACK; 3]);
    }

    #[test]
    fn calibration_scales_the_canvas() {
        let (mut figure, _) = new_figure();
        assert_eq!(figure.calibration(), &Calibration::default());
        figure
            .set_calibration(Calibration::new(0.25, "mm"))
            .expect("calibration");
        assert_eq!(figure.physical_size(), (25.5, 12.5));
        assert_eq!(figure.calibration().unit, "mm");

        let err = figure
            .set_calibration(Calibration::new(0.0, "mm"))
            .expect_err("zero width");
        assert!(matches!(err, FigureError::InvalidCalibration { .. }));
        assert_eq!(figure.calibration(), &Calibration::new(0.25, "mm"));
    }
}
