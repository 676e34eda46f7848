//! Provenance record owned by each leaf panel.
//!
//! A [`DataSource`] says which source pixels produced a leaf's buffer: the
//! source reference, the four corner coordinates, the plane position, and the
//! preprocessing and display state recorded at transfer time. It is a plain
//! value; copying it between leaves is a deep clone.

use std::fmt;
use std::path::PathBuf;

use panelfig_core::{Calibration, Interpolation, PlaneIndex, Quad, StackDims};
use serde::{Deserialize, Serialize};

/// Where a leaf's pixels came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceRef {
    /// Nothing transferred yet.
    #[default]
    Unset,
    /// Image file on disk.
    File { path: PathBuf },
    /// Identifier resolved by the host (an open image, a stream, ...).
    External { id: String },
}

impl SourceRef {
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    #[must_use]
    pub fn external(id: impl Into<String>) -> Self {
        Self::External { id: id.into() }
    }

    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("<unset>"),
            Self::File { path } => write!(f, "file:{}", path.display()),
            Self::External { id } => write!(f, "external:{id}"),
        }
    }
}

/// Display window applied when the leaf is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Leaf provenance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    pub source: SourceRef,
    /// Region of interest in source pixel space; `None` until a transfer.
    pub corners: Option<Quad>,
    /// Channel, slice, and frame selected at transfer time.
    pub position: PlaneIndex,
    /// Per-channel `'1'`/`'0'` mask of the channels shown when the region was
    /// taken, e.g. `"101"`. `None` means every channel.
    pub active_channels: Option<String>,
    /// Effective calibration of the leaf's pixels.
    pub calibration: Calibration,
    pub display_range: Option<DisplayRange>,
    pub interpolation: Interpolation,
    pub notes: String,
    /// Preprocessing recorded upstream, replayed by the host if needed.
    pub macro_text: String,
}

impl DataSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while there is nothing to re-sample from.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_unset() || self.corners.is_none()
    }

    /// Reset the region and source reference. Notes and the kernel choice are
    /// kept.
    pub fn clear(&mut self) {
        let notes = std::mem::take(&mut self.notes);
        let interpolation = self.interpolation;
        *self = Self {
            notes,
            interpolation,
            ..Self::default()
        };
    }

    /// Source planes to sample for a stack of shape `dims`.
    ///
    /// With an active-channel mask, the masked channels at the recorded slice
    /// and frame; otherwise every channel at the recorded slice and frame.
    /// Mask positions beyond the stack's channel count are ignored. The slice
    /// and frame are not range-checked here.
    #[must_use]
    pub fn selected_planes(&self, dims: StackDims) -> Vec<PlaneIndex> {
        let PlaneIndex { slice, frame, .. } = self.position;
        match &self.active_channels {
            None => dims.channels_at(slice, frame),
            Some(mask) => mask
                .chars()
                .take(dims.channels as usize)
                .enumerate()
                .filter(|(_, flag)| *flag == '1')
                .map(|(channel, _)| PlaneIndex::new(channel as u32, slice, frame))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> DataSource {
        DataSource {
            source: SourceRef::file("/data/cells.tif"),
            corners: Some(Quad::from_rect(10.0, 20.0, 100.0, 50.0)),
            position: PlaneIndex::new(1, 3, 0),
            active_channels: Some("101".into()),
            calibration: Calibration::new(0.25, "um"),
            display_range: Some(DisplayRange::new(0.0, 4095.0)),
            interpolation: Interpolation::Bicubic,
            notes: "stained 48h".into(),
            macro_text: "run(\"Gaussian Blur...\", \"sigma=2\");".into(),
        }
    }

    #[test]
    fn new_record_is_empty() {
        let data = DataSource::new();
        assert!(data.is_empty());
        assert_eq!(data.source, SourceRef::Unset);
        assert_eq!(data.position, PlaneIndex::ORIGIN);
    }

    #[test]
    fn clear_resets_region_but_keeps_notes() {
        let mut data = populated();
        assert!(!data.is_empty());
        data.clear();
        assert!(data.is_empty());
        assert_eq!(data.corners, None);
        assert_eq!(data.calibration, Calibration::default());
        assert_eq!(data.notes, "stained 48h");
        assert_eq!(data.interpolation, Interpolation::Bicubic);
    }

    #[test]
    fn copies_are_independent() {
        let original = populated();
        let mut copy = original.clone();
        copy.notes.push_str(" (copy)");
        copy.corners = None;
        assert_eq!(original.notes, "stained 48h");
        assert!(original.corners.is_some());
    }

    #[test]
    fn mask_selects_channels_at_recorded_position() {
        let data = populated();
        let planes = data.selected_planes(StackDims::new(3, 5, 1));
        assert_eq!(
            planes,
            vec![PlaneIndex::new(0, 3, 0), PlaneIndex::new(2, 3, 0)]
        );
        // Mask longer than the stack is truncated.
        assert_eq!(
            data.selected_planes(StackDims::new(1, 5, 1)),
            vec![PlaneIndex::new(0, 3, 0)]
        );
    }

    #[test]
    fn no_mask_selects_every_channel() {
        let mut data = populated();
        data.active_channels = None;
        let planes = data.selected_planes(StackDims::new(2, 5, 1));
        assert_eq!(
            planes,
            vec![PlaneIndex::new(0, 3, 0), PlaneIndex::new(1, 3, 0)]
        );
    }

    #[test]
    fn serde_round_trip_keeps_every_field() {
        let data = populated();
        let json = serde_json::to_string(&data).expect("serialize");
        assert!(json.contains("\"type\":\"file\""));
        let back: DataSource = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, data);
    }
}
