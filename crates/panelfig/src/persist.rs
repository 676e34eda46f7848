#![forbid(unsafe_code)]

//! Saving and reopening figures as JSON.
//!
//! A saved figure holds the config, the canvas calibration, and the panel
//! tree with every leaf's provenance. Pixels are not stored; loading re-samples each leaf from its
//! recorded region.

use std::path::Path;
use std::sync::Arc;

use panelfig_core::Calibration;
use panelfig_layout::{PanelId, PanelTree, PanelTreeSnapshot};
use serde::{Deserialize, Serialize};

use crate::config::FigureConfig;
use crate::error::FigureError;
use crate::figure::Figure;
use crate::source::SourceProvider;

/// Current on-disk figure format.
pub const FIGURE_SCHEMA_VERSION: u16 = 1;

/// Serialized figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSnapshot {
    pub schema_version: u16,
    #[serde(default)]
    pub config: FigureConfig,
    /// Physical size of one canvas pixel.
    #[serde(default)]
    pub calibration: Calibration,
    pub tree: PanelTreeSnapshot,
}

#[derive(Deserialize)]
struct SchemaProbe {
    schema_version: u16,
}

/// Leaves re-sampled while loading.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub refilled: Vec<PanelId>,
    /// Leaves whose source could not be re-sampled. They load empty with
    /// their provenance intact.
    pub failed: Vec<(PanelId, FigureError)>,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Figure {
    #[must_use]
    pub fn snapshot(&self) -> FigureSnapshot {
        FigureSnapshot {
            schema_version: FIGURE_SCHEMA_VERSION,
            config: self.config().clone(),
            calibration: self.calibration().clone(),
            tree: self.tree().to_snapshot(),
        }
    }

    pub fn to_json(&self) -> Result<String, FigureError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), FigureError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    /// Rebuild a figure from JSON and re-sample every leaf with a recorded
    /// region.
    pub fn load_json(
        json: &str,
        sources: Arc<dyn SourceProvider>,
    ) -> Result<(Self, LoadReport), FigureError> {
        let probe: SchemaProbe = serde_json::from_str(json)?;
        if probe.schema_version != FIGURE_SCHEMA_VERSION {
            return Err(FigureError::UnsupportedSchemaVersion {
                version: probe.schema_version,
            });
        }
        let snapshot: FigureSnapshot = serde_json::from_str(json)?;
        let tree = PanelTree::from_snapshot(snapshot.tree)?;
        let mut figure = Self::from_tree(tree, snapshot.config, sources)?;
        figure.set_calibration(snapshot.calibration)?;

        let mut report = LoadReport::default();
        let tree = figure.tree();
        for leaf in tree.leaves() {
            if tree.leaf(leaf).is_none_or(|panel| panel.data.is_empty()) {
                continue;
            }
            match figure.refill_leaf(leaf) {
                Ok(_) => report.refilled.push(leaf),
                Err(err) => {
                    tracing::warn!(
                        target: "panelfig.figure",
                        leaf = %leaf,
                        error = %err,
                        "leaf could not be re-sampled on load"
                    );
                    report.failed.push((leaf, err));
                }
            }
        }
        tracing::info!(
            target: "panelfig.figure",
            leaves = tree.leaves().len(),
            refilled = report.refilled.len(),
            failed = report.failed.len(),
            "figure loaded"
        );
        Ok((figure, report))
    }

    pub fn load_json_file(
        path: impl AsRef<Path>,
        sources: Arc<dyn SourceProvider>,
    ) -> Result<(Self, LoadReport), FigureError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::load_json(&json, sources)
    }
}
