#![forbid(unsafe_code)]

//! Panel tree layout for multi-panel figures.
//!
//! # Role in panelfig
//! `panelfig-layout` owns the figure's structure: which rectangle of the
//! canvas each panel occupies and what data each leaf panel was filled from.
//! It performs no I/O and never resamples pixels; filling a leaf is the job
//! of `panelfig-sample`, driven by the `panelfig` facade.
//!
//! # Primary responsibilities
//! - **Structure**: [`PanelTree`] with split, remove, and resize operations
//!   that keep the canvas exactly tiled.
//! - **Provenance**: [`DataSource`] records per leaf.
//! - **Sharing**: [`SharedPanelTree`] for wait-free concurrent reads.
//! - **Enablement**: [`PanelActions`] derived from the current selection.

pub mod actions;
pub mod data_source;
pub mod panel;
pub mod shared;

pub use actions::PanelActions;
pub use data_source::{DataSource, DisplayRange, SourceRef};
pub use panel::{
    BufferState, DEFAULT_MIN_PANEL_EXTENT, DEFAULT_SEPARATOR_THICKNESS, LabelState, LeafPanel,
    PANEL_TREE_SCHEMA_VERSION, PanelId, PanelKind, PanelModelError, PanelNode, PanelOperation,
    PanelOperationError, PanelOperationFailure, PanelOperationKind, PanelOperationOutcome,
    PanelTree, PanelTreeSnapshot, Rgb, ScalebarState, SeparatorPanel, SeparatorStyle, SplitAxis,
    split_extents,
};
pub use shared::SharedPanelTree;
