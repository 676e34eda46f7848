#![forbid(unsafe_code)]

//! Multi-panel scientific figures.
//!
//! # Role in panelfig
//! `panelfig` is the facade crate. It ties the panel tree from
//! `panelfig-layout` to the resampler in `panelfig-sample` and to a
//! [`SourceProvider`] that supplies source images.
//!
//! # Primary responsibilities
//! - **Editing**: [`Figure`] splits, removes, and resizes panels and fills
//!   leaves from quadrilateral regions of source images.
//! - **Background work**: [`FillTask`] runs a fill on a worker thread with
//!   progress and cancellation.
//! - **Persistence**: figures save to JSON without pixels and re-sample on
//!   load.
//! - **Configuration**: [`FigureConfig`] from TOML, JSON, and `PANELFIG_*`
//!   environment overrides.
//!
//! # Quick start
//! ```
//! use std::sync::Arc;
//! use panelfig::{Figure, FigureConfig, MemorySourceProvider, TransferRequest};
//! use panelfig_core::{Quad, Raster, Rect};
//! use panelfig_layout::{SourceRef, SplitAxis};
//!
//! let sources = Arc::new(MemorySourceProvider::new());
//! sources.insert("blot", Raster::single_plane(4, 4, vec![1.0; 16]).unwrap());
//!
//! let mut figure = Figure::new(Rect::from_size(42, 20), FigureConfig::default(), sources).unwrap();
//! figure.split(figure.tree().root(), SplitAxis::Horizontal, 2).unwrap();
//! let left = figure.tree().leaves()[0];
//! let request = TransferRequest::new(SourceRef::external("blot"), Quad::from_rect(0.0, 0.0, 4.0, 4.0));
//! let report = figure.transfer_region(left, request).unwrap();
//! assert_eq!((report.width, report.height), (20, 20));
//! ```

pub mod config;
pub mod error;
pub mod figure;
pub mod fill;
pub mod persist;
pub mod source;
pub mod telemetry;

pub use config::{ConfigError, FigureConfig, SeparatorConfig};
pub use error::{ErrorClass, FigureError};
pub use figure::{Figure, RefreshReport, TransferRequest};
pub use fill::{FillReport, FillTask};
pub use persist::{FIGURE_SCHEMA_VERSION, FigureSnapshot, LoadReport};
pub use source::{
    FileSourceProvider, MemorySourceProvider, SourceError, SourceProvider, decode_file,
    raster_from_image,
};
pub use telemetry::{DEFAULT_FILTER, init_tracing};
