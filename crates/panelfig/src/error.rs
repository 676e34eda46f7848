#![forbid(unsafe_code)]

//! Facade error type and its coarse classification.

use std::fmt;

use panelfig_layout::{PanelId, PanelModelError, PanelOperationError, PanelOperationFailure};
use panelfig_sample::SampleError;

use crate::config::ConfigError;
use crate::source::SourceError;

/// Coarse error taxonomy shared by every facade entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    DegenerateRegion,
    InvalidSplit,
    StructuralInvariantViolation,
    SourceUnavailable,
    Cancelled,
    Other,
}

impl ErrorClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DegenerateRegion => "degenerate_region",
            Self::InvalidSplit => "invalid_split",
            Self::StructuralInvariantViolation => "structural_invariant_violation",
            Self::SourceUnavailable => "source_unavailable",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`Figure`](crate::Figure) and its collaborators.
#[derive(Debug)]
pub enum FigureError {
    Operation(PanelOperationError),
    Model(PanelModelError),
    Sample(SampleError),
    Source(SourceError),
    Config(ConfigError),
    Json(serde_json::Error),
    Io(std::io::Error),
    /// The node does not exist or is a separator.
    NotALeaf { id: PanelId },
    /// The leaf has no recorded region to re-sample.
    NothingToResample { id: PanelId },
    /// Pixels offered for a leaf do not match its size.
    SizeMismatch {
        id: PanelId,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    ClipboardEmpty,
    /// Canvas pixel width must be finite and positive.
    InvalidCalibration { pixel_width: f64 },
    UnsupportedSchemaVersion { version: u16 },
    /// The fill worker panicked.
    WorkerPanicked,
}

impl FigureError {
    /// Taxonomy class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Operation(err) => match &err.reason {
                PanelOperationFailure::InvalidSplit { .. } => ErrorClass::InvalidSplit,
                PanelOperationFailure::Validation(_) => ErrorClass::StructuralInvariantViolation,
                _ => ErrorClass::Other,
            },
            Self::Model(_) => ErrorClass::StructuralInvariantViolation,
            Self::Sample(SampleError::DegenerateRegion(_)) => ErrorClass::DegenerateRegion,
            Self::Sample(SampleError::Cancelled) => ErrorClass::Cancelled,
            Self::Source(_) => ErrorClass::SourceUnavailable,
            _ => ErrorClass::Other,
        }
    }
}

impl fmt::Display for FigureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(err) => err.fmt(f),
            Self::Model(err) => write!(f, "invalid panel tree: {err}"),
            Self::Sample(err) => err.fmt(f),
            Self::Source(err) => err.fmt(f),
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Json(err) => write!(f, "figure JSON: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::NotALeaf { id } => write!(f, "node {id} is not a leaf panel"),
            Self::NothingToResample { id } => {
                write!(f, "leaf {id} has no recorded source region")
            }
            Self::SizeMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "leaf {id} is {}x{} but the pixels are {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::ClipboardEmpty => write!(f, "nothing has been copied"),
            Self::InvalidCalibration { pixel_width } => {
                write!(f, "canvas pixel width must be finite and positive, got {pixel_width}")
            }
            Self::UnsupportedSchemaVersion { version } => {
                write!(f, "unsupported figure schema version {version}")
            }
            Self::WorkerPanicked => write!(f, "fill worker panicked"),
        }
    }
}

impl std::error::Error for FigureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Model(err) => Some(err),
            Self::Sample(err) => Some(err),
            Self::Source(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PanelOperationError> for FigureError {
    fn from(err: PanelOperationError) -> Self {
        Self::Operation(err)
    }
}

impl From<PanelModelError> for FigureError {
    fn from(err: PanelModelError) -> Self {
        Self::Model(err)
    }
}

impl From<SampleError> for FigureError {
    fn from(err: SampleError) -> Self {
        Self::Sample(err)
    }
}

impl From<SourceError> for FigureError {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

impl From<ConfigError> for FigureError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<serde_json::Error> for FigureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<std::io::Error> for FigureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
