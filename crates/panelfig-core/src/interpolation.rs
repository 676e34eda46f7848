#![forbid(unsafe_code)]

//! Interpolation kernel names.
//!
//! The set is closed. Parsing an unknown name fails instead of falling back
//! to a default, so a typo in a saved figure or config never silently changes
//! the resampling result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resampling kernel used to fill a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Closest source pixel.
    Nearest,
    /// 2x2 linear blend.
    #[default]
    Bilinear,
    /// 4x4 Catmull-Rom cubic.
    Bicubic,
    /// 6x6 interpolating spline.
    HighOrderSpline,
}

impl Interpolation {
    /// Every kernel, in increasing support size.
    pub const ALL: [Self; 4] = [
        Self::Nearest,
        Self::Bilinear,
        Self::Bicubic,
        Self::HighOrderSpline,
    ];

    /// Canonical name used in configs and snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::HighOrderSpline => "high_order_spline",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a kernel name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInterpolation {
    pub name: String,
}

impl fmt::Display for UnknownInterpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown interpolation kernel {:?} (expected nearest, bilinear, bicubic, or high_order_spline)",
            self.name
        )
    }
}

impl std::error::Error for UnknownInterpolation {}

impl FromStr for Interpolation {
    type Err = UnknownInterpolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "nearest" | "none" | "nearest_neighbor" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            "bicubic" | "cubic" => Ok(Self::Bicubic),
            "high_order_spline" | "spline" | "quintic" | "quintic_b_spline" => {
                Ok(Self::HighOrderSpline)
            }
            _ => Err(UnknownInterpolation { name: s.to_string() }),
        }
    }
}
