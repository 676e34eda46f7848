#![forbid(unsafe_code)]

//! Bilinear mapping from the unit square onto a source quadrilateral.
//!
//! A destination pixel `(u, v)` of a `W x H` raster is normalized to the
//! pixel-center coordinate `(s, t) = ((u + 0.5) / W, (v + 0.5) / H)` and
//! mapped with
//!
//! ```text
//! P(s, t) = (1-s)(1-t) C0 + s(1-t) C1 + s t C2 + (1-s) t C3
//! ```
//!
//! where `C0..C3` are the quad corners (top-left, top-right, bottom-right,
//! bottom-left). For an axis-aligned rectangle this is an exact crop and
//! scale; for a general quad it is bilinear, not projective, so straight
//! lines are preserved only when the quad is a parallelogram.

use std::fmt;

use panelfig_core::{Corner, Point, Quad};

/// Triangles spanned by any three corners must exceed this area (in square
/// source pixels) for the quad to be accepted.
pub const MIN_TRIANGLE_AREA: f64 = 1e-6;

/// Why a quad was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegenerateReason {
    /// A corner coordinate is NaN or infinite.
    NonFinite { corner: Corner },
    /// Three corners are (nearly) collinear.
    Collinear { corners: [Corner; 3], area: f64 },
    /// Corners are finite but far enough apart that an edge span or a
    /// triangle area overflows.
    Unbounded { corners: [Corner; 2] },
}

/// A quadrilateral that cannot be sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegenerateRegion {
    pub quad: Quad,
    pub reason: DegenerateReason,
}

impl fmt::Display for DegenerateRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            DegenerateReason::NonFinite { corner } => {
                write!(f, "degenerate region: corner {corner:?} is not finite")
            }
            DegenerateReason::Collinear { corners, area } => write!(
                f,
                "degenerate region: corners {:?}, {:?}, {:?} are collinear (area {area:e})",
                corners[0], corners[1], corners[2]
            ),
            DegenerateReason::Unbounded { corners } => write!(
                f,
                "degenerate region: span from {:?} to {:?} overflows",
                corners[0], corners[1]
            ),
        }
    }
}

impl std::error::Error for DegenerateRegion {}

const CORNERS: [Corner; 4] = [
    Corner::TopLeft,
    Corner::TopRight,
    Corner::BottomRight,
    Corner::BottomLeft,
];

/// Validated quad with point-mapping and edge-length queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadMapper {
    quad: Quad,
}

impl QuadMapper {
    /// Validate `quad`: finite corners, finite spans between them and no
    /// three corners collinear.
    pub fn new(quad: Quad) -> Result<Self, DegenerateRegion> {
        for corner in CORNERS {
            if !quad.corner(corner).is_finite() {
                return Err(DegenerateRegion {
                    quad,
                    reason: DegenerateReason::NonFinite { corner },
                });
            }
        }
        for (i, &from) in CORNERS.iter().enumerate() {
            for &to in &CORNERS[i + 1..] {
                let (a, b) = (quad.corner(from), quad.corner(to));
                if !(b.x - a.x).is_finite() || !(b.y - a.y).is_finite() {
                    return Err(DegenerateRegion {
                        quad,
                        reason: DegenerateReason::Unbounded {
                            corners: [from, to],
                        },
                    });
                }
            }
        }
        for skip in 0..4 {
            let picked: Vec<Corner> = (0..4).filter(|i| *i != skip).map(|i| CORNERS[i]).collect();
            let triple = [picked[0], picked[1], picked[2]];
            let area = triangle_area(
                quad.corner(triple[0]),
                quad.corner(triple[1]),
                quad.corner(triple[2]),
            );
            if !area.is_finite() {
                return Err(DegenerateRegion {
                    quad,
                    reason: DegenerateReason::Unbounded {
                        corners: [triple[0], triple[2]],
                    },
                });
            }
            if area <= MIN_TRIANGLE_AREA {
                return Err(DegenerateRegion {
                    quad,
                    reason: DegenerateReason::Collinear {
                        corners: triple,
                        area,
                    },
                });
            }
        }
        Ok(Self { quad })
    }

    #[must_use]
    pub const fn quad(&self) -> &Quad {
        &self.quad
    }

    /// Map a unit-square coordinate onto the quad.
    #[must_use]
    pub fn map_unit(&self, s: f64, t: f64) -> Point {
        let [c0, c1, c2, c3] = self.quad.corners;
        let w0 = (1.0 - s) * (1.0 - t);
        let w1 = s * (1.0 - t);
        let w2 = s * t;
        let w3 = (1.0 - s) * t;
        Point::new(
            w0 * c0.x + w1 * c1.x + w2 * c2.x + w3 * c3.x,
            w0 * c0.y + w1 * c1.y + w2 * c2.y + w3 * c3.y,
        )
    }

    /// Source coordinate for the center of destination pixel `(u, v)`.
    #[must_use]
    pub fn map_pixel(&self, u: u32, v: u32, width: u32, height: u32) -> Point {
        self.row(v, height).at(u, width)
    }

    /// Precomputed mapping for destination row `v` of a raster `height` rows tall.
    ///
    /// Expanding the bilinear form for fixed `t` gives a straight segment from
    /// `lerp(C0, C3, t)` to `lerp(C1, C2, t)`, so a row costs one lerp per pixel.
    #[must_use]
    pub fn row(&self, v: u32, height: u32) -> RowMapping {
        let [c0, c1, c2, c3] = self.quad.corners;
        let t = (f64::from(v) + 0.5) / f64::from(height);
        RowMapping {
            start: c0.lerp(c3, t),
            end: c1.lerp(c2, t),
        }
    }

    /// Length of the edge between two corners.
    #[must_use]
    pub fn edge_length(&self, from: Corner, to: Corner) -> f64 {
        self.quad.edge_length(from, to)
    }

    /// Length of the horizontal (top) edge used for calibration.
    ///
    /// Corners are ordered top-left, top-right, bottom-right, bottom-left, so
    /// the top edge runs `C0 -> C1`. Tools that store the same region in
    /// counter-clockwise point order name their `0 -> 3` edge "top"; it is the
    /// same edge.
    #[must_use]
    pub fn calibration_edge_length(&self) -> f64 {
        self.edge_length(Corner::TopLeft, Corner::TopRight)
    }

    /// Source pixels per destination pixel along the destination width.
    ///
    /// Multiply by the source pixel width to get the panel calibration.
    #[must_use]
    pub fn calibration_factor(&self, dest_width: u32) -> f64 {
        self.calibration_edge_length() / f64::from(dest_width)
    }
}

/// Mapping for one destination row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMapping {
    start: Point,
    end: Point,
}

impl RowMapping {
    /// Source coordinate for the center of column `u` of a raster `width` wide.
    #[inline]
    #[must_use]
    pub fn at(&self, u: u32, width: u32) -> Point {
        let s = (f64::from(u) + 0.5) / f64::from(width);
        self.start.lerp(self.end, s)
    }
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    (((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) * 0.5).abs()
}
