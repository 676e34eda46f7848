#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Canvas geometry is integral (`Rect`, pixel units, origin at top-left).
//! Source-image geometry is continuous (`Point`, `Quad`): pixel `i` covers the
//! half-open interval `[i, i + 1)`, so its center sits at `i + 0.5`.

use serde::{Deserialize, Serialize};

/// An axis-aligned canvas rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Same width and height as `other`, regardless of position.
    #[inline]
    pub const fn same_size(&self, other: &Rect) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Check if an integral pixel lies inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if a continuous point lies inside the closed rectangle
    /// `[x, right] x [y, bottom]`.
    ///
    /// Edges count as inside; hit testing relies on this so that a pointer
    /// exactly on an outer border still resolves to the rectangle.
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= f64::from(self.x)
            && point.x <= f64::from(self.right())
            && point.y >= f64::from(self.y)
            && point.y <= f64::from(self.bottom())
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Check whether two rectangles share at least one pixel.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.intersection_opt(other).is_some()
    }
}

/// A point in continuous coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation `self + t * (other - self)`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Corner slot of a [`Quad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

/// Four ordered corners of a source-image region of interest.
///
/// Corner order is fixed: top-left, top-right, bottom-right, bottom-left
/// (clockwise in image coordinates). The quad is a plain value; validity
/// (non-collinear corners) is checked by the mapper that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    #[must_use]
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Build from the parallel coordinate arrays used by selection tools.
    #[must_use]
    pub fn from_xy(xs: [f64; 4], ys: [f64; 4]) -> Self {
        Self::new([
            Point::new(xs[0], ys[0]),
            Point::new(xs[1], ys[1]),
            Point::new(xs[2], ys[2]),
            Point::new(xs[3], ys[3]),
        ])
    }

    /// Axis-aligned quad covering `width x height` source pixels from `(x, y)`.
    #[must_use]
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new([
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    #[inline]
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> Point {
        self.corners[corner as usize]
    }

    /// X coordinates in corner order.
    #[must_use]
    pub fn xs(&self) -> [f64; 4] {
        self.corners.map(|p| p.x)
    }

    /// Y coordinates in corner order.
    #[must_use]
    pub fn ys(&self) -> [f64; 4] {
        self.corners.map(|p| p.y)
    }

    /// Euclidean length of the edge between two corners.
    #[must_use]
    pub fn edge_length(&self, from: Corner, to: Corner) -> f64 {
        self.corner(from).distance(self.corner(to))
    }

    /// Signed shoelace area (positive for clockwise corners in image space).
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let mut twice = 0.0;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            twice += a.x * b.y - b.x * a.y;
        }
        twice * 0.5
    }

    /// Return a copy shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.corners.map(|p| Point::new(p.x + dx, p.y + dy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_area() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.area(), 1200);
        assert!(!r.is_empty());
        assert!(Rect::new(0, 0, 0, 5).is_empty());
    }

    #[test]
    fn rect_contains_point_is_closed() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(Point::new(0.0, 0.0)));
        assert!(r.contains_point(Point::new(10.0, 10.0)));
        assert!(!r.contains_point(Point::new(10.01, 5.0)));
        assert!(!r.contains_point(Point::new(-0.5, 5.0)));
    }

    #[test]
    fn rect_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        let c = Rect::new(9, 9, 2, 2);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert_eq!(a.intersection_opt(&c), Some(Rect::new(9, 9, 1, 1)));
    }

    #[test]
    fn quad_from_rect_orders_corners_clockwise() {
        let q = Quad::from_rect(0.0, 0.0, 100.0, 50.0);
        assert_eq!(q.corner(Corner::TopRight), Point::new(100.0, 0.0));
        assert_eq!(q.corner(Corner::BottomLeft), Point::new(0.0, 50.0));
        assert!((q.signed_area() - 5000.0).abs() < 1e-9);
        assert!((q.edge_length(Corner::TopLeft, Corner::TopRight) - 100.0).abs() < 1e-12);
        assert!((q.edge_length(Corner::TopLeft, Corner::BottomLeft) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn quad_xy_round_trip() {
        let q = Quad::from_xy([1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]);
        assert_eq!(q.xs(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(q.ys(), [5.0, 6.0, 7.0, 8.0]);
        let moved = q.translated(1.0, -1.0);
        assert_eq!(moved.corner(Corner::TopLeft), Point::new(2.0, 4.0));
    }
}
