#![forbid(unsafe_code)]

//! Interpolation kernels evaluated at fractional source coordinates.
//!
//! Coordinates arrive in continuous image space (pixel `i` spans `[i, i+1)`)
//! and are shifted by half a pixel into index space before weighting.
//! Neighbor reads outside the plane clamp to the nearest edge pixel.
//!
//! All kernels are interpolating: at integral index positions the center
//! weight is one and every other weight is zero, so an identity mapping
//! reproduces the source.

use panelfig_core::{Interpolation, PlaneView};

/// Index-space coordinates this close to an integer are treated as integral.
///
/// Absorbs the rounding of the bilinear mapper so that identity and integer
/// ratio mappings hit source pixels exactly.
pub const SNAP_EPSILON: f64 = 1e-6;

/// Largest tap count per axis across all kernels.
const MAX_TAPS: usize = 6;

/// Separable filter shape.
pub trait KernelFunction {
    /// Support radius in pixels; the kernel reads `2 * RADIUS` taps per axis.
    const RADIUS: usize;

    /// Weight at distance `x >= 0` from the sample position.
    fn weight(x: f64) -> f64;
}

/// Linear (tent) kernel, radius 1.
pub struct Linear;

impl KernelFunction for Linear {
    const RADIUS: usize = 1;

    fn weight(x: f64) -> f64 {
        if x < 1.0 { 1.0 - x } else { 0.0 }
    }
}

/// Catmull-Rom cubic, radius 2.
pub struct CatmullRom;

impl KernelFunction for CatmullRom {
    const RADIUS: usize = 2;

    fn weight(x: f64) -> f64 {
        if x < 1.0 {
            return 0.5 * (2.0 + x * x * (-5.0 + x * 3.0));
        }
        if x < 2.0 {
            return 0.5 * (4.0 + x * (-8.0 + x * (5.0 - x)));
        }
        0.0
    }
}

/// Spline36 interpolating spline, radius 3.
pub struct Spline36;

impl KernelFunction for Spline36 {
    const RADIUS: usize = 3;

    fn weight(x: f64) -> f64 {
        if x < 1.0 {
            return ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0;
        }
        if x < 2.0 {
            let x = x - 1.0;
            return ((-6.0 / 11.0 * x + 270.0 / 209.0) * x - 156.0 / 209.0) * x;
        }
        if x < 3.0 {
            let x = x - 2.0;
            return ((1.0 / 11.0 * x - 45.0 / 209.0) * x + 26.0 / 209.0) * x;
        }
        0.0
    }
}

#[inline]
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON { r } else { v }
}

/// Sample `plane` at continuous source coordinate `(sx, sy)`.
#[must_use]
pub fn sample(plane: &PlaneView<'_>, interpolation: Interpolation, sx: f64, sy: f64) -> f32 {
    let fx = snap(sx - 0.5);
    let fy = snap(sy - 0.5);
    match interpolation {
        Interpolation::Nearest => plane.clamped(fx.round() as i64, fy.round() as i64),
        Interpolation::Bilinear => sample_separable::<Linear>(plane, fx, fy),
        Interpolation::Bicubic => sample_separable::<CatmullRom>(plane, fx, fy),
        Interpolation::HighOrderSpline => sample_separable::<Spline36>(plane, fx, fy),
    }
}

/// Normalized weights for the taps around `f`; returns the first tap index.
fn taps<K: KernelFunction>(f: f64, weights: &mut [f64; MAX_TAPS]) -> i64 {
    let radius = K::RADIUS as i64;
    let first = (f.floor() as i64).saturating_sub(radius - 1);
    let count = 2 * K::RADIUS;
    let mut sum = 0.0;
    for (i, w) in weights.iter_mut().enumerate().take(count) {
        let d = (first.saturating_add(i as i64) as f64 - f).abs();
        *w = K::weight(d);
        sum += *w;
    }
    if sum != 0.0 && sum != 1.0 {
        for w in weights.iter_mut().take(count) {
            *w /= sum;
        }
    }
    first
}

fn sample_separable<K: KernelFunction>(plane: &PlaneView<'_>, fx: f64, fy: f64) -> f32 {
    let count = 2 * K::RADIUS;
    let mut wx = [0.0; MAX_TAPS];
    let mut wy = [0.0; MAX_TAPS];
    let x0 = taps::<K>(fx, &mut wx);
    let y0 = taps::<K>(fy, &mut wy);

    let mut acc = 0.0_f64;
    for (j, wj) in wy.iter().enumerate().take(count) {
        if *wj == 0.0 {
            continue;
        }
        let y = y0.saturating_add(j as i64);
        let mut row = 0.0_f64;
        for (i, wi) in wx.iter().enumerate().take(count) {
            if *wi == 0.0 {
                continue;
            }
            row += wi * f64::from(plane.clamped(x0.saturating_add(i as i64), y));
        }
        acc += wj * row;
    }
    acc as f32
}
