#![forbid(unsafe_code)]

//! Planar multi-dimensional rasters.
//!
//! A [`Raster`] is a source image: `channels x slices x frames` planes of
//! `width x height` samples, stored as `f32` regardless of the on-disk pixel
//! type. A [`RasterBuffer`] is the destination written by the sampler for one
//! panel: only the planes that were selected, each tagged with its origin.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of one plane in a channel/slice/frame stack (all zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct PlaneIndex {
    pub channel: u32,
    pub slice: u32,
    pub frame: u32,
}

impl PlaneIndex {
    #[must_use]
    pub const fn new(channel: u32, slice: u32, frame: u32) -> Self {
        Self {
            channel,
            slice,
            frame,
        }
    }

    /// First plane of a stack.
    pub const ORIGIN: Self = Self::new(0, 0, 0);
}

impl fmt::Display for PlaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}/z{}/t{}", self.channel, self.slice, self.frame)
    }
}

/// Stack extents along the channel, slice, and frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackDims {
    pub channels: u32,
    pub slices: u32,
    pub frames: u32,
}

impl StackDims {
    /// One channel, one slice, one frame.
    pub const SINGLE: Self = Self {
        channels: 1,
        slices: 1,
        frames: 1,
    };

    #[must_use]
    pub const fn new(channels: u32, slices: u32, frames: u32) -> Self {
        Self {
            channels,
            slices,
            frames,
        }
    }

    /// Total number of planes.
    #[must_use]
    pub const fn plane_count(&self) -> usize {
        self.channels as usize * self.slices as usize * self.frames as usize
    }

    #[must_use]
    pub const fn contains(&self, index: PlaneIndex) -> bool {
        index.channel < self.channels && index.slice < self.slices && index.frame < self.frames
    }

    /// Linear plane offset, channel-fastest (`(frame * slices + slice) * channels + channel`).
    #[must_use]
    pub const fn offset(&self, index: PlaneIndex) -> Option<usize> {
        if !self.contains(index) {
            return None;
        }
        let frame = index.frame as usize;
        let slice = index.slice as usize;
        let channel = index.channel as usize;
        Some((frame * self.slices as usize + slice) * self.channels as usize + channel)
    }

    /// Every channel at one slice/frame position.
    #[must_use]
    pub fn channels_at(&self, slice: u32, frame: u32) -> Vec<PlaneIndex> {
        (0..self.channels)
            .map(|channel| PlaneIndex::new(channel, slice, frame))
            .collect()
    }
}

impl Default for StackDims {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Physical pixel size of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Physical width of one pixel.
    pub pixel_width: f64,
    /// Unit of `pixel_width` (e.g. `"µm"`).
    pub unit: String,
}

impl Calibration {
    #[must_use]
    pub fn new(pixel_width: f64, unit: impl Into<String>) -> Self {
        Self {
            pixel_width,
            unit: unit.into(),
        }
    }

    /// Same unit, pixel width multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            pixel_width: self.pixel_width * factor,
            unit: self.unit.clone(),
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(1.0, "pixel")
    }
}

/// Errors building a [`Raster`] or [`RasterBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    EmptyRaster {
        width: u32,
        height: u32,
    },
    PlaneCountMismatch {
        expected: usize,
        actual: usize,
    },
    PlaneLengthMismatch {
        plane: usize,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRaster { width, height } => {
                write!(f, "raster must be non-empty, got {width}x{height}")
            }
            Self::PlaneCountMismatch { expected, actual } => {
                write!(f, "expected {expected} planes, got {actual}")
            }
            Self::PlaneLengthMismatch {
                plane,
                expected,
                actual,
            } => write!(
                f,
                "plane {plane} has {actual} samples, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for RasterError {}

/// Borrowed view of one plane.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [f32],
}

impl PlaneView<'_> {
    /// Sample at integral coordinates clamped to the plane edge.
    #[inline]
    pub fn clamped(&self, x: i64, y: i64) -> f32 {
        let xi = x.clamp(0, i64::from(self.width) - 1) as usize;
        let yi = y.clamp(0, i64::from(self.height) - 1) as usize;
        self.data[yi * self.width as usize + xi]
    }
}

/// Multi-plane source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    dims: StackDims,
    planes: Vec<Vec<f32>>,
    calibration: Calibration,
}

impl Raster {
    /// Build and validate a raster from planes in [`StackDims::offset`] order.
    pub fn new(
        width: u32,
        height: u32,
        dims: StackDims,
        planes: Vec<Vec<f32>>,
        calibration: Calibration,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || dims.plane_count() == 0 {
            return Err(RasterError::EmptyRaster { width, height });
        }
        if planes.len() != dims.plane_count() {
            return Err(RasterError::PlaneCountMismatch {
                expected: dims.plane_count(),
                actual: planes.len(),
            });
        }
        let expected = width as usize * height as usize;
        if let Some((plane, data)) = planes
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != expected)
        {
            return Err(RasterError::PlaneLengthMismatch {
                plane,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            dims,
            planes,
            calibration,
        })
    }

    /// Single-plane, uncalibrated raster.
    pub fn single_plane(width: u32, height: u32, data: Vec<f32>) -> Result<Self, RasterError> {
        Self::new(
            width,
            height,
            StackDims::SINGLE,
            vec![data],
            Calibration::default(),
        )
    }

    /// Build every plane from `f(plane, x, y)`.
    pub fn from_fn<F>(
        width: u32,
        height: u32,
        dims: StackDims,
        calibration: Calibration,
        f: F,
    ) -> Result<Self, RasterError>
    where
        F: Fn(PlaneIndex, u32, u32) -> f32,
    {
        let mut planes = Vec::with_capacity(dims.plane_count());
        for frame in 0..dims.frames {
            for slice in 0..dims.slices {
                for channel in 0..dims.channels {
                    let index = PlaneIndex::new(channel, slice, frame);
                    let mut data = Vec::with_capacity(width as usize * height as usize);
                    for y in 0..height {
                        for x in 0..width {
                            data.push(f(index, x, y));
                        }
                    }
                    planes.push(data);
                }
            }
        }
        Self::new(width, height, dims, planes, calibration)
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn dims(&self) -> StackDims {
        self.dims
    }

    #[must_use]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
    }

    /// Borrow one plane, or `None` if the index is outside the stack.
    #[must_use]
    pub fn plane(&self, index: PlaneIndex) -> Option<PlaneView<'_>> {
        let offset = self.dims.offset(index)?;
        Some(PlaneView {
            width: self.width,
            height: self.height,
            data: &self.planes[offset],
        })
    }

    /// Sample value at integral coordinates.
    #[must_use]
    pub fn get(&self, index: PlaneIndex, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let plane = self.plane(index)?;
        Some(plane.data[y as usize * self.width as usize + x as usize])
    }
}

/// One destination plane tagged with the source plane it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferPlane {
    pub index: PlaneIndex,
    pub data: Vec<f32>,
}

/// Pixel buffer of one panel, sized to the panel region at fill time.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    planes: Vec<BufferPlane>,
}

impl RasterBuffer {
    /// Build and validate a buffer.
    pub fn new(width: u32, height: u32, planes: Vec<BufferPlane>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || planes.is_empty() {
            return Err(RasterError::EmptyRaster { width, height });
        }
        let expected = width as usize * height as usize;
        if let Some((plane, p)) = planes
            .iter()
            .enumerate()
            .find(|(_, p)| p.data.len() != expected)
        {
            return Err(RasterError::PlaneLengthMismatch {
                plane,
                expected,
                actual: p.data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn planes(&self) -> &[BufferPlane] {
        &self.planes
    }

    /// Data of the plane that was sampled from `index`.
    #[must_use]
    pub fn plane(&self, index: PlaneIndex) -> Option<&[f32]> {
        self.planes
            .iter()
            .find(|p| p.index == index)
            .map(|p| p.data.as_slice())
    }

    /// Value at `(x, y)` in the `slot`-th stored plane.
    #[must_use]
    pub fn get(&self, slot: usize, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let plane = self.planes.get(slot)?;
        Some(plane.data[y as usize * self.width as usize + x as usize])
    }

    /// Check the buffer dimensions against a region size.
    #[must_use]
    pub const fn matches_size(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_offsets_are_channel_fastest() {
        let dims = StackDims::new(3, 2, 2);
        assert_eq!(dims.plane_count(), 12);
        assert_eq!(dims.offset(PlaneIndex::new(0, 0, 0)), Some(0));
        assert_eq!(dims.offset(PlaneIndex::new(2, 0, 0)), Some(2));
        assert_eq!(dims.offset(PlaneIndex::new(0, 1, 0)), Some(3));
        assert_eq!(dims.offset(PlaneIndex::new(1, 1, 1)), Some(10));
        assert_eq!(dims.offset(PlaneIndex::new(3, 0, 0)), None);
    }

    #[test]
    fn raster_rejects_wrong_plane_length() {
        let err = Raster::single_plane(2, 2, vec![0.0; 3]).expect_err("length mismatch");
        assert_eq!(
            err,
            RasterError::PlaneLengthMismatch {
                plane: 0,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn raster_from_fn_fills_every_plane() {
        let raster = Raster::from_fn(
            3,
            2,
            StackDims::new(2, 1, 1),
            Calibration::new(0.5, "µm"),
            |plane, x, y| (plane.channel * 100 + y * 10 + x) as f32,
        )
        .expect("valid raster");
        assert_eq!(raster.get(PlaneIndex::new(1, 0, 0), 2, 1), Some(112.0));
        assert_eq!(raster.get(PlaneIndex::new(0, 0, 0), 3, 0), None);
        assert_eq!(raster.calibration().unit, "µm");
    }

    #[test]
    fn clamped_reads_stay_on_edge() {
        let raster = Raster::single_plane(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("valid");
        let plane = raster.plane(PlaneIndex::ORIGIN).expect("plane");
        assert_eq!(plane.clamped(-5, -5), 1.0);
        assert_eq!(plane.clamped(9, 0), 2.0);
        assert_eq!(plane.clamped(0, 9), 3.0);
        assert_eq!(plane.clamped(9, 9), 4.0);
    }

    #[test]
    fn buffer_lookup_by_plane_index() {
        let buffer = RasterBuffer::new(
            1,
            1,
            vec![
                BufferPlane {
                    index: PlaneIndex::new(1, 0, 0),
                    data: vec![7.0],
                },
                BufferPlane {
                    index: PlaneIndex::new(2, 0, 0),
                    data: vec![9.0],
                },
            ],
        )
        .expect("valid buffer");
        assert_eq!(buffer.plane(PlaneIndex::new(2, 0, 0)), Some(&[9.0][..]));
        assert_eq!(buffer.get(0, 0, 0), Some(7.0));
        assert!(buffer.matches_size(1, 1));
        assert!(!buffer.matches_size(2, 1));
    }

    #[test]
    fn calibration_scales_width_only() {
        let cal = Calibration::new(0.2, "mm").scaled(2.5);
        assert!((cal.pixel_width - 0.5).abs() < 1e-12);
        assert_eq!(cal.unit, "mm");
    }
}
