#![forbid(unsafe_code)]

//! Resolving a leaf's [`SourceRef`] to source pixels.
//!
//! The figure never opens images itself; it asks a [`SourceProvider`].
//! [`MemorySourceProvider`] serves rasters registered by the host under
//! external identifiers. [`FileSourceProvider`] decodes image files into
//! planar `f32` rasters: grayscale images become one channel, color images
//! three (alpha is dropped). Sample values keep their stored range (0-255
//! for 8-bit, 0-65535 for 16-bit).

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use image::{ColorType, DynamicImage, ImageReader};
use panelfig_core::{Calibration, Raster, RasterError, StackDims};
use panelfig_layout::SourceRef;

/// Supplies source rasters for data-source references.
pub trait SourceProvider: Send + Sync {
    /// Resolve `source` to a raster.
    fn resolve(&self, source: &SourceRef) -> Result<Arc<Raster>, SourceError>;
}

impl<P: SourceProvider + ?Sized> SourceProvider for Arc<P> {
    fn resolve(&self, source: &SourceRef) -> Result<Arc<Raster>, SourceError> {
        (**self).resolve(source)
    }
}

/// Why a source could not be opened.
#[derive(Debug)]
pub enum SourceError {
    /// The leaf has no source recorded.
    Unset,
    /// The provider does not know this reference.
    NotFound { source: SourceRef },
    /// Reading the file failed.
    Io { path: PathBuf, error: std::io::Error },
    /// The file is not a decodable image.
    Decode {
        path: PathBuf,
        error: image::ImageError,
    },
    /// The decoded image did not form a valid raster.
    Raster { path: PathBuf, error: RasterError },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "source unavailable: no source recorded"),
            Self::NotFound { source } => write!(f, "source unavailable: {source} not found"),
            Self::Io { path, error } => {
                write!(f, "source unavailable: {}: {error}", path.display())
            }
            Self::Decode { path, error } => {
                write!(f, "source unavailable: cannot decode {}: {error}", path.display())
            }
            Self::Raster { path, error } => {
                write!(f, "source unavailable: {}: {error}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            Self::Decode { error, .. } => Some(error),
            Self::Raster { error, .. } => Some(error),
            Self::Unset | Self::NotFound { .. } => None,
        }
    }
}

/// Rasters registered in memory under external identifiers.
#[derive(Debug, Default)]
pub struct MemorySourceProvider {
    rasters: RwLock<HashMap<String, Arc<Raster>>>,
}

impl MemorySourceProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `raster` under `id`, replacing any previous one.
    pub fn insert(&self, id: impl Into<String>, raster: Raster) -> Arc<Raster> {
        let raster = Arc::new(raster);
        let _ = self
            .rasters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), Arc::clone(&raster));
        raster
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Raster>> {
        self.rasters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.rasters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

impl SourceProvider for MemorySourceProvider {
    fn resolve(&self, source: &SourceRef) -> Result<Arc<Raster>, SourceError> {
        match source {
            SourceRef::Unset => Err(SourceError::Unset),
            SourceRef::External { id } => self
                .rasters
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(id)
                .cloned()
                .ok_or_else(|| SourceError::NotFound {
                    source: source.clone(),
                }),
            SourceRef::File { .. } => Err(SourceError::NotFound {
                source: source.clone(),
            }),
        }
    }
}

/// Decodes PNG, JPEG, GIF, and TIFF files, caching each decoded raster.
#[derive(Debug, Default)]
pub struct FileSourceProvider {
    root: Option<PathBuf>,
    cache: RwLock<HashMap<PathBuf, Arc<Raster>>>,
}

impl FileSourceProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Forget the decoded raster for `path`, e.g. after the file changed.
    pub fn invalidate(&self, path: &Path) {
        let resolved = self.resolve_path(path);
        let _ = self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&resolved);
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load(&self, path: &Path) -> Result<Arc<Raster>, SourceError> {
        let path = self.resolve_path(path);
        if let Some(raster) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path)
        {
            return Ok(Arc::clone(raster));
        }
        let raster = Arc::new(decode_file(&path)?);
        let _ = self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, Arc::clone(&raster));
        Ok(raster)
    }
}

impl SourceProvider for FileSourceProvider {
    fn resolve(&self, source: &SourceRef) -> Result<Arc<Raster>, SourceError> {
        match source {
            SourceRef::Unset => Err(SourceError::Unset),
            SourceRef::File { path } => self.load(path),
            SourceRef::External { .. } => Err(SourceError::NotFound {
                source: source.clone(),
            }),
        }
    }
}

/// Decode an image file into an uncalibrated planar raster.
pub fn decode_file(path: &Path) -> Result<Raster, SourceError> {
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|error| SourceError::Io {
            path: path.to_path_buf(),
            error,
        })?
        .decode()
        .map_err(|error| match error {
            image::ImageError::IoError(error) => SourceError::Io {
                path: path.to_path_buf(),
                error,
            },
            error => SourceError::Decode {
                path: path.to_path_buf(),
                error,
            },
        })?;
    let raster = raster_from_image(image).map_err(|error| SourceError::Raster {
        path: path.to_path_buf(),
        error,
    })?;
    tracing::debug!(
        target: "panelfig.source",
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        channels = raster.dims().channels,
        "decoded source image"
    );
    Ok(raster)
}

/// Split a decoded image into planes: one for grayscale, three for color.
pub fn raster_from_image(image: DynamicImage) -> Result<Raster, RasterError> {
    let (width, height) = (image.width(), image.height());
    let pixels = width as usize * height as usize;
    let planes = match image.color() {
        ColorType::L8 | ColorType::La8 => planar(image.into_luma8().as_raw(), 1, pixels),
        ColorType::L16 | ColorType::La16 => planar(image.into_luma16().as_raw(), 1, pixels),
        ColorType::Rgb16 | ColorType::Rgba16 => planar(image.into_rgb16().as_raw(), 3, pixels),
        ColorType::Rgb32F | ColorType::Rgba32F => {
            planar(image.into_rgb32f().as_raw(), 3, pixels)
        }
        _ => planar(image.into_rgb8().as_raw(), 3, pixels),
    };
    let dims = StackDims::new(planes.len() as u32, 1, 1);
    Raster::new(width, height, dims, planes, Calibration::default())
}

fn planar<S: Copy + Into<f32>>(raw: &[S], channels: usize, pixels: usize) -> Vec<Vec<f32>> {
    let mut planes = vec![Vec::with_capacity(pixels); channels];
    for pixel in raw.chunks_exact(channels) {
        for (plane, value) in planes.iter_mut().zip(pixel) {
            plane.push((*value).into());
        }
    }
    planes
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use panelfig_core::PlaneIndex;

    #[test]
    fn memory_provider_resolves_external_ids_only() {
        let provider = MemorySourceProvider::new();
        provider.insert("a", Raster::single_plane(2, 1, vec![1.0, 2.0]).expect("raster"));
        assert!(provider.contains("a"));
        let raster = provider
            .resolve(&SourceRef::external("a"))
            .expect("registered");
        assert_eq!(raster.get(PlaneIndex::ORIGIN, 1, 0), Some(2.0));
        assert!(matches!(
            provider.resolve(&SourceRef::external("b")),
            Err(SourceError::NotFound { .. })
        ));
        assert!(matches!(
            provider.resolve(&SourceRef::Unset),
            Err(SourceError::Unset)
        ));
        assert!(provider.remove("a").is_some());
        assert!(!provider.contains("a"));
    }

    #[test]
    fn grayscale_png_decodes_to_one_plane() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gray.png");
        GrayImage::from_fn(4, 3, |x, y| Luma([(x + 10 * y) as u8]))
            .save(&path)
            .expect("write png");

        let provider = FileSourceProvider::new().with_root(dir.path());
        let raster = provider
            .resolve(&SourceRef::file("gray.png"))
            .expect("decodes");
        assert_eq!((raster.width(), raster.height()), (4, 3));
        assert_eq!(raster.dims(), StackDims::SINGLE);
        assert_eq!(raster.get(PlaneIndex::ORIGIN, 3, 2), Some(23.0));

        let again = provider
            .resolve(&SourceRef::file(&path))
            .expect("cached");
        assert!(Arc::ptr_eq(&raster, &again));
    }

    #[test]
    fn color_png_decodes_to_three_planes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rgb.png");
        RgbImage::from_fn(2, 2, |x, y| Rgb([x as u8, y as u8, 200]))
            .save(&path)
            .expect("write png");
        let raster = decode_file(&path).expect("decodes");
        assert_eq!(raster.dims().channels, 3);
        assert_eq!(raster.get(PlaneIndex::new(0, 0, 0), 1, 0), Some(1.0));
        assert_eq!(raster.get(PlaneIndex::new(1, 0, 0), 1, 1), Some(1.0));
        assert_eq!(raster.get(PlaneIndex::new(2, 0, 0), 0, 0), Some(200.0));
    }

    #[test]
    fn missing_and_garbage_files_are_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            decode_file(&dir.path().join("missing.png")),
            Err(SourceError::Io { .. })
        ));
        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not an image").expect("write");
        assert!(decode_file(&junk).is_err());
    }
}
