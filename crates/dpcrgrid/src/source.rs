//! Panel image sources.
//!
//! Panels are addressed by a 1-based image number: panel `i` (zero-based)
//! is image `i + 1`.

use std::path::{Path, PathBuf};

use image::GrayImage;

use crate::error::SourceError;

/// Supplies decoded grayscale panel images.
pub trait ImageSource {
    /// Load image `image_number` (1-based) as 8-bit grayscale.
    fn load_panel(&self, image_number: usize) -> Result<GrayImage, SourceError>;
}

/// Numbered image files in one directory: `<dir>/<n>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Path of image `image_number`.
    pub fn path_for(&self, image_number: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}", image_number, self.extension))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageSource for DirectorySource {
    fn load_panel(&self, image_number: usize) -> Result<GrayImage, SourceError> {
        let path = self.path_for(image_number);
        if !path.exists() {
            return Err(SourceError::Missing(image_number));
        }
        let img = image::open(&path).map_err(|e| SourceError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(img.to_luma8())
    }
}

/// In-memory panels; image `n` is `images[n - 1]`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    images: Vec<GrayImage>,
}

impl MemorySource {
    pub fn new(images: Vec<GrayImage>) -> Self {
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for MemorySource {
    fn load_panel(&self, image_number: usize) -> Result<GrayImage, SourceError> {
        image_number
            .checked_sub(1)
            .and_then(|i| self.images.get(i))
            .cloned()
            .ok_or(SourceError::Missing(image_number))
    }
}
