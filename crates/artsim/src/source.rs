//! Image sources consumed by the extractor.
//!
//! Loading is split in two steps so read failures and decode failures stay
//! distinguishable: [`ImageSource::load`] obtains bytes (or a raster that is
//! already decoded), and [`LoadedImage::decode`] turns them into RGB8 pixels.

use crate::result::{ArtsimError, ArtsimResult};
use image::RgbImage;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where an image comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Encoded image file on disk
    Path(PathBuf),
    /// Encoded image held in memory
    Bytes {
        /// Label used in logs and errors
        label: String,
        /// Encoded bytes (PNG, JPEG)
        data: Arc<[u8]>,
    },
    /// Decoded RGB8 raster
    Raster {
        /// Label used in logs and errors
        label: String,
        /// Pixel data
        image: Arc<RgbImage>,
    },
}

impl ImageSource {
    /// Source backed by a file path
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Source backed by encoded bytes
    #[must_use]
    pub fn bytes(label: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes {
            label: label.into(),
            data: data.into(),
        }
    }

    /// Source backed by a decoded raster
    #[must_use]
    pub fn raster(label: impl Into<String>, image: RgbImage) -> Self {
        Self::Raster {
            label: label.into(),
            image: Arc::new(image),
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { label, .. } | Self::Raster { label, .. } => label.clone(),
        }
    }

    /// Obtain the image bytes or raster
    ///
    /// # Errors
    ///
    /// Returns [`ArtsimError::Read`] if the file cannot be read
    pub fn load(&self) -> ArtsimResult<LoadedImage> {
        match self {
            Self::Path(path) => read_file(path),
            Self::Bytes { label, data } => Ok(LoadedImage::Encoded {
                label: label.clone(),
                data: Arc::clone(data),
            }),
            Self::Raster { label, image } => Ok(LoadedImage::Decoded {
                label: label.clone(),
                image: Arc::clone(image),
            }),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn read_file(path: &Path) -> ArtsimResult<LoadedImage> {
    let data = std::fs::read(path)
        .map_err(|e| ArtsimError::read(path.display().to_string(), e.to_string()))?;
    Ok(LoadedImage::Encoded {
        label: path.display().to_string(),
        data: data.into(),
    })
}

/// Image content obtained from a source, not yet decoded
#[derive(Debug, Clone)]
pub enum LoadedImage {
    /// Encoded bytes
    Encoded {
        /// Source label
        label: String,
        /// Encoded bytes
        data: Arc<[u8]>,
    },
    /// Decoded raster
    Decoded {
        /// Source label
        label: String,
        /// Pixel data
        image: Arc<RgbImage>,
    },
}

impl LoadedImage {
    /// Source label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Encoded { label, .. } | Self::Decoded { label, .. } => label,
        }
    }

    /// SHA-256 of the content, used as a cache key.
    ///
    /// Rasters hash their dimensions followed by the raw pixels.
    #[must_use]
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        match self {
            Self::Encoded { data, .. } => {
                hasher.update(b"encoded");
                hasher.update(data);
            }
            Self::Decoded { image, .. } => {
                hasher.update(b"raster");
                hasher.update(image.width().to_le_bytes());
                hasher.update(image.height().to_le_bytes());
                hasher.update(image.as_raw());
            }
        }
        hasher.finalize().into()
    }

    /// Decode to RGB8 pixels
    ///
    /// # Errors
    ///
    /// Returns [`ArtsimError::Decode`] if the bytes are not a supported image
    pub fn decode(&self) -> ArtsimResult<Arc<RgbImage>> {
        match self {
            Self::Encoded { label, data } => {
                let img = image::load_from_memory(data)
                    .map_err(|e| ArtsimError::decode(label.clone(), e.to_string()))?;
                if img.width() == 0 || img.height() == 0 {
                    return Err(ArtsimError::decode(label.clone(), "image has no pixels"));
                }
                Ok(Arc::new(img.to_rgb8()))
            }
            Self::Decoded { label, image } => {
                if image.width() == 0 || image.height() == 0 {
                    return Err(ArtsimError::decode(label.clone(), "image has no pixels"));
                }
                Ok(Arc::clone(image))
            }
        }
    }
}
