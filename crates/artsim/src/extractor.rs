//! Descriptor extraction.
//!
//! The image is stretched to `canonical_size × canonical_size`, split into a
//! `grid_size × grid_size` grid of `canonical_size / grid_size` pixel cells,
//! and each cell is reduced to its dominant quantized colors. When the
//! division is inexact the trailing rows and columns past the last full cell
//! are ignored.

use crate::cache::{CacheKey, DescriptorCache};
use crate::color::QuantizedColor;
use crate::config::ExtractorConfig;
use crate::descriptor::{CellHistogram, Descriptor};
use crate::result::ArtsimResult;
use crate::source::ImageSource;
use image::{imageops, RgbImage};
use std::sync::Arc;

/// Turns images into descriptors
#[derive(Debug, Clone)]
pub struct DescriptorExtractor {
    config: ExtractorConfig,
    cache: Option<Arc<DescriptorCache>>,
}

impl Default for DescriptorExtractor {
    fn default() -> Self {
        Self {
            config: ExtractorConfig::default(),
            cache: None,
        }
    }
}

impl DescriptorExtractor {
    /// Create an extractor
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArtsimError::InvalidConfig`] for a zero grid or canonical size,
    /// a grid larger than the canonical size, or a zero color cap
    pub fn new(config: ExtractorConfig) -> ArtsimResult<Self> {
        Ok(Self {
            config: config.validated()?,
            cache: None,
        })
    }

    /// Share a descriptor cache
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DescriptorCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Attached cache, if any
    #[must_use]
    pub fn cache(&self) -> Option<&Arc<DescriptorCache>> {
        self.cache.as_ref()
    }

    /// Extract the descriptor of an image source
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArtsimError::Read`] if the source cannot be read and
    /// [`crate::ArtsimError::Decode`] if it is not a decodable image
    pub fn extract(&self, source: &ImageSource) -> ArtsimResult<Arc<Descriptor>> {
        let loaded = source.load()?;

        let key = self
            .cache
            .as_ref()
            .map(|_| CacheKey::new(loaded.content_hash(), &self.config));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                tracing::debug!(source = %loaded.label(), "descriptor cache hit");
                return Ok(hit);
            }
        }

        let image = loaded.decode()?;
        let descriptor = Arc::new(self.extract_image(&image));
        tracing::debug!(
            source = %loaded.label(),
            width = image.width(),
            height = image.height(),
            grid_size = self.config.grid_size,
            cells = descriptor.cell_count(),
            "extracted descriptor"
        );

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, Arc::clone(&descriptor));
        }
        Ok(descriptor)
    }

    /// Extract the descriptor of decoded pixels
    #[must_use]
    pub fn extract_image(&self, image: &RgbImage) -> Descriptor {
        let canonical = self.canonicalize(image);
        let grid = self.config.grid_size;
        let cell = self.config.cell_size();
        let (width, height) = canonical.dimensions();

        let mut cells = Vec::with_capacity((grid * grid) as usize);
        for gy in 0..grid {
            let y_end = ((gy + 1) * cell).min(height);
            for gx in 0..grid {
                let x_end = ((gx + 1) * cell).min(width);
                let mut histogram = CellHistogram::new();
                for y in gy * cell..y_end {
                    for x in gx * cell..x_end {
                        let [r, g, b] = canonical.get_pixel(x, y).0;
                        histogram.add(QuantizedColor::from_rgb(r, g, b));
                    }
                }
                cells.push(histogram.summarize(self.config.max_colors_per_cell));
            }
        }

        Descriptor::from_grid(grid, cells)
    }

    fn canonicalize<'a>(&self, image: &'a RgbImage) -> std::borrow::Cow<'a, RgbImage> {
        let size = self.config.canonical_size;
        if image.dimensions() == (size, size) {
            std::borrow::Cow::Borrowed(image)
        } else {
            std::borrow::Cow::Owned(imageops::resize(
                image,
                size,
                size,
                self.config.filter.filter_type(),
            ))
        }
    }
}

/// Extract a descriptor from an image file with default settings and the
/// given grid size
///
/// # Errors
///
/// Returns a read, decode, or configuration error
pub fn compute_descriptor(
    path: impl AsRef<std::path::Path>,
    grid_size: u32,
) -> ArtsimResult<Descriptor> {
    let extractor = DescriptorExtractor::new(ExtractorConfig::new().with_grid_size(grid_size))?;
    let descriptor = extractor.extract(&ImageSource::from(path.as_ref()))?;
    Ok(Arc::try_unwrap(descriptor).unwrap_or_else(|shared| (*shared).clone()))
}

/// [`compute_descriptor`] at the default 8×8 grid
///
/// # Errors
///
/// Returns a read or decode error
pub fn compute_descriptor_default(path: impl AsRef<std::path::Path>) -> ArtsimResult<Descriptor> {
    compute_descriptor(path, crate::config::DEFAULT_GRID_SIZE)
}
