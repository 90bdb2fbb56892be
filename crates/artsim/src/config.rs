//! Engine configuration.
//!
//! Loadable from YAML or JSON; every section defaults independently so a
//! config file only needs the keys it changes.

use crate::result::{ArtsimError, ArtsimResult};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default cells per grid side
pub const DEFAULT_GRID_SIZE: u32 = 8;

/// Default canonical resample size in pixels
pub const DEFAULT_CANONICAL_SIZE: u32 = 256;

/// Largest accepted canonical resample size in pixels
pub const MAX_CANONICAL_SIZE: u32 = 4096;

/// Default number of ranked results
pub const DEFAULT_TOP_N: usize = 5;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Descriptor extraction settings
    pub extractor: ExtractorConfig,
    /// Ranking settings
    pub ranking: RankingConfig,
    /// Descriptor cache settings
    pub cache: CacheConfig,
}

/// Resampling filter used to reach the canonical size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Nearest neighbor
    Nearest,
    /// Bilinear
    Triangle,
    /// Bicubic
    CatmullRom,
    /// Gaussian
    Gaussian,
    /// Lanczos with window 3
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    /// Matching `image` filter
    #[must_use]
    pub const fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Descriptor extraction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Cells per grid side
    pub grid_size: u32,
    /// Side of the square the image is stretched to before partitioning
    pub canonical_size: u32,
    /// Colors kept per cell
    pub max_colors_per_cell: usize,
    /// Resampling filter
    pub filter: ResampleFilter,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            canonical_size: DEFAULT_CANONICAL_SIZE,
            max_colors_per_cell: crate::descriptor::DEFAULT_MAX_COLORS,
            filter: ResampleFilter::default(),
        }
    }
}

impl ExtractorConfig {
    /// Create a new default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid size
    #[must_use]
    pub const fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the canonical size
    #[must_use]
    pub const fn with_canonical_size(mut self, canonical_size: u32) -> Self {
        self.canonical_size = canonical_size;
        self
    }

    /// Set colors kept per cell
    #[must_use]
    pub const fn with_max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors_per_cell = max_colors;
        self
    }

    /// Set the resampling filter
    #[must_use]
    pub const fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Pixels per cell side (floor division)
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        if self.grid_size == 0 {
            0
        } else {
            self.canonical_size / self.grid_size
        }
    }

    fn collect_errors(&self, errors: &mut Vec<ConfigValidationError>) {
        if self.grid_size == 0 {
            errors.push(ConfigValidationError::new(
                "extractor.grid_size",
                "Must be at least 1",
            ));
        }
        if self.canonical_size == 0 {
            errors.push(ConfigValidationError::new(
                "extractor.canonical_size",
                "Must be at least 1",
            ));
        }
        if self.canonical_size > MAX_CANONICAL_SIZE {
            errors.push(ConfigValidationError::new(
                "extractor.canonical_size",
                format!("Must not exceed {MAX_CANONICAL_SIZE}"),
            ));
        }
        if self.grid_size > self.canonical_size {
            errors.push(ConfigValidationError::new(
                "extractor.grid_size",
                format!(
                    "Must not exceed canonical_size ({})",
                    self.canonical_size
                ),
            ));
        }
        if self.max_colors_per_cell == 0 {
            errors.push(ConfigValidationError::new(
                "extractor.max_colors_per_cell",
                "Must be at least 1",
            ));
        }
    }

    /// Validate, converting failures into an error
    ///
    /// # Errors
    ///
    /// Returns [`ArtsimError::InvalidConfig`] listing every failed field
    pub fn validated(self) -> ArtsimResult<Self> {
        let mut errors = Vec::new();
        self.collect_errors(&mut errors);
        into_result(self, errors)
    }
}

/// Ranking settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of ranked results returned
    pub top_n: usize,
    /// Maximum concurrent candidate extractions (0 = available cores)
    pub concurrency: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            concurrency: 0, // Auto-detect
        }
    }
}

impl RankingConfig {
    /// Set the number of results
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the concurrency limit
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Concurrency limit with auto-detection resolved
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency == 0 {
            available_cores()
        } else {
            self.concurrency
        }
    }
}

/// Number of available cores, at least 1
#[must_use]
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

/// Descriptor cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache descriptors across queries
    pub enabled: bool,
    /// Maximum cached descriptors
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Create a new default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extractor section
    #[must_use]
    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the ranking section
    #[must_use]
    pub fn with_ranking(mut self, ranking: RankingConfig) -> Self {
        self.ranking = ranking;
        self
    }

    /// Enable the cache with a capacity
    #[must_use]
    pub const fn with_cache(mut self, capacity: usize) -> Self {
        self.cache.enabled = true;
        self.cache.capacity = capacity;
        self
    }

    /// Load configuration from JSON string
    ///
    /// # Errors
    /// Returns error if JSON parsing fails
    pub fn from_json(json: &str) -> ArtsimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from YAML string
    ///
    /// # Errors
    /// Returns error if YAML parsing fails
    pub fn from_yaml(yaml: &str) -> ArtsimResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load configuration from a file; `.json` is parsed as JSON, anything
    /// else as YAML
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> ArtsimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Serialize to JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> ArtsimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ArtsimResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Validate configuration values
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        self.extractor.collect_errors(&mut errors);

        if self.ranking.top_n == 0 {
            errors.push(ConfigValidationError::new(
                "ranking.top_n",
                "Must be at least 1",
            ));
        }

        if self.cache.enabled && self.cache.capacity == 0 {
            errors.push(ConfigValidationError::new(
                "cache.capacity",
                "Must be at least 1 when the cache is enabled",
            ));
        }

        errors
    }

    /// Check if configuration is valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validate, converting failures into an error
    ///
    /// # Errors
    ///
    /// Returns [`ArtsimError::InvalidConfig`] listing every failed field
    pub fn into_validated(self) -> ArtsimResult<Self> {
        let errors = self.validate();
        into_result(self, errors)
    }
}

fn into_result<T>(value: T, errors: Vec<ConfigValidationError>) -> ArtsimResult<T> {
    if errors.is_empty() {
        return Ok(value);
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(ArtsimError::invalid_config(message))
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
