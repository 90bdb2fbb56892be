//! Result and error types for Artsim.

use thiserror::Error;

/// Result type for Artsim operations
pub type ArtsimResult<T> = Result<T, ArtsimError>;

/// Errors that can occur in Artsim
#[derive(Debug, Error)]
pub enum ArtsimError {
    /// Image bytes could not be obtained
    #[error("Failed to read image {source_label}: {message}")]
    Read {
        /// Path or label of the image source
        source_label: String,
        /// Error message
        message: String,
    },

    /// Bytes were read but are not a decodable raster image
    #[error("Failed to decode image {source_label}: {message}")]
    Decode {
        /// Path or label of the image source
        source_label: String,
        /// Error message
        message: String,
    },

    /// Descriptors with different cell counts were compared
    #[error("Descriptor mismatch: {left} cells vs {right} cells")]
    DescriptorMismatch {
        /// Cell count of the left-hand descriptor
        left: usize,
        /// Cell count of the right-hand descriptor
        right: usize,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Invalid argument passed to an engine operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// A worker task could not be joined
    #[error("Extraction worker failed: {message}")]
    Worker {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ArtsimError {
    /// Create a read error for a source
    #[must_use]
    pub fn read(source_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            source_label: source_label.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a source
    #[must_use]
    pub fn decode(source_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            source_label: source_label.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether the image bytes could not be obtained
    #[must_use]
    pub const fn is_read_error(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Whether the image bytes were not a decodable raster
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Whether this error describes an unusable image (read or decode)
    #[must_use]
    pub const fn is_image_failure(&self) -> bool {
        self.is_read_error() || self.is_decode_error()
    }
}
