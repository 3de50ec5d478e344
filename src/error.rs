//! Error types for body-part extraction operations

use crate::types::PixelCoordinate;
use thiserror::Error;

/// Result type alias for body-part extraction operations
pub type Result<T> = std::result::Result<T, PartCropError>;

/// Error types for body-part extraction operations
///
/// The first five variants are the extraction pipeline's own failure kinds.
/// Each one terminates a single extraction request; nothing is retried.
#[derive(Error, Debug)]
pub enum PartCropError {
    /// Mask buffer length does not match `width * height * 4`
    #[error("Invalid mask format: expected {expected} bytes for {width}x{height} RGBA mask, got {actual}")]
    InvalidMaskFormat {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Row width of zero passed to coordinate mapping
    #[error("Invalid width: row width must be greater than zero")]
    InvalidWidth,

    /// A coordinate lies outside the source image
    #[error("Coordinate ({}, {}) is out of bounds for {width}x{height} source image", .coordinate.x, .coordinate.y)]
    CoordinateOutOfBounds {
        coordinate: PixelCoordinate,
        width: u32,
        height: u32,
    },

    /// Bounding box requested over zero pixels
    #[error("Empty selection: label {label:?} matched no pixels")]
    EmptySelection { label: Option<u32> },

    /// Internal invariant violation while compositing a crop
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Segmentation collaborator errors
    #[error("Segmentation error: {0}")]
    Segmentation(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PartCropError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new segmentation error
    pub fn segmentation<S: Into<String>>(msg: S) -> Self {
        Self::Segmentation(msg.into())
    }

    /// Create a new dimension mismatch error
    pub fn dimension_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create an empty selection error for the given label
    #[must_use]
    pub fn empty_selection(label: Option<u32>) -> Self {
        Self::EmptySelection { label }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Whether this error is one of the extraction pipeline's own kinds
    #[must_use]
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMaskFormat { .. }
                | Self::InvalidWidth
                | Self::CoordinateOutOfBounds { .. }
                | Self::EmptySelection { .. }
                | Self::DimensionMismatch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = PartCropError::invalid_config("test config error");
        assert!(matches!(err, PartCropError::InvalidConfig(_)));

        let err = PartCropError::empty_selection(Some(3));
        assert!(matches!(err, PartCropError::EmptySelection { label: Some(3) }));
        assert!(err.is_extraction_error());
        assert!(!PartCropError::segmentation("boom").is_extraction_error());
    }

    #[test]
    fn test_error_display() {
        let err = PartCropError::InvalidMaskFormat {
            width: 2,
            height: 2,
            expected: 16,
            actual: 15,
        };
        assert_eq!(
            err.to_string(),
            "Invalid mask format: expected 16 bytes for 2x2 RGBA mask, got 15"
        );

        let err = PartCropError::CoordinateOutOfBounds {
            coordinate: PixelCoordinate::new(4, 1),
            width: 4,
            height: 4,
        };
        assert_eq!(
            err.to_string(),
            "Coordinate (4, 1) is out of bounds for 4x4 source image"
        );
    }

    #[test]
    fn test_contextual_errors() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = PartCropError::file_io_error("read mask", Path::new("/tmp/mask.png"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("read mask"));
        assert!(error_string.contains("/tmp/mask.png"));

        let err = PartCropError::config_value_error("opacity", 1.5, "0.0-1.0", Some(0.7));
        let error_string = err.to_string();
        assert!(error_string.contains("opacity"));
        assert!(error_string.contains("1.5"));
        assert!(error_string.contains("Recommended: 0.7"));
    }
}
