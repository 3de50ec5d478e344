//! Segmentation backend abstraction
//!
//! Model inference is an external collaborator. A backend takes a decoded
//! image and returns one label mask per detected person, at the image's
//! resolution, with the part label stored in each pixel's red channel.

use crate::{
    error::{PartCropError, Result},
    types::MaskImageData,
};
use async_trait::async_trait;
use image::DynamicImage;
use instant::Duration;
use serde::{Deserialize, Serialize};

/// Backbone architecture of the segmentation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Architecture {
    #[default]
    ResNet50,
    MobileNetV1,
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResNet50 => write!(f, "ResNet50"),
            Self::MobileNetV1 => write!(f, "MobileNetV1"),
        }
    }
}

/// Model construction parameters; opaque to the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub architecture: Architecture,
    pub output_stride: u32,
    pub multiplier: f32,
    pub quant_bytes: u8,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            architecture: Architecture::ResNet50,
            output_stride: 16,
            multiplier: 1.0,
            quant_bytes: 4,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<()> {
        let strides: &[u32] = match self.architecture {
            Architecture::ResNet50 => &[16, 32],
            Architecture::MobileNetV1 => &[8, 16],
        };
        if !strides.contains(&self.output_stride) {
            return Err(PartCropError::invalid_config(format!(
                "Output stride {} is not supported by {} (expected one of {:?})",
                self.output_stride, self.architecture, strides
            )));
        }

        let multipliers: &[f32] = match self.architecture {
            Architecture::ResNet50 => &[1.0],
            Architecture::MobileNetV1 => &[0.5, 0.75, 1.0],
        };
        if !multipliers.iter().any(|m| (m - self.multiplier).abs() < f32::EPSILON) {
            return Err(PartCropError::invalid_config(format!(
                "Multiplier {} is not supported by {} (expected one of {:?})",
                self.multiplier, self.architecture, multipliers
            )));
        }

        if ![1, 2, 4].contains(&self.quant_bytes) {
            return Err(PartCropError::config_value_error(
                "quant bytes",
                self.quant_bytes,
                "1, 2 or 4",
                Some(4),
            ));
        }
        Ok(())
    }
}

/// Per-call segmentation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Return one mask per person instead of a single merged mask
    pub multi_segmentation: bool,
    /// Produce part labels rather than a person/background mask
    pub segment_body_parts: bool,
    /// Minimum confidence for a pixel to count as a person
    pub segmentation_threshold: f32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            multi_segmentation: false,
            segment_body_parts: true,
            segmentation_threshold: 0.8,
        }
    }
}

impl SegmentationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.segmentation_threshold) {
            return Err(PartCropError::config_value_error(
                "segmentation threshold",
                self.segmentation_threshold,
                "0.0-1.0",
                Some(0.8),
            ));
        }
        Ok(())
    }
}

/// One detected instance
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// RGBA mask; the red channel carries the part label
    pub mask: MaskImageData,
    /// Detection confidence, when the backend reports one
    pub score: Option<f32>,
}

impl Segmentation {
    #[must_use]
    pub fn new(mask: MaskImageData) -> Self {
        Self { mask, score: None }
    }
}

/// Trait for segmentation backends
#[async_trait]
pub trait SegmentationBackend: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &str;

    /// Prepare the backend, returning model load time when applicable
    ///
    /// # Errors
    /// - Invalid segmenter configuration
    /// - Model loading failures
    async fn initialize(&mut self, config: &SegmenterConfig) -> Result<Option<Duration>>;

    /// Segment `image`, returning masks at the image's resolution
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Inference failures
    async fn segment(
        &mut self,
        image: &DynamicImage,
        config: &SegmentationConfig,
    ) -> Result<Vec<Segmentation>>;

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmenter_defaults_are_valid() {
        let config = SegmenterConfig::default();
        assert_eq!(config.architecture, Architecture::ResNet50);
        assert_eq!(config.output_stride, 16);
        assert_eq!(config.quant_bytes, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_segmenter_validation() {
        let config = SegmenterConfig {
            output_stride: 8,
            ..SegmenterConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SegmenterConfig {
            architecture: Architecture::MobileNetV1,
            output_stride: 8,
            multiplier: 0.75,
            quant_bytes: 2,
        };
        assert!(config.validate().is_ok());

        let config = SegmenterConfig {
            quant_bytes: 3,
            ..SegmenterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_segmentation_config() {
        let config = SegmentationConfig::default();
        assert!(!config.multi_segmentation);
        assert!(config.segment_body_parts);
        assert!((config.segmentation_threshold - 0.8).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());

        let config = SegmentationConfig {
            segmentation_threshold: 1.2,
            ..SegmentationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
