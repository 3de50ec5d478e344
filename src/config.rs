//! Configuration types for body-part extraction operations

use crate::error::{PartCropError, Result};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opaque red, the default crop background
pub const DEFAULT_FILL_COLOR: [u8; 4] = [255, 0, 0, 255];

/// How crop dimensions are derived from a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsConvention {
    /// `max - min + 1`: the crop covers every selected pixel
    #[default]
    Inclusive,
    /// `max - min`: canvas-based crop sizing; the last row and column of the
    /// selection fall outside the canvas and are clipped
    Legacy,
}

impl BoundsConvention {
    /// Extent along one axis for the given inclusive min/max pair
    #[must_use]
    pub fn extent(self, min: u32, max: u32) -> u32 {
        let span = max.saturating_sub(min);
        match self {
            Self::Inclusive => span.saturating_add(1),
            Self::Legacy => span,
        }
    }
}

impl std::fmt::Display for BoundsConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inclusive => write!(f, "inclusive"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// What happens to the sampled alpha channel when painting into the crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaMode {
    /// Paint sampled RGB fully opaque
    #[default]
    Discard,
    /// Copy the sampled alpha verbatim
    Preserve,
}

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG with alpha channel
    #[default]
    Png,
    /// JPEG (no transparency, alpha dropped)
    Jpeg,
    /// TIFF with alpha channel
    Tiff,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    Rgba8,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::Tiff => write!(f, "tiff"),
            Self::Rgba8 => write!(f, "rgba8"),
        }
    }
}

/// Configuration for label extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Background fill for crop cells no selected pixel lands on (RGBA)
    pub fill_color: [u8; 4],

    /// Crop sizing convention
    pub bounds: BoundsConvention,

    /// Alpha handling while painting
    pub alpha: AlphaMode,

    /// Output format used when saving results
    pub output_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fill_color: DEFAULT_FILL_COLOR,
            bounds: BoundsConvention::default(),
            alpha: AlphaMode::default(),
            output_format: OutputFormat::default(),
            jpeg_quality: 90,
        }
    }
}

impl ExtractionConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::new()
    }

    #[must_use]
    pub fn fill_rgba(&self) -> Rgba<u8> {
        Rgba(self.fill_color)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality > 100 {
            return Err(PartCropError::config_value_error(
                "JPEG quality",
                self.jpeg_quality,
                "0-100",
                Some(90),
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| PartCropError::file_io_error("read config file", path_ref, &e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for `ExtractionConfig`
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fill_color(mut self, color: [u8; 4]) -> Self {
        self.config.fill_color = color;
        self
    }

    #[must_use]
    pub fn bounds(mut self, bounds: BoundsConvention) -> Self {
        self.config.bounds = bounds;
        self
    }

    #[must_use]
    pub fn alpha(mut self, alpha: AlphaMode) -> Self {
        self.config.alpha = alpha;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Set JPEG quality (clamped to 0-100)
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.min(100);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ExtractionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parse a color given as `#rgb`, `#rrggbb`, `#rrggbbaa`, `r,g,b[,a]` or a name
///
/// Names: `red`, `green`, `blue`, `black`, `white`, `transparent`.
pub fn parse_color(input: &str) -> Result<[u8; 4]> {
    let trimmed = input.trim();
    let invalid = || PartCropError::invalid_config(format!("Unrecognized color '{}'", input));

    match trimmed.to_ascii_lowercase().as_str() {
        "red" => return Ok([255, 0, 0, 255]),
        "green" => return Ok([0, 128, 0, 255]),
        "blue" => return Ok([0, 0, 255, 255]),
        "black" => return Ok([0, 0, 0, 255]),
        "white" => return Ok([255, 255, 255, 255]),
        "transparent" => return Ok([0, 0, 0, 0]),
        _ => {},
    }

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        return match hex.len() {
            3 => {
                let mut rgba = [0, 0, 0, 255];
                for (slot, c) in rgba.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = v * 17;
                }
                Ok(rgba)
            },
            6 | 8 => {
                let mut rgba = [0, 0, 0, 255];
                for (i, slot) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
                    let part = hex.get(i * 2..i * 2 + 2).ok_or_else(invalid)?;
                    *slot = channel(part)?;
                }
                Ok(rgba)
            },
            _ => Err(invalid()),
        };
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if parts.len() == 3 || parts.len() == 4 {
        let mut rgba = [0, 0, 0, 255];
        for (slot, part) in rgba.iter_mut().zip(&parts) {
            *slot = part.parse::<u8>().map_err(|_| invalid())?;
        }
        return Ok(rgba);
    }

    Err(invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.fill_color, [255, 0, 0, 255]);
        assert_eq!(config.bounds, BoundsConvention::Inclusive);
        assert_eq!(config.alpha, AlphaMode::Discard);
        assert_eq!(config.output_format, OutputFormat::Png);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = ExtractionConfig::builder()
            .fill_color([0, 0, 0, 0])
            .bounds(BoundsConvention::Legacy)
            .alpha(AlphaMode::Preserve)
            .output_format(OutputFormat::Tiff)
            .jpeg_quality(150)
            .build()
            .unwrap();

        assert_eq!(config.fill_color, [0, 0, 0, 0]);
        assert_eq!(config.bounds, BoundsConvention::Legacy);
        assert_eq!(config.alpha, AlphaMode::Preserve);
        assert_eq!(config.output_format, OutputFormat::Tiff);
        assert_eq!(config.jpeg_quality, 100);
    }

    #[test]
    fn test_manual_validation_failure() {
        let mut config = ExtractionConfig::default();
        config.jpeg_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("JPEG quality"));
        assert!(err.to_string().contains("101"));
    }

    #[test]
    fn test_extent_conventions() {
        assert_eq!(BoundsConvention::Inclusive.extent(3, 3), 1);
        assert_eq!(BoundsConvention::Legacy.extent(3, 3), 0);
        assert_eq!(BoundsConvention::Inclusive.extent(0, 9), 10);
        assert_eq!(BoundsConvention::Legacy.extent(0, 9), 9);
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let config = ExtractionConfig::from_json_str(r#"{"bounds": "legacy"}"#).unwrap();
        assert_eq!(config.bounds, BoundsConvention::Legacy);
        assert_eq!(config.fill_color, DEFAULT_FILL_COLOR);

        let json = config.to_json_string().unwrap();
        let parsed = ExtractionConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);

        assert!(ExtractionConfig::from_json_str(r#"{"jpeg_quality": 200}"#).is_err());
        assert!(matches!(
            ExtractionConfig::from_json_str("{not json"),
            Err(PartCropError::Serialization(_))
        ));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("red").unwrap(), [255, 0, 0, 255]);
        assert_eq!(parse_color("Transparent").unwrap(), [0, 0, 0, 0]);
        assert_eq!(parse_color("#fff").unwrap(), [255, 255, 255, 255]);
        assert_eq!(parse_color("#102030").unwrap(), [16, 32, 48, 255]);
        assert_eq!(parse_color("#10203040").unwrap(), [16, 32, 48, 64]);
        assert_eq!(parse_color("1, 2, 3").unwrap(), [1, 2, 3, 255]);
        assert_eq!(parse_color("1,2,3,4").unwrap(), [1, 2, 3, 4]);
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("256,0,0").is_err());
        assert!(parse_color("mauve").is_err());
    }
}
