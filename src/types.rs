//! Core types for body-part extraction operations

use crate::{
    config::{BoundsConvention, OutputFormat},
    error::Result,
    services::{ImageIOService, OutputFormatHandler},
};
use chrono::{DateTime, Utc};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bytes per pixel in every RGBA buffer handled by the crate
pub const RGBA_STRIDE: usize = 4;

/// An (x, y) position inside an image, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelCoordinate {
    pub x: u32,
    pub y: u32,
}

impl PixelCoordinate {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Row-major linear index of this coordinate for the given row width
    #[must_use]
    pub fn to_index(self, width: u32) -> usize {
        self.y as usize * width as usize + self.x as usize
    }
}

impl std::fmt::Display for PixelCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One selected pixel: where it is and what color the source image has there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampledPixel {
    pub coordinate: PixelCoordinate,
    pub color: Rgba<u8>,
}

impl SampledPixel {
    #[must_use]
    pub const fn new(coordinate: PixelCoordinate, color: Rgba<u8>) -> Self {
        Self { coordinate, color }
    }
}

/// Minimal axis-aligned rectangle around a non-empty coordinate set
///
/// Always satisfies `x_min <= x_max` and `y_min <= y_max`. Built by
/// [`BoundingBox::from_coordinates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl BoundingBox {
    /// Top-left corner; the translation applied to every pixel in the crop
    #[must_use]
    pub const fn origin(&self) -> PixelCoordinate {
        PixelCoordinate::new(self.x_min, self.y_min)
    }

    /// Crop width under the given sizing convention
    #[must_use]
    pub fn width(&self, convention: BoundsConvention) -> u32 {
        convention.extent(self.x_min, self.x_max)
    }

    /// Crop height under the given sizing convention
    #[must_use]
    pub fn height(&self, convention: BoundsConvention) -> u32 {
        convention.extent(self.y_min, self.y_max)
    }

    /// Whether the coordinate lies inside the box, edges included
    #[must_use]
    pub fn contains(&self, coordinate: PixelCoordinate) -> bool {
        (self.x_min..=self.x_max).contains(&coordinate.x)
            && (self.y_min..=self.y_max).contains(&coordinate.y)
    }
}

/// Raw RGBA mask as materialized by a segmentation collaborator
///
/// The buffer is not validated here; [`crate::pipeline::read_labels`] checks
/// its length when decoding labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl MaskImageData {
    #[must_use]
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap a decoded RGBA image, taking ownership of its buffer
    #[must_use]
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Per-pixel part labels in row-major order (`index = y * width + x`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMask {
    width: u32,
    height: u32,
    labels: Vec<u32>,
}

impl LabelMask {
    /// Invariant `labels.len() == width * height` is upheld by the mask reader
    pub(crate) fn from_parts(width: u32, height: u32, labels: Vec<u32>) -> Self {
        debug_assert_eq!(labels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            labels,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Label at (x, y), or `None` outside the mask
    #[must_use]
    pub fn label_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.labels
            .get(PixelCoordinate::new(x, y).to_index(self.width))
            .copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Tightly cropped output image holding one label's pixels
///
/// Never zero-sized: the compositor refuses to produce an empty canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    image: RgbaImage,
}

impl CroppedImage {
    pub(crate) fn from_rgba(image: RgbaImage) -> Self {
        debug_assert!(image.width() > 0 && image.height() > 0);
        Self { image }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Color at (x, y) in crop-local coordinates
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Raw RGBA bytes, 4 per pixel, row-major
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[must_use]
    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn into_rgba_image(self) -> RgbaImage {
        self.image
    }

    #[must_use]
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.image.clone())
    }

    /// Save the crop in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        ImageIOService::save_image(&self.image, path, format, quality)
    }

    /// Save the crop as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(path, OutputFormat::Png, 100)
    }

    /// Get the crop as encoded bytes in the specified format
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        OutputFormatHandler::encode(&self.image, format, quality)
    }
}

/// Timing breakdown for one extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionTimings {
    /// Segmentation time; `None` when a cached segmentation was reused
    pub segmentation_ms: Option<u64>,

    /// Label decoding plus the full extraction pipeline
    pub extraction_ms: u64,

    /// Wall-clock completion time
    pub completed_at: DateTime<Utc>,
}

impl Default for ExtractionTimings {
    fn default() -> Self {
        Self {
            segmentation_ms: None,
            extraction_ms: 0,
            completed_at: Utc::now(),
        }
    }
}

/// Result of extracting a single label
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The cropped output image
    pub image: CroppedImage,

    /// The label that was extracted
    pub label: u32,

    /// Bounding box of the selected pixels in source coordinates
    pub bounding_box: BoundingBox,

    /// Number of source pixels carrying the label
    pub pixel_count: usize,

    /// Number of pixels actually painted into the crop
    pub painted_count: usize,

    /// Sizing convention the crop was built with
    pub convention: BoundsConvention,

    pub timings: ExtractionTimings,
}

impl ExtractionResult {
    /// Save the cropped image in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        self.image.save(path, format, quality)
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// One-line summary for display
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "label {}: {} pixels, box x[{}..={}] y[{}..={}], crop {}x{} ({} painted) in {}ms",
            self.label,
            self.pixel_count,
            self.bounding_box.x_min,
            self.bounding_box.x_max,
            self.bounding_box.y_min,
            self.bounding_box.y_max,
            self.image.width(),
            self.image.height(),
            self.painted_count,
            self.timings.extraction_ms
        )
    }
}
