//! Source image color sampling

use crate::{
    error::{PartCropError, Result},
    types::{PixelCoordinate, SampledPixel},
};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Read access to a fully decoded source image
pub trait PixelSource {
    /// Image size as `(width, height)`
    fn dimensions(&self) -> (u32, u32);

    /// RGBA color at (x, y), or `None` outside the image
    fn rgba_at(&self, x: u32, y: u32) -> Option<Rgba<u8>>;
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    fn rgba_at(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.get_pixel_checked(x, y).copied()
    }
}

impl PixelSource for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        GenericImageView::dimensions(self)
    }

    fn rgba_at(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.in_bounds(x, y).then(|| self.get_pixel(x, y))
    }
}

/// Sample the source color at every coordinate, preserving order
///
/// # Errors
/// - `CoordinateOutOfBounds` for the first coordinate outside the source image
pub fn sample_pixels<S: PixelSource + ?Sized>(
    source: &S,
    coordinates: &[PixelCoordinate],
) -> Result<Vec<SampledPixel>> {
    let (width, height) = source.dimensions();

    coordinates
        .iter()
        .map(|&coordinate| {
            source
                .rgba_at(coordinate.x, coordinate.y)
                .map(|color| SampledPixel::new(coordinate, color))
                .ok_or(PartCropError::CoordinateOutOfBounds {
                    coordinate,
                    width,
                    height,
                })
        })
        .collect()
}
