//! Crop compositing
//!
//! Allocates a canvas sized to the bounding box, fills it, then paints every
//! sampled pixel at its coordinate translated by the box origin. Pixels are
//! painted in input order, so a later pixel at the same cell wins.

use crate::{
    config::{AlphaMode, BoundsConvention, ExtractionConfig},
    error::{PartCropError, Result},
    types::{BoundingBox, CroppedImage, SampledPixel},
};
use image::{Rgba, RgbaImage};

/// Paints sampled pixels into a freshly allocated crop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropCompositor {
    fill: Rgba<u8>,
    convention: BoundsConvention,
    alpha: AlphaMode,
}

/// A finished crop plus how many pixels landed on the canvas
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: CroppedImage,
    pub painted: usize,
}

impl Default for CropCompositor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl CropCompositor {
    #[must_use]
    pub fn new(fill: Rgba<u8>, convention: BoundsConvention, alpha: AlphaMode) -> Self {
        Self {
            fill,
            convention,
            alpha,
        }
    }

    #[must_use]
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.fill_rgba(), config.bounds, config.alpha)
    }

    #[must_use]
    pub fn convention(&self) -> BoundsConvention {
        self.convention
    }

    /// Build the crop for `bbox` from `pixels`
    ///
    /// # Errors
    /// - `DimensionMismatch` if the box yields a zero-sized canvas, or if a
    ///   translated pixel falls outside the canvas under the inclusive convention
    pub fn composite(&self, bbox: &BoundingBox, pixels: &[SampledPixel]) -> Result<CroppedImage> {
        self.composite_counted(bbox, pixels).map(|c| c.image)
    }

    /// Like [`composite`](Self::composite), also reporting the painted count
    ///
    /// Under the legacy convention the far row and column translate past the
    /// canvas edge and are clipped, so `painted` may be below `pixels.len()`.
    pub fn composite_counted(
        &self,
        bbox: &BoundingBox,
        pixels: &[SampledPixel],
    ) -> Result<Composite> {
        let width = bbox.width(self.convention);
        let height = bbox.height(self.convention);

        if width == 0 || height == 0 {
            return Err(PartCropError::dimension_mismatch(format!(
                "{} bounds x[{}..={}] y[{}..={}] give an empty {}x{} canvas",
                self.convention, bbox.x_min, bbox.x_max, bbox.y_min, bbox.y_max, width, height
            )));
        }

        let mut canvas = RgbaImage::from_pixel(width, height, self.fill);
        let origin = bbox.origin();
        let mut painted = 0usize;

        for pixel in pixels {
            let local_x = pixel.coordinate.x.checked_sub(origin.x);
            let local_y = pixel.coordinate.y.checked_sub(origin.y);

            let slot = match (local_x, local_y) {
                (Some(x), Some(y)) => canvas.get_pixel_mut_checked(x, y),
                _ => None,
            };

            match slot {
                Some(cell) => {
                    *cell = self.paint_color(pixel.color);
                    painted += 1;
                },
                None if self.convention == BoundsConvention::Legacy => {},
                None => {
                    return Err(PartCropError::dimension_mismatch(format!(
                        "pixel {} translates outside the {}x{} crop anchored at {}",
                        pixel.coordinate, width, height, origin
                    )));
                },
            }
        }

        tracing::debug!(
            width,
            height,
            painted,
            clipped = pixels.len() - painted,
            convention = %self.convention,
            "composited crop"
        );

        Ok(Composite {
            image: CroppedImage::from_rgba(canvas),
            painted,
        })
    }

    fn paint_color(&self, color: Rgba<u8>) -> Rgba<u8> {
        match self.alpha {
            AlphaMode::Discard => {
                let [r, g, b, _] = color.0;
                Rgba([r, g, b, u8::MAX])
            },
            AlphaMode::Preserve => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelCoordinate;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn pixel(x: u32, y: u32, color: [u8; 4]) -> SampledPixel {
        SampledPixel::new(PixelCoordinate::new(x, y), Rgba(color))
    }

    fn bbox(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> BoundingBox {
        BoundingBox {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    #[test]
    fn test_inclusive_crop_paints_translated_pixels() {
        let compositor = CropCompositor::new(RED, BoundsConvention::Inclusive, AlphaMode::Discard);
        let pixels = [
            pixel(1, 1, [10, 20, 30, 40]),
            pixel(2, 1, [50, 60, 70, 80]),
            pixel(1, 2, [90, 100, 110, 120]),
        ];
        let composite = compositor
            .composite_counted(&bbox(1, 2, 1, 2), &pixels)
            .unwrap();
        let crop = composite.image;

        assert_eq!(crop.dimensions(), (2, 2));
        assert_eq!(composite.painted, 3);
        assert_eq!(crop.pixel(0, 0), Some(Rgba([10, 20, 30, 255])));
        assert_eq!(crop.pixel(1, 0), Some(Rgba([50, 60, 70, 255])));
        assert_eq!(crop.pixel(0, 1), Some(Rgba([90, 100, 110, 255])));
        assert_eq!(crop.pixel(1, 1), Some(RED));
    }

    #[test]
    fn test_legacy_crop_clips_far_edges() {
        let compositor = CropCompositor::new(RED, BoundsConvention::Legacy, AlphaMode::Discard);
        let pixels = [
            pixel(1, 1, [10, 20, 30, 40]),
            pixel(2, 1, [50, 60, 70, 80]),
            pixel(1, 2, [90, 100, 110, 120]),
        ];
        let composite = compositor
            .composite_counted(&bbox(1, 2, 1, 2), &pixels)
            .unwrap();

        assert_eq!(composite.image.dimensions(), (1, 1));
        assert_eq!(composite.painted, 1);
        assert_eq!(composite.image.pixel(0, 0), Some(Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_legacy_degenerate_box_is_rejected() {
        let compositor = CropCompositor::new(RED, BoundsConvention::Legacy, AlphaMode::Discard);
        let result = compositor.composite(&bbox(3, 3, 0, 5), &[pixel(3, 0, [0, 0, 0, 0])]);
        assert!(matches!(result, Err(PartCropError::DimensionMismatch(_))));
    }

    #[test]
    fn test_pixel_outside_box_is_invariant_violation() {
        let compositor = CropCompositor::default();
        let result = compositor.composite(&bbox(2, 3, 2, 3), &[pixel(5, 2, [1, 1, 1, 1])]);
        assert!(matches!(result, Err(PartCropError::DimensionMismatch(_))));

        let result = compositor.composite(&bbox(2, 3, 2, 3), &[pixel(0, 2, [1, 1, 1, 1])]);
        assert!(matches!(result, Err(PartCropError::DimensionMismatch(_))));
    }

    #[test]
    fn test_alpha_modes() {
        let pixels = [pixel(0, 0, [1, 2, 3, 4])];
        let discard = CropCompositor::new(RED, BoundsConvention::Inclusive, AlphaMode::Discard)
            .composite(&bbox(0, 0, 0, 0), &pixels)
            .unwrap();
        assert_eq!(discard.pixel(0, 0), Some(Rgba([1, 2, 3, 255])));

        let preserve = CropCompositor::new(RED, BoundsConvention::Inclusive, AlphaMode::Preserve)
            .composite(&bbox(0, 0, 0, 0), &pixels)
            .unwrap();
        assert_eq!(preserve.pixel(0, 0), Some(Rgba([1, 2, 3, 4])));
    }

    #[test]
    fn test_fill_color_keeps_its_alpha() {
        let clear = Rgba([0, 0, 0, 0]);
        let crop = CropCompositor::new(clear, BoundsConvention::Inclusive, AlphaMode::Discard)
            .composite(&bbox(0, 2, 0, 0), &[pixel(0, 0, [9, 9, 9, 9])])
            .unwrap();
        assert_eq!(crop.pixel(1, 0), Some(clear));
        assert_eq!(crop.pixel(2, 0), Some(clear));
    }

    #[test]
    fn test_later_writes_win() {
        let crop = CropCompositor::default()
            .composite(
                &bbox(0, 0, 0, 0),
                &[pixel(0, 0, [1, 1, 1, 255]), pixel(0, 0, [2, 2, 2, 255])],
            )
            .unwrap();
        assert_eq!(crop.pixel(0, 0), Some(Rgba([2, 2, 2, 255])));
    }
}
