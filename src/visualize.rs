//! Part mask visualization
//!
//! Renders a label mask as a colored image and blends it over the source
//! image for inspection. Not part of the extraction path.

use crate::{
    error::{PartCropError, Result},
    parts,
    pipeline::PixelSource,
    types::LabelMask,
};
use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// White, the background used for unlabeled pixels in rendered masks
pub const DEFAULT_MASK_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Options for blending a colored mask over an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Mask opacity in [0, 1]
    pub opacity: f32,
    /// Gaussian blur sigma applied to the mask before blending; 0 disables
    pub blur_sigma: f32,
    /// Mirror the result horizontally
    pub flip_horizontal: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            opacity: 0.7,
            blur_sigma: 0.0,
            flip_horizontal: false,
        }
    }
}

impl OverlayOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(PartCropError::config_value_error(
                "overlay opacity",
                self.opacity,
                "0.0-1.0",
                Some(0.7),
            ));
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(PartCropError::config_value_error(
                "blur sigma",
                self.blur_sigma,
                ">= 0.0",
                Some(0.0),
            ));
        }
        Ok(())
    }
}

/// Render each label through `palette`; labels it maps to `None` get `background`
pub fn colored_mask<F>(mask: &LabelMask, palette: F, background: Rgba<u8>) -> RgbaImage
where
    F: Fn(u32) -> Option<Rgba<u8>>,
{
    let width = mask.width();
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        mask.labels()
            .get(y as usize * width as usize + x as usize)
            .and_then(|&label| palette(label))
            .unwrap_or(background)
    })
}

/// BodyPix rainbow palette as an opaque RGBA palette function
#[must_use]
pub fn rainbow_palette(label: u32) -> Option<Rgba<u8>> {
    parts::rainbow_color(label).map(|[r, g, b]| Rgba([r, g, b, 255]))
}

/// Blend `colored` over `source` at the configured opacity
///
/// # Errors
/// - `InvalidConfig` for out-of-range options or mismatched dimensions
pub fn overlay_mask<S: PixelSource + ?Sized>(
    source: &S,
    colored: &RgbaImage,
    options: &OverlayOptions,
) -> Result<RgbaImage> {
    options.validate()?;

    let (width, height) = source.dimensions();
    if colored.dimensions() != (width, height) {
        return Err(PartCropError::invalid_config(format!(
            "Overlay mask is {}x{} but image is {}x{}",
            colored.width(),
            colored.height(),
            width,
            height
        )));
    }

    let blurred;
    let mask = if options.blur_sigma > 0.0 {
        blurred = imageops::blur(colored, options.blur_sigma);
        &blurred
    } else {
        colored
    };

    let mut output = RgbaImage::from_fn(width, height, |x, y| {
        let base = source.rgba_at(x, y).unwrap_or(Rgba([0, 0, 0, 0]));
        let over = mask.get_pixel(x, y);
        blend(base, *over, options.opacity)
    });

    if options.flip_horizontal {
        imageops::flip_horizontal_in_place(&mut output);
    }
    Ok(output)
}

/// Source-over blend with the overlay alpha scaled by `opacity`
fn blend(base: Rgba<u8>, over: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let [br, bg, bb, ba] = base.0;
    let [or, og, ob, oa] = over.0;
    let a = opacity * f32::from(oa) / 255.0;
    let mix = |b: u8, o: u8| (f32::from(o) * a + f32::from(b) * (1.0 - a)).round() as u8;
    let out_alpha = (a * 255.0 + f32::from(ba) * (1.0 - a)).round() as u8;
    Rgba([mix(br, or), mix(bg, og), mix(bb, ob), out_alpha])
}
