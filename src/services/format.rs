//! Output format handling service
//!
//! Keeps output format conversion and encoding apart from the extraction
//! pipeline.

use crate::{config::OutputFormat, error::Result};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageBuffer, RgbaImage};
use std::io::Cursor;

/// Service for handling output format conversions
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Convert an RGBA crop to the image representation used for `format`
    ///
    /// JPEG drops the alpha channel; every other format keeps RGBA.
    #[must_use]
    pub fn convert_format(rgba_image: RgbaImage, format: OutputFormat) -> DynamicImage {
        match format {
            OutputFormat::Png | OutputFormat::Tiff | OutputFormat::Rgba8 => {
                DynamicImage::ImageRgba8(rgba_image)
            },
            OutputFormat::Jpeg => {
                let (width, height) = rgba_image.dimensions();
                let mut rgb_image = ImageBuffer::new(width, height);

                for (x, y, pixel) in rgba_image.enumerate_pixels() {
                    rgb_image.put_pixel(x, y, image::Rgb([pixel[0], pixel[1], pixel[2]]));
                }

                DynamicImage::ImageRgb8(rgb_image)
            },
        }
    }

    /// Encode an RGBA crop into bytes of the given format
    ///
    /// `quality` applies to JPEG only.
    pub fn encode(rgba_image: &RgbaImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Png => {
                rgba_image.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
            },
            OutputFormat::Tiff => {
                rgba_image.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Tiff)?;
            },
            OutputFormat::Jpeg => {
                let rgb = Self::convert_format(rgba_image.clone(), OutputFormat::Jpeg).into_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
                encoder.encode_image(&rgb)?;
            },
            OutputFormat::Rgba8 => buffer.extend_from_slice(rgba_image.as_raw()),
        }
        Ok(buffer)
    }

    /// Get the appropriate file extension for a given output format
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Rgba8 => "raw",
        }
    }

    /// Check if a format supports transparency (alpha channel)
    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::Tiff | OutputFormat::Rgba8 => true,
            OutputFormat::Jpeg => false,
        }
    }

    /// Warn when a format will flatten a translucent fill or preserved alpha
    pub fn validate_for_crop(format: OutputFormat, fill_color: [u8; 4]) {
        if !Self::supports_transparency(format) && fill_color[3] < u8::MAX {
            log::warn!(
                "Output format {} does not support transparency; the translucent fill color will be flattened",
                format
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_convert_format_jpeg_drops_alpha() {
        let rgba_image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 128]));
        let converted = OutputFormatHandler::convert_format(rgba_image, OutputFormat::Jpeg);
        assert_eq!(converted.width(), 2);
        match converted {
            DynamicImage::ImageRgb8(rgb) => assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]),
            _ => panic!("Expected RGB8 image for JPEG format"),
        }
    }

    #[test]
    fn test_encode_formats() {
        let rgba_image = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));

        let raw = OutputFormatHandler::encode(&rgba_image, OutputFormat::Rgba8, 0).unwrap();
        assert_eq!(raw.len(), 3 * 2 * 4);

        let png = OutputFormatHandler::encode(&rgba_image, OutputFormat::Png, 0).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, rgba_image);

        let jpeg = OutputFormatHandler::encode(&rgba_image, OutputFormat::Jpeg, 90).unwrap();
        assert_eq!(jpeg.get(..2), Some(&[0xFF, 0xD8][..]));

        let tiff = OutputFormatHandler::encode(&rgba_image, OutputFormat::Tiff, 0).unwrap();
        assert!(!tiff.is_empty());
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Tiff), "tiff");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Rgba8), "raw");
    }

    #[test]
    fn test_supports_transparency() {
        assert!(OutputFormatHandler::supports_transparency(OutputFormat::Png));
        assert!(OutputFormatHandler::supports_transparency(OutputFormat::Rgba8));
        assert!(!OutputFormatHandler::supports_transparency(OutputFormat::Jpeg));
        OutputFormatHandler::validate_for_crop(OutputFormat::Jpeg, [0, 0, 0, 0]);
    }
}
