//! Image I/O operations service
//!
//! Keeps file access apart from the extraction pipeline.

use crate::{
    config::OutputFormat,
    error::{PartCropError, Result},
    services::OutputFormatHandler,
    types::MaskImageData,
};
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Tries extension-based format detection first, then content sniffing.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bodypart_crop::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("person.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(PartCropError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref)
                    .map_err(|io_err| PartCropError::file_io_error("read image data", path_ref, &io_err))?;
                Self::load_from_bytes(&data)
            },
        }
    }

    /// Decode an image from bytes with content-based format detection
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    /// Load a part mask image; labels are read from its red channel later
    pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<MaskImageData> {
        let image = Self::load_image(path)?;
        Ok(MaskImageData::from_rgba_image(image.into_rgba8()))
    }

    /// Decode a part mask image from bytes
    pub fn load_mask_from_bytes(bytes: &[u8]) -> Result<MaskImageData> {
        let image = Self::load_from_bytes(bytes)?;
        Ok(MaskImageData::from_rgba_image(image.into_rgba8()))
    }

    /// Save an RGBA image in the given format, creating parent directories
    pub fn save_image<P: AsRef<Path>>(
        image: &RgbaImage,
        path: P,
        format: OutputFormat,
        quality: u8,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PartCropError::file_io_error("create output directory", parent, &e))?;
        }

        let bytes = OutputFormatHandler::encode(image, format, quality)?;
        std::fs::write(path_ref, bytes)
            .map_err(|e| PartCropError::file_io_error("write output image", path_ref, &e))?;

        log::debug!("Saved {} crop to {}", format, path_ref.display());
        Ok(())
    }

    /// Check if a file path has a supported image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                matches!(
                    ext.to_lowercase().as_str(),
                    "jpg" | "jpeg" | "png" | "tiff" | "tif"
                )
            })
    }
}
