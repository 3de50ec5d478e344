//! Backend serving a mask produced ahead of time
//!
//! Useful when inference runs elsewhere (for example in a browser) and only
//! the exported part mask is available. The mask is either given in memory
//! or loaded from an image file whose red channel holds the labels.

use crate::{
    error::{PartCropError, Result},
    segmentation::{Segmentation, SegmentationBackend, SegmentationConfig, SegmenterConfig},
    services::ImageIOService,
    types::MaskImageData,
};
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use instant::{Duration, Instant};
use std::path::PathBuf;
use tracing::debug;

/// Where the precomputed mask comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskSource {
    Memory(MaskImageData),
    File(PathBuf),
}

/// Segmentation backend returning a fixed, precomputed mask
#[derive(Debug, Clone)]
pub struct PrecomputedMaskBackend {
    source: MaskSource,
    mask: Option<MaskImageData>,
}

impl PrecomputedMaskBackend {
    #[must_use]
    pub fn from_mask(mask: MaskImageData) -> Self {
        Self {
            source: MaskSource::Memory(mask),
            mask: None,
        }
    }

    pub fn from_file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            source: MaskSource::File(path.into()),
            mask: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> &MaskSource {
        &self.source
    }
}

#[async_trait]
impl SegmentationBackend for PrecomputedMaskBackend {
    fn name(&self) -> &str {
        "precomputed"
    }

    async fn initialize(&mut self, _config: &SegmenterConfig) -> Result<Option<Duration>> {
        if self.mask.is_some() {
            return Ok(None);
        }

        let start = Instant::now();
        let mask = match &self.source {
            MaskSource::Memory(mask) => mask.clone(),
            MaskSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| PartCropError::file_io_error("read mask file", path, &e))?;
                ImageIOService::load_mask_from_bytes(&bytes)?
            },
        };
        debug!(
            width = mask.width,
            height = mask.height,
            "loaded precomputed mask"
        );

        self.mask = Some(mask);
        Ok(Some(start.elapsed()))
    }

    async fn segment(
        &mut self,
        image: &DynamicImage,
        _config: &SegmentationConfig,
    ) -> Result<Vec<Segmentation>> {
        let mask = self
            .mask
            .as_ref()
            .ok_or_else(|| PartCropError::segmentation("Precomputed backend not initialized"))?;

        if mask.dimensions() != image.dimensions() {
            return Err(PartCropError::segmentation(format!(
                "Precomputed mask is {}x{} but image is {}x{}",
                mask.width,
                mask.height,
                image.width(),
                image.height()
            )));
        }

        Ok(vec![Segmentation::new(mask.clone())])
    }

    fn is_initialized(&self) -> bool {
        self.mask.is_some()
    }
}
