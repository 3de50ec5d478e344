//! Body-part extraction processor
//!
//! `BodyPartProcessor` owns a segmentation backend, runs segmentation once
//! per image and serves any number of label extractions from the decoded
//! mask. It is the entry point used by the CLI.

use crate::{
    config::ExtractionConfig,
    error::{PartCropError, Result},
    pipeline::{label_histogram, PartExtractor},
    segmentation::{SegmentationBackend, SegmentationConfig, SegmenterConfig},
    services::ImageIOService,
    types::{ExtractionResult, LabelMask},
    visualize::{self, OverlayOptions},
};
use image::{DynamicImage, GenericImageView, RgbaImage};
use instant::Instant;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for the processor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorConfig {
    /// Model construction parameters handed to the backend
    pub segmenter: SegmenterConfig,
    /// Per-image segmentation parameters
    pub segmentation: SegmentationConfig,
    /// Crop construction parameters
    pub extraction: ExtractionConfig,
    /// Which detected instance to extract from
    pub instance_index: usize,
}

impl ProcessorConfig {
    #[must_use]
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        self.segmenter.validate()?;
        self.segmentation.validate()?;
        self.extraction.validate()
    }
}

/// Builder for `ProcessorConfig`
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.config.segmenter = segmenter;
        self
    }

    #[must_use]
    pub fn segmentation(mut self, segmentation: SegmentationConfig) -> Self {
        self.config.segmentation = segmentation;
        self
    }

    #[must_use]
    pub fn extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.config.extraction = extraction;
        self
    }

    #[must_use]
    pub fn instance_index(mut self, index: usize) -> Self {
        self.config.instance_index = index;
        self
    }

    pub fn build(self) -> Result<ProcessorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Decoded mask for the most recently segmented image
struct CachedSegmentation {
    fingerprint: u64,
    mask: LabelMask,
}

/// Segments images and extracts body-part crops from them
pub struct BodyPartProcessor {
    config: ProcessorConfig,
    backend: Box<dyn SegmentationBackend>,
    extractor: PartExtractor,
    initialized: bool,
    cached: Option<CachedSegmentation>,
}

impl BodyPartProcessor {
    /// Create a processor around a segmentation backend
    ///
    /// # Errors
    /// - Invalid processor configuration
    pub fn new(config: ProcessorConfig, backend: Box<dyn SegmentationBackend>) -> Result<Self> {
        config.validate()?;
        let extractor = PartExtractor::new(config.extraction.clone());
        Ok(Self {
            config,
            backend,
            extractor,
            initialized: false,
            cached: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Initialize the backend; repeated calls are no-ops
    ///
    /// # Errors
    /// - Backend initialization failures
    pub async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        info!(backend = self.backend.name(), "Initializing body-part processor");
        let load_time = self.backend.initialize(&self.config.segmenter).await?;
        if let Some(duration) = load_time {
            debug!(load_ms = duration.as_millis() as u64, "backend ready");
        }

        self.initialized = true;
        Ok(())
    }

    /// Segment `image` and return its decoded label mask
    ///
    /// The mask is cached; segmenting the same pixels again reuses it.
    ///
    /// # Errors
    /// - Backend failures or an instance list too short for `instance_index`
    /// - `InvalidMaskFormat` if the backend returns a malformed mask
    pub async fn segment(&mut self, image: &DynamicImage) -> Result<&LabelMask> {
        self.ensure_segmented(image).await?;
        self.cached
            .as_ref()
            .map(|cached| &cached.mask)
            .ok_or_else(|| PartCropError::segmentation("No segmentation available"))
    }

    /// Extract one label from `image` into a cropped image
    ///
    /// # Errors
    /// - Segmentation failures
    /// - Any extraction pipeline error, e.g. `EmptySelection` for an absent label
    #[instrument(
        skip(self, image),
        fields(dimensions = %format!("{}x{}", image.width(), image.height()))
    )]
    pub async fn extract_label(
        &mut self,
        image: &DynamicImage,
        label: u32,
    ) -> Result<ExtractionResult> {
        let segmentation_ms = self.ensure_segmented(image).await?;
        let mask = self.cached_mask()?;

        let mut result = self.extractor.extract(image, mask, label)?;
        result.timings.segmentation_ms = segmentation_ms;
        info!("{}", result.summary());
        Ok(result)
    }

    /// Extract several labels; each label succeeds or fails on its own
    ///
    /// The segmentation time is attached to the first successful result.
    ///
    /// # Errors
    /// - Segmentation failures (per-label errors are returned in the vector)
    pub async fn extract_labels(
        &mut self,
        image: &DynamicImage,
        labels: &[u32],
    ) -> Result<Vec<(u32, Result<ExtractionResult>)>> {
        let segmentation_ms = self.ensure_segmented(image).await?;
        let mask = self.cached_mask()?;

        let mut results = self.extractor.extract_many(image, mask, labels);
        if let Some(first) = results.iter_mut().find_map(|(_, result)| result.as_mut().ok()) {
            first.timings.segmentation_ms = segmentation_ms;
        }
        Ok(results)
    }

    /// Load an image file and extract the given labels from it
    pub async fn process_file<P: AsRef<Path>>(
        &mut self,
        input_path: P,
        labels: &[u32],
    ) -> Result<Vec<(u32, Result<ExtractionResult>)>> {
        let input_path_ref = input_path.as_ref();
        info!(path = %input_path_ref.display(), "Processing image file");

        let image = ImageIOService::load_image(input_path_ref)?;
        self.extract_labels(&image, labels).await
    }

    /// Pixel count per label in the segmentation of `image`
    pub async fn label_histogram(&mut self, image: &DynamicImage) -> Result<BTreeMap<u32, usize>> {
        self.ensure_segmented(image).await?;
        Ok(label_histogram(self.cached_mask()?.labels()))
    }

    /// Rainbow-colored part mask blended over `image`
    pub async fn overlay(
        &mut self,
        image: &DynamicImage,
        options: &OverlayOptions,
    ) -> Result<RgbaImage> {
        self.ensure_segmented(image).await?;
        let colored = visualize::colored_mask(
            self.cached_mask()?,
            visualize::rainbow_palette,
            visualize::DEFAULT_MASK_BACKGROUND,
        );
        visualize::overlay_mask(image, &colored, options)
    }

    fn cached_mask(&self) -> Result<&LabelMask> {
        self.cached
            .as_ref()
            .map(|cached| &cached.mask)
            .ok_or_else(|| PartCropError::segmentation("No segmentation available"))
    }

    /// Run segmentation unless the cache already holds this image's mask
    ///
    /// Returns the segmentation time when segmentation actually ran.
    async fn ensure_segmented(&mut self, image: &DynamicImage) -> Result<Option<u64>> {
        let fingerprint = Self::fingerprint(image);
        if self
            .cached
            .as_ref()
            .is_some_and(|cached| cached.fingerprint == fingerprint)
        {
            debug!("reusing cached segmentation");
            return Ok(None);
        }

        self.initialize().await?;

        let start = Instant::now();
        let segmentations = self
            .backend
            .segment(image, &self.config.segmentation)
            .await?;
        debug!(instances = segmentations.len(), "segmentation finished");

        let index = self.config.instance_index;
        let segmentation = segmentations.get(index).ok_or_else(|| {
            PartCropError::segmentation(format!(
                "Instance {} requested but segmentation found {}",
                index,
                segmentations.len()
            ))
        })?;

        let mask = LabelMask::from_mask_image(&segmentation.mask)?;
        if mask.dimensions() != image.dimensions() {
            let (mask_w, mask_h) = mask.dimensions();
            return Err(PartCropError::segmentation(format!(
                "Backend '{}' returned a {}x{} mask for a {}x{} image",
                self.backend.name(),
                mask_w,
                mask_h,
                image.width(),
                image.height()
            )));
        }
        let elapsed = start.elapsed().as_millis() as u64;

        self.cached = Some(CachedSegmentation { fingerprint, mask });
        Ok(Some(elapsed))
    }

    fn fingerprint(image: &DynamicImage) -> u64 {
        let mut hasher = DefaultHasher::new();
        image.dimensions().hash(&mut hasher);
        image.color().channel_count().hash(&mut hasher);
        image.as_bytes().hash(&mut hasher);
        hasher.finish()
    }
}
