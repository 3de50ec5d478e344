//! Label extraction pipeline
//!
//! Stages run strictly downstream, each consuming borrowed input and
//! returning a new value:
//!
//! mask reader → index filter → coordinate mapper → (pixel sampler,
//! bounding box) → crop compositor

pub mod bounding_box;
pub mod compositor;
pub mod coordinate_mapper;
pub mod index_filter;
pub mod mask_reader;
pub mod pixel_sampler;

pub use compositor::{Composite, CropCompositor};
pub use coordinate_mapper::map_coordinates;
pub use index_filter::{count_label, filter_indices, label_histogram};
pub use mask_reader::read_labels;
pub use pixel_sampler::{sample_pixels, PixelSource};

use crate::{
    config::ExtractionConfig,
    error::{PartCropError, Result},
    types::{BoundingBox, ExtractionResult, ExtractionTimings, LabelMask},
};
use instant::Instant;
use tracing::{debug, instrument};

/// Runs the extraction pipeline for one label at a time
///
/// Holds only configuration; the source image and mask are borrowed per
/// call, so one extractor can serve any number of requests.
#[derive(Debug, Clone, Default)]
pub struct PartExtractor {
    config: ExtractionConfig,
}

impl PartExtractor {
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract the pixels labeled `label` into a tightly cropped image
    ///
    /// # Errors
    /// - `InvalidWidth` for a zero-width mask
    /// - `EmptySelection` if no pixel carries `label`
    /// - `CoordinateOutOfBounds` if the mask is larger than the source image
    /// - `DimensionMismatch` on a degenerate legacy box or a compositing invariant violation
    #[instrument(
        skip(self, source, mask),
        fields(
            mask = %format!("{}x{}", mask.width(), mask.height()),
            convention = %self.config.bounds
        )
    )]
    pub fn extract<S: PixelSource + ?Sized>(
        &self,
        source: &S,
        mask: &LabelMask,
        label: u32,
    ) -> Result<ExtractionResult> {
        let start = Instant::now();

        let indices = filter_indices(mask.labels(), label);
        debug!(selected = indices.len(), "filtered label indices");

        let coordinates = map_coordinates(&indices, mask.width())?;
        let pixels = sample_pixels(source, &coordinates)?;
        let bounding_box = BoundingBox::from_coordinates(&coordinates).map_err(|e| match e {
            PartCropError::EmptySelection { .. } => PartCropError::empty_selection(Some(label)),
            other => other,
        })?;
        debug!(?bounding_box, "computed bounding box");

        let composite =
            CropCompositor::from_config(&self.config).composite_counted(&bounding_box, &pixels)?;

        Ok(ExtractionResult {
            image: composite.image,
            label,
            bounding_box,
            pixel_count: pixels.len(),
            painted_count: composite.painted,
            convention: self.config.bounds,
            timings: ExtractionTimings {
                extraction_ms: start.elapsed().as_millis() as u64,
                ..ExtractionTimings::default()
            },
        })
    }

    /// Run independent extractions for several labels over the same inputs
    ///
    /// Each label gets its own result; one failing label does not affect others.
    pub fn extract_many<S: PixelSource + ?Sized>(
        &self,
        source: &S,
        mask: &LabelMask,
        labels: &[u32],
    ) -> Vec<(u32, Result<ExtractionResult>)> {
        labels
            .iter()
            .map(|&label| (label, self.extract(source, mask, label)))
            .collect()
    }
}
