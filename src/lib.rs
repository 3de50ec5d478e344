#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]
#![allow(clippy::cast_possible_truncation)]

//! # Body Part Crop Library
//!
//! Extracts the pixels of a single body-part label from a segmentation mask
//! and composites them into a tightly cropped image.
//!
//! The mask is an RGBA image the size of the source photo whose red channel
//! holds a part label per pixel (0-23 for `BodyPix`). Extraction runs a small
//! linear pipeline:
//!
//! 1. **Mask reader**: decode the red channel into a label grid
//! 2. **Index filter**: keep the flat indices carrying the requested label
//! 3. **Coordinate mapper**: turn indices into `(x, y)` positions
//! 4. **Pixel sampler / bounding box**: read source colors, compute extents
//! 5. **Crop compositor**: paint the sampled pixels onto a fill-colored canvas
//!
//! ## Features
//!
//! - **Configurable bounds**: inclusive extents (default) or the legacy
//!   `max - min` convention
//! - **Alpha handling**: force opaque output or keep source alpha
//! - **Pluggable segmentation**: any `SegmentationBackend`; masks may also be
//!   supplied precomputed
//! - **Format support**: PNG, JPEG, TIFF and raw RGBA8 output
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bodypart_crop::{extract_part, ExtractionConfig, ImageIOService};
//!
//! # fn example() -> anyhow::Result<()> {
//! let image = ImageIOService::load_image("person.jpg")?;
//! let mask = ImageIOService::load_mask("person_parts.png")?;
//!
//! // Label 12 is the front of the torso
//! let result = extract_part(&image, &mask, 12, &ExtractionConfig::default())?;
//! result.image.save_png("torso.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Processor Usage
//!
//! ```rust,no_run
//! use bodypart_crop::{BodyPart, BodyPartProcessor, PrecomputedMaskBackend, ProcessorConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = PrecomputedMaskBackend::from_file("person_parts.png");
//! let mut processor = BodyPartProcessor::new(ProcessorConfig::default(), Box::new(backend))?;
//!
//! let labels = [BodyPart::LeftHand.label(), BodyPart::RightHand.label()];
//! for (label, result) in processor.process_file("person.jpg", &labels).await? {
//!     match result {
//!         Ok(crop) => crop.image.save_png(format!("part_{}.png", label))?,
//!         Err(e) => eprintln!("label {}: {}", label, e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface and console tracing
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! bodypart-crop = { version = "0.1", default-features = false }
//! ```

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod parts;
pub mod pipeline;
pub mod processor;
pub mod segmentation;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod visualize;

use tokio::io::AsyncRead;

// Public API exports
pub use backends::{MaskSource, PrecomputedMaskBackend};
pub use config::{parse_color, AlphaMode, BoundsConvention, ExtractionConfig, OutputFormat};
pub use error::{PartCropError, Result};
pub use parts::{parse_label, BodyPart};
pub use pipeline::{PartExtractor, PixelSource};
pub use processor::{BodyPartProcessor, ProcessorConfig, ProcessorConfigBuilder};
pub use segmentation::{
    Architecture, Segmentation, SegmentationBackend, SegmentationConfig, SegmenterConfig,
};
pub use services::{ImageIOService, OutputFormatHandler};
pub use types::{
    BoundingBox, CroppedImage, ExtractionResult, ExtractionTimings, LabelMask, MaskImageData,
    PixelCoordinate, SampledPixel,
};
pub use visualize::OverlayOptions;

#[cfg(feature = "cli")]
pub use tracing_config::{events, init_cli_tracing, spans, TracingConfig, TracingFormat};

/// Extract one label from an image using its RGBA label mask
///
/// This is the synchronous, in-memory entry point. The mask's red channel
/// carries the label of each pixel and must not be larger than `source`.
///
/// # Errors
/// - `InvalidMaskFormat` if the mask buffer does not match its dimensions
/// - `InvalidWidth` for a zero-width mask
/// - `EmptySelection` if no pixel carries `label`
/// - `CoordinateOutOfBounds` if the mask extends past the source image
/// - `DimensionMismatch` for a degenerate crop under the legacy convention
///
/// # Examples
/// ```rust,no_run
/// use bodypart_crop::{extract_part, ExtractionConfig, BoundsConvention, MaskImageData};
/// use image::DynamicImage;
///
/// # fn example(image: DynamicImage, mask: MaskImageData) -> anyhow::Result<()> {
/// let config = ExtractionConfig::builder()
///     .bounds(BoundsConvention::Legacy)
///     .fill_color([0, 0, 0, 0])
///     .build()?;
/// let result = extract_part(&image, &mask, 10, &config)?;
/// println!("{}", result.summary());
/// # Ok(())
/// # }
/// ```
pub fn extract_part<S: PixelSource + ?Sized>(
    source: &S,
    mask: &MaskImageData,
    label: u32,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    config.validate()?;
    let labels = LabelMask::from_mask_image(mask)?;
    PartExtractor::new(config.clone()).extract(source, &labels, label)
}

/// Extract one label using the first instance of a segmentation result
///
/// # Errors
/// - `Segmentation` if `segmentations` is empty
/// - Any error from [`extract_part`]
pub fn extract_part_from_segmentation<S: PixelSource + ?Sized>(
    source: &S,
    segmentations: &[Segmentation],
    label: u32,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    let first = segmentations
        .first()
        .ok_or_else(|| PartCropError::segmentation("Segmentation returned no instances"))?;
    extract_part(source, &first.mask, label, config)
}

/// Extract one label from encoded image and mask bytes
///
/// # Errors
/// - `Image` if either buffer cannot be decoded
/// - Any error from [`extract_part`]
pub fn extract_part_from_bytes(
    image_bytes: &[u8],
    mask_bytes: &[u8],
    label: u32,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    let image = ImageIOService::load_from_bytes(image_bytes)?;
    let mask = ImageIOService::load_mask_from_bytes(mask_bytes)?;
    extract_part(&image, &mask, label, config)
}

/// Extract one label from async image and mask streams
///
/// Both streams are read to the end before decoding.
pub async fn extract_part_from_reader<R, M>(
    mut image_reader: R,
    mut mask_reader: M,
    label: u32,
    config: &ExtractionConfig,
) -> Result<ExtractionResult>
where
    R: AsyncRead + Unpin,
    M: AsyncRead + Unpin,
{
    let mut image_buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut image_reader, &mut image_buffer).await?;
    let mut mask_buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut mask_reader, &mut mask_buffer).await?;

    extract_part_from_bytes(&image_buffer, &mask_buffer, label, config)
}
