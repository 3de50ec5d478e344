//! Body-part crop CLI tool
//!
//! Command-line interface for extracting labeled body parts from an image
//! using a precomputed part mask.

use super::config::CliConfigBuilder;
use crate::{
    backends::PrecomputedMaskBackend,
    parts::BodyPart,
    processor::BodyPartProcessor,
    services::{ImageIOService, OutputFormatHandler},
    tracing_config::{events, init_cli_tracing, spans, TracingFormat},
    types::ExtractionResult,
    visualize::OverlayOptions,
    OutputFormat,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use instant::Instant;
use log::info;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, Instrument};

/// Extract labeled body parts into tightly cropped images
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bodypart-crop")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Source image
    #[arg(value_name = "IMAGE", required_unless_present = "list_parts")]
    pub image: Option<PathBuf>,

    /// Part mask image whose red channel holds the label of each pixel
    #[arg(short, long, value_name = "MASK", required_unless_present = "list_parts")]
    pub mask: Option<PathBuf>,

    /// Label to extract, as a number or part name (repeatable)
    #[arg(short, long, value_name = "ID|NAME")]
    pub label: Vec<String>,

    /// Output file for a single label, or directory for several. Use "-" for stdout.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Output format [default: png]
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Fill color for crop cells not covered by the part (name, #rrggbb[aa] or r,g,b[,a])
    #[arg(long, value_name = "COLOR")]
    pub fill: Option<String>,

    /// Crop sizing convention [default: inclusive]
    #[arg(long, value_enum)]
    pub bounds: Option<CliBounds>,

    /// Alpha handling for copied pixels [default: discard]
    #[arg(long, value_enum)]
    pub alpha: Option<CliAlphaMode>,

    /// JPEG quality (0-100) [default: 90]
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// JSON extraction config; explicit flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the rainbow part mask blended over the image to this path
    #[arg(long, value_name = "PATH")]
    pub overlay: Option<PathBuf>,

    /// Print the pixel count of every label present in the mask
    #[arg(long)]
    pub histogram: bool,

    /// List the known body-part labels and exit
    #[arg(long)]
    pub list_parts: bool,

    /// Log output style; json requires the tracing-json feature
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
    Tiff,
    Rgba8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliBounds {
    Inclusive,
    Legacy,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliAlphaMode {
    Discard,
    Preserve,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = init_cli_tracing(cli.verbose, tracing_format(cli.log_format))
        .context("Failed to initialize tracing")?;

    if cli.list_parts {
        list_parts();
        return Ok(());
    }

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;

    run(&cli)
        .instrument(spans::session(&session_id, "precomputed"))
        .await
}

fn tracing_format(format: CliLogFormat) -> TracingFormat {
    match format {
        CliLogFormat::Console => TracingFormat::Console,
        CliLogFormat::Compact => TracingFormat::Compact,
        #[cfg(feature = "tracing-json")]
        CliLogFormat::Json => TracingFormat::Json,
        #[cfg(not(feature = "tracing-json"))]
        CliLogFormat::Json => {
            eprintln!("JSON logging requires the `tracing-json` feature; using console output");
            TracingFormat::Console
        },
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    let labels = CliConfigBuilder::labels(cli)?;

    let image_path = cli.image.as_deref().context("An input image is required")?;
    let mask_path = cli.mask.as_deref().context("A mask image is required")?;

    info!("Input: {}", image_path.display());
    info!("Mask: {}", mask_path.display());
    info!(
        "Bounds: {}, format: {}",
        config.extraction.bounds, config.extraction.output_format
    );
    OutputFormatHandler::validate_for_crop(
        config.extraction.output_format,
        config.extraction.fill_color,
    );

    let backend = PrecomputedMaskBackend::from_file(mask_path);
    let mut processor = BodyPartProcessor::new(config, Box::new(backend))
        .context("Failed to create body-part processor")?;

    let start_time = Instant::now();
    let image = ImageIOService::load_image(image_path)
        .with_context(|| format!("Failed to load image {}", image_path.display()))?;

    if cli.histogram {
        let histogram = processor
            .label_histogram(&image)
            .await
            .context("Failed to compute label histogram")?;
        print_histogram(&histogram);
    }

    if let Some(overlay_path) = &cli.overlay {
        let overlay = processor
            .overlay(&image, &OverlayOptions::default())
            .await
            .context("Failed to render overlay")?;
        ImageIOService::save_image(&overlay, overlay_path, OutputFormat::Png, 100)
            .context("Failed to save overlay")?;
        info!("Overlay written to {}", overlay_path.display());
    }

    if labels.is_empty() {
        return Ok(());
    }

    let format = processor.config().extraction.output_format;
    let quality = processor.config().extraction.jpeg_quality;
    let results = processor
        .extract_labels(&image, &labels)
        .instrument(spans::file_processing(image_path, &format.to_string()))
        .await
        .context("Failed to segment image")?;

    let total = results.len();
    let mut failed = 0usize;
    for (label, result) in results {
        let part_name = BodyPart::from_label(label).map(BodyPart::name);
        let _span = spans::extraction(label, part_name).entered();
        match result {
            Ok(extraction) => {
                if let Some(segmentation_ms) = extraction.timings.segmentation_ms {
                    events::performance_metric("segmentation", segmentation_ms);
                }
                events::performance_metric("extraction", extraction.timings.extraction_ms);
                write_result(
                    &extraction,
                    image_path,
                    cli.output.as_deref(),
                    total > 1,
                    format,
                    quality,
                )?;
            },
            Err(e) => {
                failed += 1;
                events::error_with_context(&e, &format!("label {}", label));
            },
        }
    }

    events::progress(&format!(
        "Extracted {} of {} label(s) in {:.2}s",
        total - failed,
        total,
        start_time.elapsed().as_secs_f64()
    ));

    if failed > 0 {
        anyhow::bail!("{} of {} label(s) could not be extracted", failed, total);
    }
    Ok(())
}

/// Write one extraction according to the `-o` argument
fn write_result(
    result: &ExtractionResult,
    input_path: &Path,
    output: Option<&str>,
    multiple: bool,
    format: OutputFormat,
    quality: u8,
) -> Result<()> {
    info!("{}", result.summary());

    match output {
        Some("-") => {
            let bytes = result.image.to_bytes(format, quality)?;
            write_stdout(&bytes)?;
            debug!(bytes = bytes.len(), "crop written to stdout");
        },
        Some(target) if multiple => {
            let path =
                generate_output_path_with_dir(input_path, Path::new(target), result.label, format);
            result
                .save(&path, format, quality)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            info!("  └─ {}", path.display());
        },
        Some(target) => {
            let path = PathBuf::from(target);
            if format != OutputFormat::Rgba8 && !ImageIOService::is_supported_format(&path) {
                events::warning_with_recommendation(
                    &format!(
                        "Output path {} has no recognized image extension; writing {} anyway",
                        path.display(),
                        format
                    ),
                    &format!(
                        "name the file with a .{} extension",
                        OutputFormatHandler::get_extension(format)
                    ),
                );
            }
            result
                .save(&path, format, quality)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            info!("  └─ {}", path.display());
        },
        None => {
            let path = generate_output_path(input_path, result.label, format);
            result
                .save(&path, format, quality)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            info!("  └─ {}", path.display());
        },
    }
    Ok(())
}

/// Write image data to stdout
fn write_stdout(data: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(data)
        .context("Failed to write image data to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// File-name fragment for a label: the part name when known
fn label_slug(label: u32) -> String {
    BodyPart::from_label(label).map_or_else(
        || format!("label{}", label),
        |part| part.name().to_string(),
    )
}

/// `<dir>/<stem>_<part>.<ext>` next to the input image
fn generate_output_path(input_path: &Path, label: u32, format: OutputFormat) -> PathBuf {
    let dir = input_path.parent().unwrap_or(Path::new("."));
    generate_output_path_with_dir(input_path, dir, label, format)
}

/// `<output_dir>/<stem>_<part>.<ext>`
fn generate_output_path_with_dir(
    input_path: &Path,
    output_dir: &Path,
    label: u32,
    format: OutputFormat,
) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    output_dir.join(format!(
        "{}_{}.{}",
        stem.to_string_lossy(),
        label_slug(label),
        OutputFormatHandler::get_extension(format)
    ))
}

fn print_histogram(histogram: &BTreeMap<u32, usize>) {
    let total: usize = histogram.values().sum();
    println!("Label histogram ({} pixels)", total);
    for (label, count) in histogram {
        let name = BodyPart::from_label(*label).map_or("-", BodyPart::name);
        let share = if total == 0 {
            0.0
        } else {
            *count as f64 / total as f64 * 100.0
        };
        println!("  {:>3}  {:<22} {:>9}  {:5.1}%", label, name, count, share);
    }
}

fn list_parts() {
    println!("Body-part labels");
    for part in BodyPart::ALL {
        let [r, g, b] = part.rainbow_color();
        println!(
            "  {:>2}  {:<22} #{:02x}{:02x}{:02x}",
            part.label(),
            part.name(),
            r,
            g,
            b
        );
    }
}
