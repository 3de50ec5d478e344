//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliAlphaMode, CliBounds, CliOutputFormat};
use crate::{
    config::{parse_color, AlphaMode, BoundsConvention, ExtractionConfig, OutputFormat},
    parts::parse_label,
    processor::{ProcessorConfig, ProcessorConfigBuilder},
};
use anyhow::{Context, Result};

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => Self::Png,
            CliOutputFormat::Jpeg => Self::Jpeg,
            CliOutputFormat::Tiff => Self::Tiff,
            CliOutputFormat::Rgba8 => Self::Rgba8,
        }
    }
}

impl From<CliBounds> for BoundsConvention {
    fn from(bounds: CliBounds) -> Self {
        match bounds {
            CliBounds::Inclusive => Self::Inclusive,
            CliBounds::Legacy => Self::Legacy,
        }
    }
}

impl From<CliAlphaMode> for AlphaMode {
    fn from(alpha: CliAlphaMode) -> Self {
        match alpha {
            CliAlphaMode::Discard => Self::Discard,
            CliAlphaMode::Preserve => Self::Preserve,
        }
    }
}

/// Convert CLI arguments to a `ProcessorConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the processor configuration
    ///
    /// Values from `--config` are loaded first; explicit flags override them.
    pub(crate) fn from_cli(cli: &Cli) -> Result<ProcessorConfig> {
        let base = match &cli.config {
            Some(path) => ExtractionConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => ExtractionConfig::default(),
        };

        let mut builder = ExtractionConfig::builder()
            .fill_color(base.fill_color)
            .bounds(base.bounds)
            .alpha(base.alpha)
            .output_format(base.output_format)
            .jpeg_quality(base.jpeg_quality);

        if let Some(fill) = &cli.fill {
            builder = builder.fill_color(parse_color(fill).context("Invalid --fill color")?);
        }
        if let Some(bounds) = cli.bounds {
            builder = builder.bounds(bounds.into());
        }
        if let Some(alpha) = cli.alpha {
            builder = builder.alpha(alpha.into());
        }
        if let Some(format) = cli.format {
            builder = builder.output_format(format.into());
        }
        if let Some(quality) = cli.jpeg_quality {
            builder = builder.jpeg_quality(quality);
        }

        let extraction = builder.build().context("Invalid extraction configuration")?;

        ProcessorConfigBuilder::new()
            .extraction(extraction)
            .build()
            .context("Invalid configuration")
    }

    /// Resolve every `--label` value to a numeric label
    pub(crate) fn labels(cli: &Cli) -> Result<Vec<u32>> {
        cli.label
            .iter()
            .map(|raw| parse_label(raw).with_context(|| format!("Invalid --label '{}'", raw)))
            .collect()
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if cli.image.is_none() || cli.mask.is_none() {
            anyhow::bail!("Both IMAGE and --mask are required");
        }

        if cli.label.is_empty() && !cli.histogram && cli.overlay.is_none() {
            anyhow::bail!("Nothing to do: pass --label, --histogram or --overlay");
        }

        if let Some(quality) = cli.jpeg_quality {
            if quality > 100 {
                anyhow::bail!("JPEG quality must be 0-100, got {}", quality);
            }
        }

        if cli.label.len() > 1 && cli.output.as_deref() == Some("-") {
            anyhow::bail!("Writing to stdout requires exactly one --label");
        }

        Self::labels(cli)?;
        if let Some(fill) = &cli.fill {
            parse_color(fill).context("Invalid --fill color")?;
        }

        Ok(())
    }
}
