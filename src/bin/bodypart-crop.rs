//! Body-part crop CLI tool
//!
//! Command-line interface for extracting labeled body parts from an image
//! and its part mask using the bodypart-crop library.

#[cfg(feature = "cli")]
use bodypart_crop::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
