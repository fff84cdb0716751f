#![forbid(unsafe_code)]

mod config;
mod constants;
mod detector;
mod events;
mod font;
mod loader;
mod protection;
mod surface;
mod types;
mod viewer;
mod watermark;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::GalleryManifest;

/// Protected gallery viewer: watermark compositing, screenshot deterrence,
/// and focus-loss obscuring for client proofing galleries.
#[derive(Parser, Debug)]
#[command(name = "shutterlock", version, about)]
struct Cli {
    /// Path to a gallery manifest (JSON). Defaults to the manifest under
    /// the user configuration directory.
    #[arg(value_name = "MANIFEST")]
    manifest: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting shutterlock");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let manifest_path = cli.manifest.unwrap_or_else(GalleryManifest::default_path);
    let manifest = GalleryManifest::load(&manifest_path)?;

    viewer::run(manifest, runtime.handle().clone())?;
    Ok(())
}
