//! Asynchronous image loading with last-write-wins ordering
//!
//! Each `begin` call bumps a generation token and spawns a fetch+decode task
//! on the tokio runtime. Completions come back over a channel and are drained
//! once per frame; a completion whose generation is older than the most
//! recent `begin` is discarded, so rapid source changes can never regress the
//! displayed surface to an earlier image. Load failures are logged and
//! absorbed — the previous surface stays visible.

use anyhow::{Context, Result};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::constants::net::{LOAD_TIMEOUT_SECS, MAX_IMAGE_DIMENSION};

/// Decoded pixel data, natural dimensions, RGBA8
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

struct LoadResult {
    generation: u64,
    url: String,
    outcome: Result<DecodedImage>,
}

pub struct ImageLoader {
    runtime: tokio::runtime::Handle,
    client: reqwest::Client,
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
    generation: u64,
}

impl ImageLoader {
    pub fn new(runtime: tokio::runtime::Handle) -> Result<Self> {
        // Fetched anonymously: no cookie store, no auth headers attached
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LOAD_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client for image loading")?;

        let (tx, rx) = mpsc::channel();

        Ok(Self {
            runtime,
            client,
            tx,
            rx,
            generation: 0,
        })
    }

    /// Start loading a new source. Returns the generation token assigned to
    /// this load; any in-flight older load becomes stale immediately.
    pub fn begin(&mut self, url: &str) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        info!(generation, url = %url, "Starting image load");

        let client = self.client.clone();
        let tx = self.tx.clone();
        let url = url.to_string();

        self.runtime.spawn(async move {
            let outcome = fetch_and_decode(&client, &url).await;
            // The viewer may already be gone; a dead channel is not an error
            let _ = tx.send(LoadResult {
                generation,
                url,
                outcome,
            });
        });

        generation
    }

    /// Drain completed loads. Returns the decoded image for the current
    /// generation if one arrived; stale and failed completions are absorbed.
    pub fn poll(&mut self) -> Option<DecodedImage> {
        let mut ready = None;
        while let Ok(result) = self.rx.try_recv() {
            if let Some(image) = self.accept(result) {
                ready = Some(image);
            }
        }
        ready
    }

    fn accept(&self, result: LoadResult) -> Option<DecodedImage> {
        if result.generation != self.generation {
            debug!(
                generation = result.generation,
                current = self.generation,
                url = %result.url,
                "Discarding stale image load"
            );
            return None;
        }
        match result.outcome {
            Ok(image) => {
                info!(
                    url = %result.url,
                    width = image.width,
                    height = image.height,
                    "Image loaded"
                );
                Some(image)
            }
            Err(e) => {
                error!(url = %result.url, error = ?e, "Failed to load image");
                None
            }
        }
    }
}

async fn fetch_and_decode(client: &reqwest::Client, url: &str) -> Result<DecodedImage> {
    let bytes = fetch_bytes(client, url).await?;
    decode_bytes(&bytes).with_context(|| format!("Failed to decode image from '{url}'"))
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed for '{url}'"))?
            .error_for_status()
            .with_context(|| format!("Server rejected request for '{url}'"))?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body for '{url}'"))?;
        Ok(bytes.to_vec())
    } else {
        let path = url.strip_prefix("file://").unwrap_or(url);
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image file '{path}'"))
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let decoded = image::load_from_memory(bytes).context("Unsupported or corrupt image data")?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    if width == 0 || height == 0 {
        anyhow::bail!("Image has zero dimension ({width}x{height})");
    }
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        anyhow::bail!(
            "Image dimensions {width}x{height} exceed limit of {MAX_IMAGE_DIMENSION}"
        );
    }

    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
