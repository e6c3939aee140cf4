//! Image loading seam for the document assembler.
//!
//! Export needs each banner/seal image's pixel data and natural dimensions
//! (the footer overlay height comes from the image's aspect ratio). The
//! trait keeps the assembler testable without a network; the production
//! implementation fetches over HTTP and decodes with the `image` crate.

use anyhow::{Context, Result};
use async_trait::async_trait;

/// A decoded image: raw RGB8 pixels plus natural dimensions.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width_px: u32,
    pub height_px: u32,
    pub rgb: Vec<u8>,
}

impl LoadedImage {
    /// Height the image occupies when scaled to `width_mm` preserving its
    /// natural aspect ratio.
    pub fn height_for_width_mm(&self, width_mm: f64) -> f64 {
        width_mm * (self.height_px as f64 / self.width_px as f64)
    }
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetches and decodes the image at `url` (already resolved to absolute).
    async fn fetch(&self, url: &str) -> Result<LoadedImage>;
}

/// Business image URLs are either absolute (external host) or relative
/// same-origin upload paths; relative ones are resolved against the
/// configured upload base.
pub fn resolve_image_url(url: &str, upload_base: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let base = upload_base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

/// Production image source: HTTP fetch + in-memory decode.
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new() -> Self {
        HttpImageSource {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<LoadedImage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching image {url}"))?
            .error_for_status()
            .with_context(|| format!("image request rejected: {url}"))?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("reading image body {url}"))?;

        let decoded = image::load_from_memory(&bytes)
            .with_context(|| format!("decoding image {url}"))?
            .to_rgb8();

        Ok(LoadedImage {
            width_px: decoded.width(),
            height_px: decoded.height(),
            rgb: decoded.into_raw(),
        })
    }
}
