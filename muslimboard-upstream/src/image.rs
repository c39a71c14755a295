//! Image origin client.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};

use muslimboard_core::{
    ImageFetcher, ImageStream, ImageUrl, MuslimboardError, Result, DEFAULT_UPSTREAM_TIMEOUT_SECS,
    FALLBACK_IMAGE_CONTENT_TYPE,
};

/// Fetches proxied images and hands the body back as a stream.
pub struct ImageClient {
    http_client: reqwest::Client,
}

impl ImageClient {
    /// Creates a client with the default connect timeout.
    pub fn new() -> Result<Self> {
        Self::with_connect_timeout(Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS))
    }

    /// Creates a client with a custom connect timeout.
    ///
    /// Only connecting is bounded; a large image may take as long as it needs
    /// to stream through.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| MuslimboardError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl ImageFetcher for ImageClient {
    #[instrument(skip(self, url), fields(url = %url))]
    async fn fetch_image(&self, url: &ImageUrl) -> Result<ImageStream> {
        let response = self
            .http_client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(|e| MuslimboardError::ImageFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MuslimboardError::ImageFetch(format!(
                "origin answered HTTP {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_IMAGE_CONTENT_TYPE)
            .to_string();

        debug!(%content_type, "streaming image");

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|e| {
                    warn!(error = %e, "image stream interrupted");
                    MuslimboardError::StreamCopy(e.to_string())
                })
            })
            .boxed();

        Ok(ImageStream::new(content_type, body))
    }
}
