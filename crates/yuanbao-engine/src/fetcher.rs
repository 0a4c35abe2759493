use std::time::Duration;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, StatusCode};
use tracing::{debug, error, warn};

use crate::http::{build_http_client, transport_error_text, IMAGE_ACCEPT};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Bodies of this size or smaller are treated as error pages, not images.
pub const MIN_IMAGE_BYTES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub source_url: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDownload {
    Fetched(ImageAsset),
    /// The host answered, but not with something that looks like an image.
    Rejected(String),
    Failed(String),
}

impl ImageDownload {
    pub fn into_asset(self) -> Option<ImageAsset> {
        match self {
            ImageDownload::Fetched(asset) => Some(asset),
            ImageDownload::Rejected(_) | ImageDownload::Failed(_) => None,
        }
    }
}

pub fn check_payload(url: &str, bytes: Vec<u8>) -> ImageDownload {
    if bytes.len() <= MIN_IMAGE_BYTES {
        return ImageDownload::Rejected(format!(
            "payload too small to be an image: {} bytes",
            bytes.len()
        ));
    }
    ImageDownload::Fetched(ImageAsset {
        source_url: url.to_string(),
        bytes,
    })
}

#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: HttpClient,
    verify_tls: bool,
    timeout: Duration,
}

impl ImageFetcher {
    pub fn new(verify_tls: bool) -> Result<Self> {
        Ok(Self {
            http: build_http_client(verify_tls)?,
            verify_tls,
            timeout: FETCH_TIMEOUT,
        })
    }

    pub fn verifies_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn fetch(&self, url: &str) -> ImageDownload {
        let response = match self
            .http
            .get(url)
            .header(ACCEPT, IMAGE_ACCEPT)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let reason = transport_error_text(&err);
                error!(%url, %reason, "image download failed");
                return ImageDownload::Failed(reason);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "image download returned non-200 status");
            return ImageDownload::Rejected(format!("unexpected status {}", status.as_u16()));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                let reason = transport_error_text(&err);
                error!(%url, %reason, "image body read failed");
                return ImageDownload::Failed(reason);
            }
        };

        let download = check_payload(url, bytes);
        match &download {
            ImageDownload::Fetched(asset) => debug!(%url, bytes = asset.bytes.len(), "image downloaded"),
            ImageDownload::Rejected(reason) | ImageDownload::Failed(reason) => {
                warn!(%url, %reason, "image download rejected")
            }
        }
        download
    }
}
