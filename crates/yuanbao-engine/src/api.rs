//! Drawing API client.
//!
//! One GET per request: `{api_url}?msg=<prompt>&qq=<account>[&fg=<style>]`,
//! answered by an envelope of the form
//! `{"code": 200, "data": [{"url": "..."}, ...]}`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use tracing::{error, info, warn};
use yuanbao_contracts::config::PluginConfig;

use crate::http::{build_http_client, transport_error_text, truncate_text, API_ACCEPT};

pub const API_TIMEOUT: Duration = Duration::from_secs(60);

const LOGGED_BODY_CHARS: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLookup {
    Urls(Vec<String>),
    /// Well-formed success envelope without a single usable URL.
    Empty,
    Failed(String),
}

impl ImageLookup {
    pub fn into_urls(self) -> Vec<String> {
        match self {
            ImageLookup::Urls(urls) => urls,
            ImageLookup::Empty | ImageLookup::Failed(_) => Vec::new(),
        }
    }
}

pub fn build_request_url(
    api_base_url: &str,
    account_id: &str,
    prompt: &str,
    style: Option<&str>,
) -> String {
    let separator = if api_base_url.contains('?') { '&' } else { '?' };
    let mut url = format!(
        "{api_base_url}{separator}msg={}&qq={}",
        urlencoding::encode(prompt),
        urlencoding::encode(account_id)
    );
    if let Some(style) = style.filter(|value| !value.is_empty()) {
        url.push_str("&fg=");
        url.push_str(&urlencoding::encode(style));
    }
    url
}

pub fn parse_envelope(body: &str) -> ImageLookup {
    let payload: Value = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(err) => return ImageLookup::Failed(format!("invalid JSON payload: {err}")),
    };

    let code_ok = payload.get("code").and_then(Value::as_f64) == Some(200.0);
    let Some(data) = payload.get("data").filter(|_| code_ok) else {
        return ImageLookup::Failed(format!(
            "unexpected envelope: {}",
            truncate_text(&payload.to_string(), 512)
        ));
    };
    let Some(rows) = data.as_array() else {
        return ImageLookup::Failed("envelope data is not an array".to_string());
    };

    let urls: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get("url").and_then(Value::as_str))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();
    if urls.is_empty() {
        ImageLookup::Empty
    } else {
        ImageLookup::Urls(urls)
    }
}

#[derive(Debug, Clone)]
pub struct ImageRequestClient {
    config: Arc<PluginConfig>,
    http: HttpClient,
    timeout: Duration,
}

impl ImageRequestClient {
    pub fn new(config: Arc<PluginConfig>) -> Result<Self> {
        let http = build_http_client(config.verify_tls)?;
        Ok(Self {
            config,
            http,
            timeout: API_TIMEOUT,
        })
    }

    pub fn verifies_tls(&self) -> bool {
        self.config.verify_tls
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn request_url(&self, prompt: &str, style: Option<&str>) -> String {
        build_request_url(
            &self.config.api_base_url,
            &self.config.account_id,
            prompt,
            style,
        )
    }

    pub async fn request_images(&self, prompt: &str, style: Option<&str>) -> ImageLookup {
        let url = self.request_url(prompt, style);
        info!(%url, prompt, style = style.unwrap_or(""), "requesting drawing");

        let response = match self
            .http
            .get(&url)
            .header(ACCEPT, API_ACCEPT)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let reason = transport_error_text(&err);
                error!(%url, %reason, "drawing API request failed");
                return ImageLookup::Failed(reason);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            error!(%url, status = status.as_u16(), "drawing API returned non-200 status");
            return ImageLookup::Failed(format!("unexpected status {}", status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                let reason = transport_error_text(&err);
                error!(%url, %reason, "drawing API body read failed");
                return ImageLookup::Failed(reason);
            }
        };
        info!(body = %truncate_text(&body, LOGGED_BODY_CHARS), "drawing API response");

        let lookup = parse_envelope(&body);
        match &lookup {
            ImageLookup::Urls(urls) => info!(count = urls.len(), "extracted image urls"),
            ImageLookup::Empty => warn!("drawing API returned no image urls"),
            ImageLookup::Failed(reason) => error!(%reason, "drawing API returned an error envelope"),
        }
        lookup
    }
}
