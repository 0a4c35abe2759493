use std::error::Error as _;

use anyhow::{Context, Result};
use reqwest::Client as HttpClient;

/// The drawing API rejects requests that do not look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
pub const API_ACCEPT: &str = "application/json, text/plain, */*";
pub const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

pub(crate) fn build_http_client(verify_tls: bool) -> Result<HttpClient> {
    HttpClient::builder()
        .user_agent(BROWSER_USER_AGENT)
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .context("failed building HTTP client")
}

pub(crate) fn transport_error_text(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    let mut text = format!("{kind}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !cause_text.trim().is_empty() && !text.ends_with(cause_text.as_str()) {
            text.push_str(" | caused by: ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    truncate_text(&text, 512)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
