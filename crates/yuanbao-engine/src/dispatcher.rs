//! Per-message orchestration.
//!
//! A matched message moves strictly forward through
//! `Matched -> Acknowledged -> Fetching -> Relaying -> Done`. Every image is
//! relayed as soon as it is downloaded, and the message is claimed whether or
//! not anything was relayed.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::{debug, error, info, warn};
use yuanbao_contracts::chat::{match_message, DrawRequest};
use yuanbao_contracts::config::PluginConfig;
use yuanbao_contracts::messages::{Propagation, TextMessage};

use crate::api::ImageRequestClient;
use crate::fetcher::ImageFetcher;
use crate::host::ChatHost;

pub const FAILURE_NOTICE: &str = "😔 绘画生成失败，请稍后再试。";

pub fn acknowledgement(request: &DrawRequest) -> String {
    match request.style.as_deref().filter(|style| !style.is_empty()) {
        Some(style) => format!("🎨 正在绘制'{}'，风格：{}，请稍候...", request.prompt, style),
        None => format!("🎨 正在绘制'{}'，请稍候...", request.prompt),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawReport {
    pub request: DrawRequest,
    pub urls: usize,
    pub relayed: usize,
    pub failure_notified: bool,
}

impl DrawReport {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "prompt": self.request.prompt,
            "style": self.request.style,
            "urls": self.urls,
            "relayed": self.relayed,
            "failure_notified": self.failure_notified,
        })
    }
}

pub struct DrawPlugin {
    config: Arc<PluginConfig>,
    api: ImageRequestClient,
    fetcher: ImageFetcher,
}

impl DrawPlugin {
    pub fn new(config: Arc<PluginConfig>) -> Result<Self> {
        let api = ImageRequestClient::new(Arc::clone(&config))?;
        let fetcher = ImageFetcher::new(config.verify_tls)?;
        Ok(Self::from_parts(config, api, fetcher))
    }

    pub fn from_parts(
        config: Arc<PluginConfig>,
        api: ImageRequestClient,
        fetcher: ImageFetcher,
    ) -> Self {
        Self {
            config,
            api,
            fetcher,
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Host entry point for text messages.
    pub async fn handle_text(&self, host: &dyn ChatHost, message: &TextMessage) -> Propagation {
        if !self.config.enabled {
            return Propagation::Continue;
        }
        let Some(request) = match_message(message, &self.config) else {
            return Propagation::Continue;
        };
        self.dispatch(host, &message.from_wxid, request).await;
        Propagation::Stop
    }

    pub async fn dispatch(
        &self,
        host: &dyn ChatHost,
        recipient: &str,
        request: DrawRequest,
    ) -> DrawReport {
        info!(
            recipient,
            prompt = %request.prompt,
            style = request.style(),
            "drawing request received"
        );

        if let Err(err) = host.send_text(recipient, &acknowledgement(&request)).await {
            warn!(recipient, error = %format!("{err:#}"), "acknowledgement send failed");
        }

        let urls = self
            .api
            .request_images(&request.prompt, request.style.as_deref())
            .await
            .into_urls();

        let mut relayed = 0usize;
        for url in &urls {
            let Some(asset) = self.fetcher.fetch(url).await.into_asset() else {
                continue;
            };
            match host.send_image(recipient, &asset.to_base64()).await {
                Ok(()) => {
                    relayed += 1;
                    info!(recipient, %url, "image relayed");
                }
                Err(err) => {
                    error!(recipient, %url, error = %format!("{err:#}"), "image relay failed");
                }
            }
        }

        let failure_notified = relayed == 0;
        if failure_notified {
            if let Err(err) = host.send_text(recipient, FAILURE_NOTICE).await {
                error!(recipient, error = %format!("{err:#}"), "failure notice send failed");
            }
        }
        debug!(recipient, urls = urls.len(), relayed, "drawing request finished");

        DrawReport {
            request,
            urls: urls.len(),
            relayed,
            failure_notified,
        }
    }
}
