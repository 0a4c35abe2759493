use anyhow::Result;
use async_trait::async_trait;

/// Outbound side of the chat host the plugin is mounted in.
#[async_trait]
pub trait ChatHost: Send + Sync {
    async fn send_text(&self, target: &str, text: &str) -> Result<()>;

    /// `image_base64` is the standard-alphabet encoding of the raw image bytes.
    async fn send_image(&self, target: &str, image_base64: &str) -> Result<()>;
}
