use serde::Serialize;

use super::style_registry::STYLES;
use crate::config::PluginConfig;
use crate::messages::TextMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRequest {
    pub prompt: String,
    pub style: Option<String>,
}

impl DrawRequest {
    pub fn style(&self) -> &str {
        self.style.as_deref().unwrap_or("")
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits `remaining` into prompt and style using the fixed vocabulary.
///
/// The first vocabulary entry found anywhere in the text is removed once,
/// even from the middle of a word.
fn split_style(remaining: &str) -> Option<(&'static str, String)> {
    STYLES.iter().find_map(|style| {
        remaining
            .contains(style)
            .then(|| (*style, remaining.replacen(style, "", 1).trim().to_string()))
    })
}

pub fn parse_draw_request(text: &str, config: &PluginConfig) -> Option<DrawRequest> {
    let content = text.trim();
    if content.is_empty() {
        return None;
    }

    let remaining = config
        .triggers
        .iter()
        .find_map(|trigger| content.strip_prefix(trigger.as_str()))?
        .trim();

    let (prompt, style) = match split_style(remaining) {
        Some((style, prompt)) => (prompt, Some(style.to_string())),
        None => (remaining.to_string(), non_empty(&config.default_style)),
    };

    if prompt.is_empty() {
        return None;
    }
    Some(DrawRequest { prompt, style })
}

/// Matches a host message, rejecting messages without a sender.
pub fn match_message(message: &TextMessage, config: &PluginConfig) -> Option<DrawRequest> {
    if message.from_wxid.trim().is_empty() {
        return None;
    }
    parse_draw_request(&message.content, config)
}
