use serde::{Deserialize, Serialize};

/// Text-message event as delivered by the chat host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    #[serde(rename = "Content", default)]
    pub content: String,
    #[serde(rename = "FromWxid", default)]
    pub from_wxid: String,
}

impl TextMessage {
    pub fn new(from_wxid: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            from_wxid: from_wxid.into(),
        }
    }
}

/// Whether the host should hand the message on to lower-priority handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

impl Propagation {
    pub fn should_continue(self) -> bool {
        matches!(self, Propagation::Continue)
    }
}

impl From<Propagation> for bool {
    fn from(value: Propagation) -> Self {
        value.should_continue()
    }
}
