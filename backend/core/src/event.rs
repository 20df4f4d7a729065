use serde::{Deserialize, Serialize};

/// Kind of content carried by an inbound LINE message event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Audio,
    File,
    Location,
    Sticker,
    Other(String),
}

impl MessageKind {
    /// Map the wire `message.type` value onto a kind.
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "text" => Self::Text,
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "file" => Self::File,
            "location" => Self::Location,
            "sticker" => Self::Sticker,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A single inbound message, owned by the webhook request that carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// One-time token for the Reply API; expires shortly after delivery.
    pub reply_token: String,
    pub sender_id: String,
    pub message_kind: MessageKind,
    /// Present only for text messages.
    pub text: Option<String>,
}

impl InboundEvent {
    pub fn text(
        reply_token: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            reply_token: reply_token.into(),
            sender_id: sender_id.into(),
            message_kind: MessageKind::Text,
            text: Some(text.into()),
        }
    }

    /// The message text, if this is a text event.
    pub fn text_content(&self) -> Option<&str> {
        match self.message_kind {
            MessageKind::Text => self.text.as_deref(),
            _ => None,
        }
    }
}
