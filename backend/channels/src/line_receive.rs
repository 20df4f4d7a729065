//! LINE Webhook Receiver
//!
//! Signature validation and event deserialization for inbound webhook
//! deliveries.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use kokoro_core::{InboundEvent, KokoroError, MessageKind};

/// Header carrying the base64 HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing X-Line-Signature header")]
    Missing,
    #[error("signature is not valid base64")]
    Encoding,
    #[error("signature does not match request body")]
    Mismatch,
}

/// Check `signature` against HMAC-SHA256(`channel_secret`, `body`).
///
/// Comparison is constant-time.
pub fn verify_signature(
    channel_secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::Missing)?;
    let expected = STANDARD
        .decode(signature)
        .map_err(|_| SignatureError::Encoding)?;

    let mut mac = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| SignatureError::Mismatch)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

#[derive(Deserialize)]
struct LineWebhook {
    #[serde(default)]
    events: Vec<LineEvent>,
}

#[derive(Deserialize)]
struct LineEvent {
    #[serde(rename = "type")]
    event_type: String,
    message: Option<LineMessage>,
    source: Option<LineSource>,
    #[serde(rename = "replyToken")]
    reply_token: Option<String>,
}

#[derive(Deserialize)]
struct LineMessage {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct LineSource {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Parse a webhook envelope into message events.
///
/// Non-message events (follow, unfollow, postback, ...) and message events
/// without a reply token are dropped.
pub fn parse_events(body: &[u8]) -> Result<Vec<InboundEvent>, KokoroError> {
    let payload: LineWebhook = serde_json::from_slice(body)
        .map_err(|e| KokoroError::MalformedPayload(e.to_string()))?;

    let events = payload
        .events
        .into_iter()
        .filter_map(|ev| {
            if ev.event_type != "message" {
                debug!(event_type = %ev.event_type, "Skipping non-message LINE event");
                return None;
            }
            let message = ev.message?;
            let reply_token = ev.reply_token?;
            let sender_id = ev.source.and_then(|s| s.user_id).unwrap_or_default();
            let message_kind = MessageKind::from_wire(&message.kind);
            let text = match message_kind {
                MessageKind::Text => message.text,
                _ => None,
            };
            Some(InboundEvent {
                reply_token,
                sender_id,
                message_kind,
                text,
            })
        })
        .collect();

    Ok(events)
}
