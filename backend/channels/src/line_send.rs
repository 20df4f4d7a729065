//! LINE Senders
//!
//! Request bodies for the Reply API.

use serde::Serialize;

use kokoro_core::ReplyMessage;

/// LINE accepts at most five message objects per reply.
pub const MAX_REPLY_MESSAGES: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: &'a [ReplyMessage],
}

impl<'a> ReplyRequest<'a> {
    pub fn new(reply_token: &'a str, messages: &'a [ReplyMessage]) -> Self {
        let messages = &messages[..messages.len().min(MAX_REPLY_MESSAGES)];
        Self {
            reply_token,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_request_shape() {
        let messages = vec![ReplyMessage::Location {
            title: "Mask Map".into(),
            address: "花蓮".into(),
            latitude: 23.601916,
            longitude: 121.5189989,
        }];
        let value = serde_json::to_value(ReplyRequest::new("tok", &messages)).unwrap();
        assert_eq!(
            value,
            json!({
                "replyToken": "tok",
                "messages": [{
                    "type": "location",
                    "title": "Mask Map",
                    "address": "花蓮",
                    "latitude": 23.601916,
                    "longitude": 121.5189989
                }]
            })
        );
    }

    #[test]
    fn test_reply_request_caps_message_count() {
        let messages: Vec<_> = (0..7).map(|i| ReplyMessage::text(i.to_string())).collect();
        assert_eq!(ReplyRequest::new("tok", &messages).messages.len(), MAX_REPLY_MESSAGES);
    }
}
