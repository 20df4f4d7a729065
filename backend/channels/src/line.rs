//! LINE Reply API client.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use kokoro_core::{KokoroError, ReplyMessage, ReplySender};

use crate::line_send::ReplyRequest;

const DEFAULT_API_BASE: &str = "https://api.line.me";

#[derive(Clone)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_secret", &"***")
            .field("channel_access_token", &"***")
            .finish()
    }
}

pub struct LineClient {
    config: LineConfig,
    http: Client,
    api_base: String,
}

impl LineClient {
    pub fn new(config: LineConfig, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            config,
            http,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<()> {
        let body = ReplyRequest::new(reply_token, messages);
        let res = self
            .http
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(&self.config.channel_access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| KokoroError::ReplyFailed(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let err = res.text().await.unwrap_or_default();
            error!(status = %status, body = %err, "[LINE] reply failed");
            return Err(KokoroError::ReplyFailed(format!("{}: {}", status, err)).into());
        }

        let kinds: Vec<&str> = body.messages.iter().map(ReplyMessage::kind).collect();
        info!(messages = ?kinds, "[LINE] Reply sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::ServerGuard) -> LineClient {
        LineClient::new(
            LineConfig {
                channel_secret: "secret".into(),
                channel_access_token: "token".into(),
            },
            Duration::from_secs(5),
        )
        .with_api_base(server.url())
    }

    #[tokio::test]
    async fn test_reply_posts_bearer_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/bot/message/reply")
            .match_header("authorization", "Bearer token")
            .match_body(Matcher::Json(json!({
                "replyToken": "tok",
                "messages": [{ "type": "text", "text": "hi" }]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(&server)
            .reply("tok", &[ReplyMessage::text("hi")])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reply_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/bot/message/reply")
            .with_status(400)
            .with_body(r#"{"message":"Invalid reply token"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .reply("expired", &[ReplyMessage::text("hi")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid reply token"));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = LineConfig {
            channel_secret: "s3cr3t".into(),
            channel_access_token: "t0k3n".into(),
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cr3t"));
        assert!(!printed.contains("t0k3n"));
    }
}
