//! Azure AI Language sentiment analysis (Text Analytics v3.1 REST API).
//!
//! One POST per batch; document ids are the batch indices, so results can
//! be returned in input order.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sentiment::{DocumentSentiment, SentimentLabel, SentimentProvider};

pub struct AzureSentimentProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AzureSentimentProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Serialize)]
struct SentimentRequest<'a> {
    documents: Vec<InputDocument<'a>>,
}

#[derive(Serialize)]
struct InputDocument<'a> {
    id: String,
    text: &'a str,
}

#[derive(Deserialize)]
struct SentimentResponse {
    #[serde(default)]
    documents: Vec<AnalyzedDocument>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Deserialize)]
struct AnalyzedDocument {
    id: String,
    sentiment: String,
}

#[derive(Deserialize)]
struct DocumentError {
    id: String,
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Merge analyzed and errored documents back into request order.
fn into_ordered(response: SentimentResponse) -> Vec<DocumentSentiment> {
    let mut results: Vec<(usize, DocumentSentiment)> = response
        .documents
        .into_iter()
        .map(|d| {
            (
                d.id.parse().unwrap_or(usize::MAX),
                DocumentSentiment::Analyzed {
                    id: d.id,
                    sentiment: SentimentLabel::new(d.sentiment),
                },
            )
        })
        .chain(response.errors.into_iter().map(|e| {
            (
                e.id.parse().unwrap_or(usize::MAX),
                DocumentSentiment::Error {
                    id: e.id,
                    message: format!("{}: {}", e.error.code, e.error.message),
                },
            )
        }))
        .collect();
    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, r)| r).collect()
}

#[async_trait]
impl SentimentProvider for AzureSentimentProvider {
    fn name(&self) -> &str {
        "azure-language"
    }

    async fn analyze(
        &self,
        documents: &[String],
        opinion_mining: bool,
    ) -> Result<Vec<DocumentSentiment>> {
        let body = SentimentRequest {
            documents: documents
                .iter()
                .enumerate()
                .map(|(i, text)| InputDocument {
                    id: i.to_string(),
                    text,
                })
                .collect(),
        };

        debug!(documents = documents.len(), opinion_mining, "Sending sentiment request");

        let response = self
            .client
            .post(format!("{}/text/analytics/v3.1/sentiment", self.endpoint))
            .query(&[("opinionMining", opinion_mining)])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Sentiment HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Sentiment backend returned {}: {}", status, error_body);
        }

        let decoded: SentimentResponse = response
            .json()
            .await
            .context("Failed to parse sentiment response")?;

        Ok(into_ordered(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn provider(server: &mockito::ServerGuard) -> AzureSentimentProvider {
        AzureSentimentProvider::new(format!("{}/", server.url()), "az-key", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_analyze_single_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/text/analytics/v3.1/sentiment")
            .match_query(Matcher::UrlEncoded("opinionMining".into(), "true".into()))
            .match_header("Ocp-Apim-Subscription-Key", "az-key")
            .match_body(Matcher::Json(json!({
                "documents": [{ "id": "0", "text": "今天好開心" }]
            })))
            .with_status(200)
            .with_body(
                json!({
                    "documents": [{ "id": "0", "sentiment": "positive", "sentences": [] }],
                    "errors": [],
                    "modelVersion": "2024-03-01"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let results = provider(&server)
            .analyze(&["今天好開心".to_string()], true)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(
            results,
            vec![DocumentSentiment::Analyzed {
                id: "0".into(),
                sentiment: SentimentLabel::new("positive"),
            }]
        );
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/text/analytics/v3.1/sentiment")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("denied")
            .create_async()
            .await;

        let err = provider(&server)
            .analyze(&["x".to_string()], true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_errors_merged_in_request_order() {
        let response: SentimentResponse = serde_json::from_value(json!({
            "documents": [{ "id": "1", "sentiment": "negative" }],
            "errors": [{ "id": "0", "error": { "code": "InvalidArgument", "message": "empty" } }]
        }))
        .unwrap();
        let ordered = into_ordered(response);
        assert!(ordered[0].is_error());
        assert!(!ordered[1].is_error());
    }
}
