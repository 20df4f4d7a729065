//! Sentiment classification of user input.
//!
//! The classifier always yields a label: backend failures and responses
//! without a usable document collapse to [`SentimentLabel::unknown`].

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const UNKNOWN: &str = "unknown";

/// Sentiment label as reported by the backend (`positive`, `neutral`,
/// `negative`, `mixed`), or `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentLabel(String);

impl SentimentLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-document result of a batch sentiment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSentiment {
    Analyzed { id: String, sentiment: SentimentLabel },
    Error { id: String, message: String },
}

impl DocumentSentiment {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Remote sentiment backend accepting a batch of documents.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Analyze `documents`; results come back in input order.
    async fn analyze(
        &self,
        documents: &[String],
        opinion_mining: bool,
    ) -> Result<Vec<DocumentSentiment>>;
}

#[derive(Clone)]
pub struct SentimentClassifier {
    provider: Option<Arc<dyn SentimentProvider>>,
}

impl SentimentClassifier {
    pub fn new(provider: Arc<dyn SentimentProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A classifier with no backend; every call yields `unknown`.
    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    /// Label of the first non-error document for a one-document batch.
    pub async fn classify(&self, text: &str) -> SentimentLabel {
        let Some(provider) = &self.provider else {
            warn!("No sentiment backend configured");
            return SentimentLabel::unknown();
        };

        let documents = vec![text.to_string()];
        let results = match provider.analyze(&documents, true).await {
            Ok(results) => results,
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "Sentiment analysis failed");
                return SentimentLabel::unknown();
            }
        };

        for (doc, result) in documents.iter().zip(results.iter()) {
            match result {
                DocumentSentiment::Analyzed { sentiment, .. } => {
                    debug!(document = %doc, sentiment = %sentiment, "Overall sentiment");
                }
                DocumentSentiment::Error { id, message } => {
                    debug!(id = %id, error = %message, "Sentiment document error");
                }
            }
        }

        results
            .into_iter()
            .find_map(|r| match r {
                DocumentSentiment::Analyzed { sentiment, .. } => Some(sentiment),
                DocumentSentiment::Error { .. } => None,
            })
            .unwrap_or_else(|| {
                warn!(provider = provider.name(), "No analyzable sentiment document");
                SentimentLabel::unknown()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockSentimentProvider;

    #[tokio::test]
    async fn test_classify_returns_first_label() {
        let classifier =
            SentimentClassifier::new(Arc::new(MockSentimentProvider::with_label("positive")));
        assert_eq!(classifier.classify("great").await.as_str(), "positive");
    }

    #[tokio::test]
    async fn test_classify_skips_error_documents() {
        let provider = MockSentimentProvider::with_results(vec![
            DocumentSentiment::Error {
                id: "0".into(),
                message: "InvalidDocument".into(),
            },
            DocumentSentiment::Analyzed {
                id: "1".into(),
                sentiment: SentimentLabel::new("neutral"),
            },
        ]);
        let classifier = SentimentClassifier::new(Arc::new(provider));
        assert_eq!(classifier.classify("x").await.as_str(), "neutral");
    }

    #[tokio::test]
    async fn test_all_errors_yield_unknown() {
        let provider = MockSentimentProvider::with_results(vec![DocumentSentiment::Error {
            id: "0".into(),
            message: "InvalidDocument".into(),
        }]);
        let classifier = SentimentClassifier::new(Arc::new(provider));
        assert!(classifier.classify("x").await.is_unknown());
    }

    #[tokio::test]
    async fn test_empty_response_yields_unknown() {
        let classifier =
            SentimentClassifier::new(Arc::new(MockSentimentProvider::with_results(vec![])));
        assert!(classifier.classify("x").await.is_unknown());
    }

    #[tokio::test]
    async fn test_backend_failure_yields_unknown() {
        let classifier = SentimentClassifier::new(Arc::new(MockSentimentProvider::failing()));
        assert!(classifier.classify("x").await.is_unknown());
        assert!(SentimentClassifier::unconfigured().classify("x").await.is_unknown());
    }
}
