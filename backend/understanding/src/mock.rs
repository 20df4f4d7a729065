use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::sentiment::{DocumentSentiment, SentimentLabel, SentimentProvider};

/// Sentiment provider returning a fixed result set.
pub struct MockSentimentProvider {
    results: Option<Vec<DocumentSentiment>>,
}

impl MockSentimentProvider {
    /// Every document is analyzed as `label`.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            results: Some(vec![DocumentSentiment::Analyzed {
                id: "0".to_string(),
                sentiment: SentimentLabel::new(label),
            }]),
        }
    }

    pub fn with_results(results: Vec<DocumentSentiment>) -> Self {
        Self {
            results: Some(results),
        }
    }

    pub fn failing() -> Self {
        Self { results: None }
    }
}

#[async_trait]
impl SentimentProvider for MockSentimentProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(
        &self,
        _documents: &[String],
        _opinion_mining: bool,
    ) -> Result<Vec<DocumentSentiment>> {
        match &self.results {
            Some(results) => Ok(results.clone()),
            None => bail!("mock sentiment failure"),
        }
    }
}
