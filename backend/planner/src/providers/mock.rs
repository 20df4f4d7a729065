use std::sync::Mutex;

use async_trait::async_trait;
use kokoro_core::{GenerationError, LlmProvider, LlmRequest, LlmResponse};

/// A mock LLM provider that returns canned responses.
///
/// Records every prompt it receives so tests can assert on them.
pub struct MockProvider {
    name: String,
    fixed_response: Option<String>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: None,
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Make every call fail with a transport error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// User prompts seen so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, req: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(req.user_prompt.clone());
        }
        if self.fail {
            return Err(GenerationError::Transport {
                provider: self.name.clone(),
                message: "mock failure".to_string(),
            });
        }
        Ok(LlmResponse {
            content: self.fixed_response.clone().unwrap_or_else(|| "Mock response".to_string()),
            provider: self.name.clone(),
            model: "mock".to_string(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}
