use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::message::ReplyMessage;

/// Trait for generative-language backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "mock").
    fn name(&self) -> &str;

    /// Send a completion request and return the generated text.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError>;
}

/// Trait for whatever delivers replies back to the messaging platform.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Reply once using a single-use reply token.
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<()>;
}

/// Harm categories understood by the generative backend's safety filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
        HarmCategory::HarmCategoryDangerousContent,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: SafetyThreshold,
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub safety: Vec<SafetySetting>,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safety_setting_wire_names() {
        let setting = SafetySetting {
            category: HarmCategory::HarmCategoryHateSpeech,
            threshold: SafetyThreshold::BlockNone,
        };
        let value = serde_json::to_value(setting).unwrap();
        assert_eq!(value["category"], "HARM_CATEGORY_HATE_SPEECH");
        assert_eq!(value["threshold"], "BLOCK_NONE");
    }
}
