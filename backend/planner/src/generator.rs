use std::sync::Arc;

use tracing::{debug, info};

use kokoro_core::{
    GenerationError, HarmCategory, LlmProvider, LlmRequest, SafetySetting, SafetyThreshold,
};

/// Sent in place of generated text whenever generation fails.
pub const FALLBACK_REPLY: &str = "皆麽奈夫人故障中。";

const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
const DEFAULT_PERSONA: &str = "妳是溫柔的心理醫師，會親切地回答客人的問題。";
const DEFAULT_LANGUAGE_INSTRUCTION: &str = "。請用繁體中文回答";

/// Fixed persona, decoding parameters and safety thresholds for every call.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub persona: String,
    /// Appended verbatim to the user's text.
    pub language_instruction: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub safety: Vec<SafetySetting>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            language_instruction: DEFAULT_LANGUAGE_INSTRUCTION.to_string(),
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            safety: HarmCategory::ALL
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: SafetyThreshold::BlockNone,
                })
                .collect(),
        }
    }
}

impl GenerationSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Produces the natural-language part of a reply.
///
/// Failures are returned to the caller as [`GenerationError`]; substituting
/// [`FALLBACK_REPLY`] is the caller's job.
#[derive(Clone)]
pub struct ResponseGenerator {
    provider: Option<Arc<dyn LlmProvider>>,
    settings: GenerationSettings,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: GenerationSettings) -> Self {
        Self {
            provider: Some(provider),
            settings,
        }
    }

    /// A generator with no backend; every call fails with `NotConfigured`.
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            settings: GenerationSettings::default(),
        }
    }

    fn build_request(&self, user_text: &str) -> LlmRequest {
        LlmRequest {
            model: self.settings.model.clone(),
            system_prompt: self.settings.persona.clone(),
            user_prompt: format!("{}{}", user_text, self.settings.language_instruction),
            max_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            top_k: self.settings.top_k,
            safety: self.settings.safety.clone(),
        }
    }

    pub async fn generate(&self, user_text: &str) -> Result<String, GenerationError> {
        let provider = self.provider.as_ref().ok_or(GenerationError::NotConfigured)?;
        let request = self.build_request(user_text);

        let response = provider.complete(&request).await?;

        debug!(question = %user_text, answer = %response.content, "Generated reply");
        info!(
            provider = %response.provider,
            model = %response.model,
            tokens = response.tokens_used,
            latency_ms = response.latency_ms,
            "Generation complete"
        );
        Ok(response.content)
    }
}
