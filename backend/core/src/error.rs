use thiserror::Error;

/// Failures on the LINE side of the relay.
#[derive(Debug, Error)]
pub enum KokoroError {
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("reply API error: {0}")]
    ReplyFailed(String),
}

/// Why a generation request produced no usable text.
///
/// The router turns any of these into the fixed fallback reply; they are
/// never surfaced to the LINE user.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no generative backend configured")]
    NotConfigured,

    #[error("LLM provider error ({provider}): {message}")]
    Transport { provider: String, message: String },

    #[error("LLM provider ({provider}) timed out")]
    Timeout { provider: String },

    #[error("LLM provider ({provider}) returned {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("response blocked by safety filter: {reason}")]
    Blocked { reason: String },

    #[error("LLM provider ({provider}) returned no text")]
    Empty { provider: String },

    #[error("failed to decode LLM response: {0}")]
    Decode(String),
}

impl GenerationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
