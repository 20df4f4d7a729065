pub mod generator;
pub mod providers;

pub use generator::{GenerationSettings, ResponseGenerator, FALLBACK_REPLY};
pub use providers::gemini::GeminiProvider;
pub use providers::mock::MockProvider;
