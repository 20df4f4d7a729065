pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{GenerationError, KokoroError};
pub use event::{InboundEvent, MessageKind};
pub use message::ReplyMessage;
pub use traits::{
    HarmCategory, LlmProvider, LlmRequest, LlmResponse, ReplySender, SafetySetting,
    SafetyThreshold,
};
pub use types::{ConversationLog, ConversationRecord, Role};
