//! Conversation log persistence.
//!
//! The log is a single JSON object mapping participant keys to their
//! records. Every mutation is a full load-modify-save cycle; see
//! [`JsonFileStore`] for the consistency caveats.

pub mod json_store;
pub mod store;

pub use json_store::JsonFileStore;
pub use store::ConversationStore;
