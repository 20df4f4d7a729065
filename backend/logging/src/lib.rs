//! Structured logging for kokoro.
//!
//! Console output, optional rolling NDJSON files, and redaction of
//! credentials and user identifiers before raw payloads are logged.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
