//! LINE Messaging API plumbing: webhook signature checks, event parsing and
//! the Reply API client.

pub mod line;
pub mod line_receive;
pub mod line_send;

pub use line::{LineClient, LineConfig};
pub use line_receive::{parse_events, verify_signature, SignatureError, SIGNATURE_HEADER};
pub use line_send::ReplyRequest;
