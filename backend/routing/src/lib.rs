pub mod canned;
pub mod router;

pub use canned::CannedReply;
pub use router::{compose_reply, MessageRouter, ParticipantKeys, RouteOutcome};
