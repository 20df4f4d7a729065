use std::collections::BTreeMap;
use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp layout written into every record (local time, microseconds).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Who produced a logged message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// One entry of the conversation log. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationRecord {
    pub role: Role,
    pub message: String,
    pub timestamp: String,
}

impl ConversationRecord {
    /// Create a record stamped with the current local time.
    pub fn now(role: Role, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::now(Role::User, message)
    }

    pub fn bot(message: impl Into<String>) -> Self {
        Self::now(Role::Bot, message)
    }
}

/// Participant key → records in chronological order.
pub type ConversationLog = BTreeMap<String, Vec<ConversationRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_lowercase_role() {
        let record = ConversationRecord {
            role: Role::Bot,
            message: "Hi there".into(),
            timestamp: "2024-05-01T10:00:00.000000".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["role"], "bot");
        assert_eq!(json["message"], "Hi there");
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let record = ConversationRecord::user("hello");
        assert!(
            chrono::NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok(),
            "unexpected timestamp {}",
            record.timestamp
        );
        assert_eq!(record.role, Role::User);
    }
}
