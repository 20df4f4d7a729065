use anyhow::Result;
use async_trait::async_trait;

use kokoro_core::{ConversationLog, ConversationRecord};

/// Abstract interface for the conversation log.
///
/// No method coordinates with concurrent callers: two overlapping
/// `append` calls each load, modify and save the whole log, so the later
/// save wins and the other record is lost.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Read the persisted log. Never fails: a missing, empty or unparsable
    /// backing resource reads as an empty log.
    async fn load(&self) -> ConversationLog;

    /// Replace the persisted log with `log`.
    async fn save(&self, log: &ConversationLog) -> Result<()>;

    /// Append one record under `participant`, creating the key if needed.
    async fn append(&self, participant: &str, record: ConversationRecord) -> Result<()> {
        let mut log = self.load().await;
        log.entry(participant.to_string()).or_default().push(record);
        self.save(&log).await
    }

    /// Replace the log with an empty mapping.
    async fn clear(&self) -> Result<()> {
        self.save(&ConversationLog::new()).await
    }
}
