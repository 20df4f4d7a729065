use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error, warn};

use kokoro_core::ConversationLog;

use crate::store::ConversationStore;

/// Conversation log kept as one pretty-printed JSON file.
///
/// Every save writes its own uniquely named sibling temp file and renames it
/// over the target, so a reader never observes a half-written log and
/// overlapping saves resolve to whichever rename lands last.
///
/// A file that exists but does not parse as a log is copied to
/// `<file>.bak` before it is treated as empty, since the next append will
/// overwrite it.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_name(&self) -> std::ffi::OsString {
        self.path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "chat_history.json".into())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = std::ffi::OsString::from(".");
        name.push(self.file_name());
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.file_name();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    async fn back_up_unparsable(&self) {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup).await {
            Ok(_) => warn!(backup = %backup.display(), "Copied unparsable history aside"),
            Err(e) => error!(backup = %backup.display(), error = %e, "Failed to back up unparsable history"),
        }
    }
}

#[async_trait]
impl ConversationStore for JsonFileStore {
    async fn load(&self) -> ConversationLog {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "History file unreadable; starting empty");
                return ConversationLog::new();
            }
        };

        let content = raw.trim();
        if content.is_empty() {
            return ConversationLog::new();
        }

        match serde_json::from_str(content) {
            Ok(log) => log,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "History file is not a valid log; treating as empty");
                self.back_up_unparsable().await;
                ConversationLog::new()
            }
        }
    }

    async fn save(&self, log: &ConversationLog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(log).context("Failed to serialize history")?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write temp history: {}", tmp_path.display()))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| {
                format!("Failed to rename temp history to: {}", self.path.display())
            });
        }

        debug!(path = %self.path.display(), participants = log.len(), "Saved history");
        Ok(())
    }
}
