//! Config defaults: applies default values to parsed config.

use crate::schema::KokoroConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HISTORY_PATH: &str = "chat_history.json";
pub const DEFAULT_USER_KEY: &str = "大正妹";
pub const DEFAULT_BOT_KEY: &str = "gemini_bot";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

/// Default timeout for outbound HTTP calls (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: KokoroConfig) -> KokoroConfig {
    let config = apply_server_defaults(config);
    let config = apply_history_defaults(config);
    let config = apply_backend_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: KokoroConfig) -> KokoroConfig {
    config.server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    config.server.port.get_or_insert(DEFAULT_PORT);
    config.http.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_history_defaults(mut config: KokoroConfig) -> KokoroConfig {
    let history = &mut config.history;
    history.path.get_or_insert_with(|| DEFAULT_HISTORY_PATH.to_string());
    history.user_key.get_or_insert_with(|| DEFAULT_USER_KEY.to_string());
    history.bot_key.get_or_insert_with(|| DEFAULT_BOT_KEY.to_string());
    config
}

fn apply_backend_defaults(mut config: KokoroConfig) -> KokoroConfig {
    config
        .gemini
        .model
        .get_or_insert_with(|| DEFAULT_GEMINI_MODEL.to_string());
    config
}

fn apply_logging_defaults(mut config: KokoroConfig) -> KokoroConfig {
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

impl KokoroConfig {
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.server.bind.as_deref().unwrap_or(DEFAULT_BIND),
            self.server.port.unwrap_or(DEFAULT_PORT)
        )
    }

    pub fn history_path(&self) -> &str {
        self.history.path.as_deref().unwrap_or(DEFAULT_HISTORY_PATH)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
