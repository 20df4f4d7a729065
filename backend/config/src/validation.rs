//! Config validation: checks with user-friendly error messages.
//!
//! Errors are fatal at startup; warnings are logged and the affected
//! backend runs degraded (fallback reply, `unknown` sentiment).

use crate::schema::KokoroConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &KokoroConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_line(config, &mut report);
    validate_backends(config, &mut report);
    validate_history(config, &mut report);
    validate_http(config, &mut report);
    report
}

fn validate_line(config: &KokoroConfig, report: &mut ValidationReport) {
    if is_blank(&config.line.channel_secret) {
        report.error(
            "line.channelSecret",
            "Specify LINE_CHANNEL_SECRET as environment variable.",
        );
    }
    if is_blank(&config.line.channel_access_token) {
        report.error(
            "line.channelAccessToken",
            "Specify LINE_CHANNEL_ACCESS_TOKEN as environment variable.",
        );
    }
}

fn validate_backends(config: &KokoroConfig, report: &mut ValidationReport) {
    if is_blank(&config.gemini.api_key) {
        report.warn(
            "gemini.apiKey",
            "No Gemini API key; every generated reply will be the fallback text",
        );
    }
    let azure = &config.azure_language;
    if is_blank(&azure.endpoint) || is_blank(&azure.api_key) {
        report.warn(
            "azureLanguage",
            "Azure Language endpoint or key missing; sentiment will be 'unknown'",
        );
    } else if let Some(endpoint) = &azure.endpoint {
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            report.error("azureLanguage.endpoint", "Endpoint must be an http(s) URL");
        }
    }
}

fn validate_history(config: &KokoroConfig, report: &mut ValidationReport) {
    let history = &config.history;
    if history.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
        report.error("history.path", "History path must not be empty");
    }
    for (path, key) in [
        ("history.userKey", &history.user_key),
        ("history.botKey", &history.bot_key),
    ] {
        if key.as_deref().is_some_and(|k| k.is_empty()) {
            report.error(path, "Participant key must not be empty");
        }
    }
    if history.user_key.is_some() && history.user_key == history.bot_key {
        report.warn(
            "history",
            "User and bot keys are identical; both sides share one log entry",
        );
    }
}

fn validate_http(config: &KokoroConfig, report: &mut ValidationReport) {
    if config.http.timeout_secs == Some(0) {
        report.error("http.timeoutSecs", "Timeout must be at least one second");
    }
}
