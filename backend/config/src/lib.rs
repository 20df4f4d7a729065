//! `kokoro-config`: runtime configuration for the kokoro relay.
//!
//! Provides:
//! - Typed config schema (LINE, Gemini, Azure Language, server, history)
//! - YAML loading with config file discovery
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Default value application
//! - Validation and redaction for safe logging

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::redact;
pub use schema::KokoroConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file, substitute env vars, apply env overrides and defaults.
///
/// Validation is left to the caller so it can run after logging is set up.
pub async fn load_and_prepare(path: &Path) -> Result<KokoroConfig> {
    let raw_config = load_config(path).await?;

    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: KokoroConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    Ok(apply_all_defaults(apply_env_overrides(config)))
}

/// Redacted JSON snapshot of `config`, safe to log or print.
pub fn redacted_snapshot(config: &KokoroConfig) -> Value {
    serde_json::to_value(config)
        .map(|v| redact(&v))
        .unwrap_or(Value::Null)
}
