//! Environment variable handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes
//!   to a literal `${VAR}`.
//! - Well-known variables (`LINE_CHANNEL_SECRET`, ...) that override the
//!   corresponding config field outright.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::KokoroConfig;

/// Matches `${VAR}` and the escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. Returns an error if any referenced
/// env var is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply well-known environment overrides from the process environment.
pub fn apply_env_overrides(config: KokoroConfig) -> KokoroConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply well-known environment overrides from `env`. Empty values are ignored.
pub fn apply_env_overrides_with(
    mut config: KokoroConfig,
    env: &HashMap<String, String>,
) -> KokoroConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(v) = get("LINE_CHANNEL_SECRET") {
        config.line.channel_secret = Some(v);
    }
    if let Some(v) = get("LINE_CHANNEL_ACCESS_TOKEN") {
        config.line.channel_access_token = Some(v);
    }
    if let Some(v) = get("AZURE_LANGUAGE_ENDPOINT") {
        config.azure_language.endpoint = Some(v);
    }
    if let Some(v) = get("AZURE_LANGUAGE_API_KEY") {
        config.azure_language.api_key = Some(v);
    }
    if let Some(v) = get("GEMINI_API_KEY") {
        config.gemini.api_key = Some(v);
    }
    if let Some(v) = get("KOKORO_BIND") {
        config.server.bind = Some(v);
    }
    if let Some(port) = get("KOKORO_PORT").and_then(|p| p.parse().ok()) {
        config.server.port = Some(port);
    }
    if let Some(v) = get("KOKORO_HISTORY_FILE") {
        config.history.path = Some(v);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"apiKey": "${GEMINI_API_KEY}"});
        let env = env(&[("GEMINI_API_KEY", "AIza-abc123")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["apiKey"], "AIza-abc123");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"line": {"channelSecret": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MISSING_VAR"));
        assert!(msg.contains("line.channelSecret"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"key": "$${NOT_A_VAR}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "${NOT_A_VAR}");
    }

    #[test]
    fn substitutes_inside_larger_string() {
        let v = json!({"endpoint": "https://${AZ_NAME}.cognitiveservices.azure.com/"});
        let env = env(&[("AZ_NAME", "kokoro")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["endpoint"], "https://kokoro.cognitiveservices.azure.com/");
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = KokoroConfig::default();
        config.line.channel_secret = Some("from-file".into());
        let env = env(&[
            ("LINE_CHANNEL_SECRET", "from-env"),
            ("KOKORO_PORT", "8081"),
            ("GEMINI_API_KEY", ""),
        ]);
        let config = apply_env_overrides_with(config, &env);
        assert_eq!(config.line.channel_secret.as_deref(), Some("from-env"));
        assert_eq!(config.server.port, Some(8081));
        assert!(config.gemini.api_key.is_none());
    }
}
