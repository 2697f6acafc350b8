//! Model service settings read from the environment.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Default timeout for a single explanation request (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "EXPLAIN_COMMITS_BASE_URL";
pub const MODEL_ENV_VAR: &str = "EXPLAIN_COMMITS_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "EXPLAIN_COMMITS_TIMEOUT";

/// Connection settings for the chat-completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainerConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            temperature: 0.2,
        }
    }
}

impl ExplainerConfig {
    /// Read settings from environment variables, using defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: non_empty_var(API_KEY_ENV_VAR),
            base_url: non_empty_var(BASE_URL_ENV_VAR).unwrap_or(defaults.base_url),
            model: non_empty_var(MODEL_ENV_VAR).unwrap_or(defaults.model),
            timeout: get_timeout(),
            temperature: defaults.temperature,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get the configured timeout duration.
///
/// Logs a warning if the environment variable is set but is not a
/// non-negative integer.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_timeout_default() {
        temp_env::with_var_unset(TIMEOUT_ENV_VAR, || {
            assert_eq!(get_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_get_timeout_from_env() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("45"), || {
            assert_eq!(get_timeout(), Duration::from_secs(45));
        });
    }

    #[test]
    fn test_get_timeout_invalid_env_uses_default() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("soon"), || {
            assert_eq!(get_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_from_env_reads_all_settings() {
        temp_env::with_vars(
            [
                (API_KEY_ENV_VAR, Some("sk-test")),
                (BASE_URL_ENV_VAR, Some("http://localhost:8080/v1/")),
                (MODEL_ENV_VAR, Some("local-model")),
                (TIMEOUT_ENV_VAR, Some("10")),
            ],
            || {
                let config = ExplainerConfig::from_env();
                assert_eq!(config.api_key.as_deref(), Some("sk-test"));
                assert_eq!(config.model, "local-model");
                assert_eq!(config.timeout, Duration::from_secs(10));
                assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
            },
        );
    }

    #[test]
    fn test_from_env_blank_values_fall_back() {
        temp_env::with_vars(
            [
                (API_KEY_ENV_VAR, Some("  ")),
                (BASE_URL_ENV_VAR, None),
                (MODEL_ENV_VAR, Some("")),
                (TIMEOUT_ENV_VAR, None),
            ],
            || {
                let config = ExplainerConfig::from_env();
                assert!(config.api_key.is_none());
                assert_eq!(config.base_url, DEFAULT_BASE_URL);
                assert_eq!(config.model, DEFAULT_MODEL);
            },
        );
    }
}
