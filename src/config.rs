//! LlamaParse connection settings read from the environment.

use std::time::Duration;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "LLAMA_CLOUD_API_KEY";
const BASE_URL_VAR: &str = "LLAMA_CLOUD_BASE_URL";
const JOB_TIMEOUT_VAR: &str = "PDF2X_JOB_TIMEOUT_SECS";
const POLL_INTERVAL_VAR: &str = "PDF2X_POLL_INTERVAL_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.cloud.llamaindex.ai";
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 600; // upload + remote parse per PDF
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

#[derive(Debug, Clone)]
pub struct ParseConfig {
    pub api_key: String,
    pub base_url: String,
    pub job_timeout: Duration,
    pub poll_interval: Duration,
}

impl ParseConfig {
    /// Build the config from environment variables.
    ///
    /// Required:
    /// - `LLAMA_CLOUD_API_KEY`
    ///
    /// Optional:
    /// - `LLAMA_CLOUD_BASE_URL`: default hosted endpoint
    /// - `PDF2X_JOB_TIMEOUT_SECS`: default 600
    /// - `PDF2X_POLL_INTERVAL_SECS`: default 2
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey { var: API_KEY_VAR })?;

        let base_url = std::env::var(BASE_URL_VAR)
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            base_url,
            job_timeout: Duration::from_secs(env_parse_u64(
                JOB_TIMEOUT_VAR,
                DEFAULT_JOB_TIMEOUT_SECS,
            )),
            poll_interval: Duration::from_secs(env_parse_u64(
                POLL_INTERVAL_VAR,
                DEFAULT_POLL_INTERVAL_SECS,
            )),
        })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_u64() {
        std::env::set_var("PDF2X_TEST_PARSE_OK", "17");
        std::env::set_var("PDF2X_TEST_PARSE_BAD", "soon");
        assert_eq!(env_parse_u64("PDF2X_TEST_PARSE_OK", 5), 17);
        assert_eq!(env_parse_u64("PDF2X_TEST_PARSE_BAD", 5), 5);
        assert_eq!(env_parse_u64("PDF2X_TEST_PARSE_UNSET", 5), 5);
    }

    // Single test so the fixed env vars are not mutated concurrently.
    #[test]
    fn test_from_env() {
        std::env::remove_var(API_KEY_VAR);
        let err = ParseConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));

        std::env::set_var(API_KEY_VAR, "   ");
        assert!(ParseConfig::from_env().is_err());

        std::env::set_var(API_KEY_VAR, "llx-test");
        std::env::set_var(BASE_URL_VAR, "https://example.test/");
        std::env::set_var(JOB_TIMEOUT_VAR, "30");
        let config = ParseConfig::from_env().unwrap();
        assert_eq!(config.api_key, "llx-test");
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.job_timeout, Duration::from_secs(30));
        assert_eq!(
            config.poll_interval,
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );

        std::env::remove_var(API_KEY_VAR);
        std::env::remove_var(BASE_URL_VAR);
        std::env::remove_var(JOB_TIMEOUT_VAR);
    }
}
