use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::{LlmSettings, ANTHROPIC_API_URL};
use crate::matchmaking::emphasis::EmphasisPolicy;
use crate::repository::SimulatedLatency;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub emphasis_policy: EmphasisPolicy,
    pub llm: LlmSettings,
    pub mock_latency: SimulatedLatency,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            emphasis_policy: std::env::var("EMPHASIS_POLICY")
                .ok()
                .map(|raw| raw.parse::<EmphasisPolicy>().map_err(|e| anyhow!(e)))
                .transpose()
                .context("EMPHASIS_POLICY is invalid")?
                .unwrap_or_default(),
            llm: LlmSettings {
                api_url: std::env::var("ANTHROPIC_API_URL")
                    .unwrap_or_else(|_| ANTHROPIC_API_URL.to_string()),
                timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
                max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
                backoff_base: Duration::from_millis(parse_env("LLM_BACKOFF_MS", 1000)?),
            },
            mock_latency: SimulatedLatency {
                read: Duration::from_millis(parse_env("MOCK_READ_DELAY_MS", 0)?),
                write: Duration::from_millis(parse_env("MOCK_WRITE_DELAY_MS", 0)?),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("NEXUS_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("NEXUS_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("NEXUS_TEST_BAD_PORT", 8080).unwrap_err();
        assert!(err.to_string().contains("NEXUS_TEST_BAD_PORT"));
        std::env::remove_var("NEXUS_TEST_BAD_PORT");
    }
}
