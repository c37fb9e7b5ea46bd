//! Configuration structures for the certificate pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{EnovaError, Result};

/// Main configuration for the enova tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnovaConfig {
    /// Certificate lookup API configuration.
    pub api: ApiConfig,

    /// LLM review configuration.
    pub review: ReviewConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Certificate lookup API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Certificate search endpoint.
    pub url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Request pacing.
    pub requests_per_second: f64,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Pause after the server keeps answering 429.
    pub rate_limit_wait_secs: u64,

    /// Retry policy for transient HTTP failures.
    pub retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://api.data.enova.no/ems/offentlige-data/v1/Energiattest".to_string(),
            api_key_env: "ENOVA_API_KEY".to_string(),
            requests_per_second: 2.0,
            timeout_secs: 30,
            rate_limit_wait_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Minimum time between two requests. `None` when the rate has no
    /// representable interval.
    fn checked_interval(&self) -> Option<Duration> {
        if !(self.requests_per_second > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / self.requests_per_second).ok()
    }

    /// Minimum time between two requests.
    pub fn request_interval(&self) -> Duration {
        self.checked_interval().unwrap_or(Duration::ZERO)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit_wait(&self) -> Duration {
        Duration::from_secs(self.rate_limit_wait_secs)
    }
}

/// Retry with exponential backoff on selected HTTP statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Base of the exponential backoff, in seconds.
    pub backoff_factor: f64,

    /// Upper bound of a single backoff, in seconds.
    pub backoff_max_secs: f64,

    /// Statuses worth retrying.
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            backoff_max_secs: 120.0,
            status_forcelist: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Delay before retry number `retry` (1-based). The first retry is immediate.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let secs = (self.backoff_factor * 2f64.powi(retry as i32 - 1))
            .min(self.backoff_max_secs)
            .max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

/// LLM review configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// OpenAI-compatible chat completions endpoint.
    pub endpoint: String,

    /// Model name.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Environment variable holding the LLM API key.
    pub api_key_env: String,

    /// Environment variable holding the geocoding API key.
    pub geocode_key_env: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini-2024-07-18".to_string(),
            temperature: 0.7,
            api_key_env: "OPENAI_API_KEY".to_string(),
            geocode_key_env: "GOOGLE_MAPS_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ReviewConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Keep going when one input fails.
    pub continue_on_error: bool,

    /// Default number of source rows to process (`None` = all).
    pub limit: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            limit: None,
        }
    }
}

impl EnovaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.api.checked_interval().is_none() {
            return Err(EnovaError::Config(
                "api.requests_per_second must be positive and not vanishingly small".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.review.temperature) {
            return Err(EnovaError::Config(
                "review.temperature must be between 0 and 2".to_string(),
            ));
        }
        let retry = &self.api.retry;
        if !(retry.backoff_factor >= 0.0) || !retry.backoff_factor.is_finite() {
            return Err(EnovaError::Config(
                "api.retry.backoff_factor must be a non-negative number".to_string(),
            ));
        }
        if !(retry.backoff_max_secs >= 0.0)
            || Duration::try_from_secs_f64(retry.backoff_max_secs).is_err()
        {
            return Err(EnovaError::Config(
                "api.retry.backoff_max_secs must be a non-negative number of seconds".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_backoff_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::ZERO);
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));

        let capped = RetryPolicy {
            backoff_max_secs: 3.0,
            ..RetryPolicy::default()
        };
        assert_eq!(capped.backoff_delay(5), Duration::from_secs(3));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(429));
        assert!(policy.should_retry(503));
        assert!(!policy.should_retry(404));
    }

    #[test]
    fn test_request_interval() {
        assert_eq!(
            ApiConfig::default().request_interval(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "api": { "requests_per_second": 4.0 } }"#).unwrap();

        let config = EnovaConfig::from_file(&path).unwrap();
        assert_eq!(config.api.requests_per_second, 4.0);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.review, ReviewConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = EnovaConfig::default();
        config.batch.limit = Some(5);
        config.save(&path).unwrap();

        assert_eq!(EnovaConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = EnovaConfig::default();
        config.api.requests_per_second = 0.0;
        assert!(config.validate().is_err());

        let mut config = EnovaConfig::default();
        config.review.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = EnovaConfig::default();
        config.api.retry.backoff_max_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = EnovaConfig::default();
        config.api.requests_per_second = 1e-300;
        assert!(config.validate().is_err());

        let mut config = EnovaConfig::default();
        config.api.retry.backoff_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unrepresentable_durations_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{ "api": { "retry": { "backoff_max_secs": -1.0 } } }"#).unwrap();
        assert!(matches!(
            EnovaConfig::from_file(&path),
            Err(EnovaError::Config(_))
        ));

        std::fs::write(&path, r#"{ "api": { "requests_per_second": 1e-300 } }"#).unwrap();
        assert!(matches!(
            EnovaConfig::from_file(&path),
            Err(EnovaError::Config(_))
        ));
    }

    #[test]
    fn test_duration_helpers_never_panic() {
        let policy = RetryPolicy {
            backoff_max_secs: -1.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_delay(2), Duration::ZERO);

        let api = ApiConfig {
            requests_per_second: 1e-300,
            ..ApiConfig::default()
        };
        assert_eq!(api.request_interval(), Duration::ZERO);
    }
}
