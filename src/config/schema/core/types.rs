use super::super::{EngineConfig, GatewayConfig, RateLimitConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - resolved at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn validate_http_url(field: &str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::Validation(format!("{field} is not a valid URL ({raw}): {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "{field} must use http or https, got {}",
            url.scheme()
        )));
    }
    Ok(())
}

/// Upper bound for every configured duration. Larger values overflow
/// deadline arithmetic on `Instant` and `chrono::Duration`.
const MAX_DURATION_SECS: u64 = 86_400;

fn check_duration_secs(field: &str, secs: u64) -> Result<(), ConfigError> {
    if secs > MAX_DURATION_SECS {
        return Err(ConfigError::Validation(format!(
            "{field} ({secs}) must not exceed {MAX_DURATION_SECS} seconds"
        )));
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = self.engine.webhook_url() {
            validate_http_url("engine.webhook_url", url)?;
        }
        if let Some((api_url, _)) = self.engine.execution_api() {
            validate_http_url("engine.api_url", api_url)?;
        }

        for (field, secs) in [
            ("engine.initial_timeout_secs", self.engine.initial_timeout_secs),
            ("engine.request_deadline_secs", self.engine.request_deadline_secs),
            ("engine.status_timeout_secs", self.engine.status_timeout_secs),
            ("engine.polling.timeout_secs", self.engine.polling.timeout_secs),
            ("engine.polling.interval_ms", self.engine.polling.interval_ms / 1000),
            ("gateway.request_timeout_secs", self.gateway.request_timeout_secs),
            ("rate_limit.window_secs", self.rate_limit.window_secs),
        ] {
            check_duration_secs(field, secs)?;
        }

        if self.engine.polling.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "engine.polling.max_attempts must be at least 1".into(),
            ));
        }
        if self.engine.initial_timeout_secs == 0 || self.engine.request_deadline_secs == 0 {
            return Err(ConfigError::Validation(
                "engine timeouts must be greater than zero".into(),
            ));
        }
        if self.gateway.request_timeout_secs <= self.engine.request_deadline_secs {
            return Err(ConfigError::Validation(format!(
                "gateway.request_timeout_secs ({}) must exceed engine.request_deadline_secs ({})",
                self.gateway.request_timeout_secs, self.engine.request_deadline_secs
            )));
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Validation(
                "rate_limit.max_requests and rate_limit.window_secs must be greater than zero"
                    .into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.rate_limit.sweep_probability) {
            return Err(ConfigError::Validation(
                "rate_limit.sweep_probability must be within 0.0..=1.0".into(),
            ));
        }

        Ok(())
    }
}
