use crate::core::engine::{DispatchSettings, PollSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection to the remote workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Webhook that starts the chat workflow; unset runs the gateway in mock mode
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Sent as `Authorization: Bearer <token>` on webhook calls
    #[serde(default)]
    pub webhook_token: Option<String>,
    /// Base URL of the execution API, e.g. `https://engine.example.com/api/v1`
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Response header carrying the id of an asynchronously started run
    #[serde(default = "default_execution_id_header")]
    pub execution_id_header: String,
    /// Budget for the initial webhook call (default: 110s)
    #[serde(default = "default_initial_timeout_secs")]
    pub initial_timeout_secs: u64,
    /// Budget for a whole dispatch, polling included (default: 240s)
    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,
    /// Budget for one execution status query (default: 30s)
    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_header() -> String {
    "X-N8N-API-KEY".into()
}

fn default_execution_id_header() -> String {
    "x-n8n-execution-id".into()
}

fn default_initial_timeout_secs() -> u64 {
    110
}

fn default_request_deadline_secs() -> u64 {
    240
}

fn default_status_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    60
}

fn default_interval_ms() -> u64 {
    2_000
}

fn default_poll_timeout_secs() -> u64 {
    120
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
            timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_token: None,
            api_url: None,
            api_key: None,
            api_key_header: default_api_key_header(),
            execution_id_header: default_execution_id_header(),
            initial_timeout_secs: default_initial_timeout_secs(),
            request_deadline_secs: default_request_deadline_secs(),
            status_timeout_secs: default_status_timeout_secs(),
            polling: PollingConfig::default(),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl EngineConfig {
    pub fn webhook_url(&self) -> Option<&str> {
        non_empty(self.webhook_url.as_ref())
    }

    pub fn webhook_token(&self) -> Option<&str> {
        non_empty(self.webhook_token.as_ref())
    }

    /// Base URL and API key, when both are set.
    pub fn execution_api(&self) -> Option<(&str, &str)> {
        Some((
            non_empty(self.api_url.as_ref())?,
            non_empty(self.api_key.as_ref())?,
        ))
    }

    pub fn is_mock(&self) -> bool {
        self.webhook_url().is_none()
    }

    pub fn initial_timeout(&self) -> Duration {
        Duration::from_secs(self.initial_timeout_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            max_attempts: self.polling.max_attempts,
            interval: Duration::from_millis(self.polling.interval_ms),
            timeout: Duration::from_secs(self.polling.timeout_secs),
        }
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            request_deadline: Duration::from_secs(self.request_deadline_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_budgets() {
        let config = EngineConfig::default();
        assert!(config.is_mock());
        assert!(config.execution_api().is_none());
        assert_eq!(config.initial_timeout(), Duration::from_secs(110));
        assert_eq!(config.poll_settings(), PollSettings::default());
        assert_eq!(
            config.dispatch_settings().request_deadline,
            Duration::from_secs(240)
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = EngineConfig {
            webhook_url: Some("   ".into()),
            api_url: Some("https://engine.example.com/api/v1".into()),
            api_key: Some(String::new()),
            ..EngineConfig::default()
        };
        assert!(config.is_mock());
        assert!(config.execution_api().is_none());
    }

    #[test]
    fn polling_section_parses_from_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            webhook_url = "https://engine.example.com/webhook/chat"

            [polling]
            max_attempts = 5
            interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(
            config.webhook_url(),
            Some("https://engine.example.com/webhook/chat")
        );
        let poll = config.poll_settings();
        assert_eq!(poll.max_attempts, 5);
        assert_eq!(poll.interval, Duration::from_millis(250));
        assert_eq!(poll.timeout, Duration::from_secs(120));
    }
}
