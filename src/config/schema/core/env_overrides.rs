use super::Config;

/// First non-empty value among the given environment variables.
fn env_value(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = env_value(&["FLOWBRIDGE_WEBHOOK_URL", "N8N_WEBHOOK_URL"]) {
            self.engine.webhook_url = Some(url);
        }

        if let Some(token) = env_value(&["FLOWBRIDGE_WEBHOOK_TOKEN", "N8N_WEBHOOK_TOKEN"]) {
            self.engine.webhook_token = Some(token);
        }

        if let Some(url) = env_value(&["FLOWBRIDGE_API_URL", "N8N_API_URL"]) {
            self.engine.api_url = Some(url);
        }

        if let Some(key) = env_value(&["FLOWBRIDGE_API_KEY", "N8N_API_KEY"]) {
            self.engine.api_key = Some(key);
        }

        if let Some(port_str) = env_value(&["FLOWBRIDGE_GATEWAY_PORT", "PORT"])
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Some(host) = env_value(&["FLOWBRIDGE_GATEWAY_HOST", "HOST"]) {
            self.gateway.host = host;
        }
    }
}
