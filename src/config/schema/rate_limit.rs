use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds (default: 600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Requests admitted per client per window (default: 30)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Fraction of checks that also sweep expired entries (default: 0.01)
    #[serde(default = "default_sweep_probability")]
    pub sweep_probability: f64,
}

fn default_window_secs() -> u64 {
    600
}

fn default_max_requests() -> u32 {
    30
}

fn default_sweep_probability() -> f64 {
    0.01
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            sweep_probability: default_sweep_probability(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}
