mod core;
mod engine;
mod gateway;
mod rate_limit;

pub use self::core::Config;
pub use engine::{EngineConfig, PollingConfig};
pub use gateway::GatewayConfig;
pub use rate_limit::RateLimitConfig;
