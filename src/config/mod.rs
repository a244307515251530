pub mod schema;

pub use schema::{Config, EngineConfig, GatewayConfig, PollingConfig, RateLimitConfig};
