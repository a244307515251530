pub mod rate_limit;

pub use rate_limit::{
    AdmissionControl, RateLimitDecision, SlidingWindowLimiter, UNKNOWN_CLIENT, client_identifier,
};
