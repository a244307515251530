use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Bucket shared by every caller that arrives without a forwarding header.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Per-client admission control.
///
/// Implementations must make check-and-increment atomic per key.
pub trait AdmissionControl: Send + Sync {
    fn check_and_consume(&self, client_id: &str) -> RateLimitDecision;
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

impl RateLimitEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.reset_at < now
    }
}

/// Fixed-length window counter keyed by client identifier.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    window: Duration,
    max_requests: u32,
    sweep_probability: f64,
}

impl SlidingWindowLimiter {
    pub fn new(window: std::time::Duration, max_requests: u32, sweep_probability: f64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::minutes(10)),
            max_requests,
            sweep_probability: sweep_probability.clamp(0.0, 1.0),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check_and_consume_at(&self, client_id: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if self.sweep_probability > 0.0 && rand::random::<f64>() < self.sweep_probability {
            entries.retain(|_, entry| !entry.is_expired(now));
        }

        let fresh = RateLimitEntry {
            count: 0,
            reset_at: now + self.window,
        };
        let entry = entries.entry(client_id.to_string()).or_insert(fresh);
        if entry.is_expired(now) {
            *entry = fresh;
        }

        if entry.count >= self.max_requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: self.max_requests - entry.count,
            reset_at: entry.reset_at,
        }
    }

    /// Drop every entry whose window has passed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .retain(|_, entry| !entry.is_expired(now));
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl AdmissionControl for SlidingWindowLimiter {
    fn check_and_consume(&self, client_id: &str) -> RateLimitDecision {
        self.check_and_consume_at(client_id, Utc::now())
    }
}

/// Best-available client address from proxy headers.
pub fn client_identifier(headers: &HeaderMap) -> String {
    header_value(headers, "cf-connecting-ip")
        .or_else(|| header_value(headers, "x-real-ip"))
        .or_else(|| {
            header_value(headers, "x-forwarded-for")
                .and_then(|list| list.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
