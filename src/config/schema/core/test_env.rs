use std::sync::{LazyLock, Mutex};

pub(crate) static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Every variable read by `Config::apply_env_overrides`.
const OVERRIDE_KEYS: &[&str] = &[
    "FLOWBRIDGE_WEBHOOK_URL",
    "N8N_WEBHOOK_URL",
    "FLOWBRIDGE_WEBHOOK_TOKEN",
    "N8N_WEBHOOK_TOKEN",
    "FLOWBRIDGE_API_URL",
    "N8N_API_URL",
    "FLOWBRIDGE_API_KEY",
    "N8N_API_KEY",
    "FLOWBRIDGE_GATEWAY_PORT",
    "PORT",
    "FLOWBRIDGE_GATEWAY_HOST",
    "HOST",
];

/// Restores one environment variable on drop.
pub(crate) struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl EnvVarGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: test-only; callers hold ENV_LOCK, serializing env access.
        unsafe {
            std::env::set_var(key, value);
        }
        Self { key, previous }
    }

    pub(crate) fn unset(key: &'static str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: test-only; callers hold ENV_LOCK.
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, previous }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        // SAFETY: ENV_LOCK is still held by the enclosing test.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }
}

/// Unset every override variable for the lifetime of the returned guards.
pub(crate) fn clear_engine_env() -> Vec<EnvVarGuard> {
    OVERRIDE_KEYS
        .iter()
        .copied()
        .map(EnvVarGuard::unset)
        .collect()
}
