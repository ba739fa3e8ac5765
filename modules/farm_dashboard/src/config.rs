use serde::{Deserialize, Serialize};

/// Upper bound for `notification_ttl_ms` (one day).
pub const MAX_NOTIFICATION_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Configuration for the farm_dashboard module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FarmDashboardConfig {
    /// Base URL of the managed backend (auth, rest and storage live under it).
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Public (anonymous) API key sent with every request.
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_asset_bucket")]
    pub asset_bucket: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
    #[serde(default = "default_fallback_full_name")]
    pub fallback_full_name: String,
}

impl Default for FarmDashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            anon_key: String::new(),
            asset_bucket: default_asset_bucket(),
            request_timeout_secs: default_request_timeout_secs(),
            notification_ttl_ms: default_notification_ttl_ms(),
            notification_capacity: default_notification_capacity(),
            fallback_full_name: default_fallback_full_name(),
        }
    }
}

impl FarmDashboardConfig {
    /// Checks that do not need the network.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.backend_url)
            .map_err(|e| anyhow::anyhow!("invalid backend_url '{}': {}", self.backend_url, e))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("backend_url '{}' cannot be used as a base URL", self.backend_url);
        }
        if self.anon_key.trim().is_empty() {
            anyhow::bail!("anon_key must be set");
        }
        if self.asset_bucket.trim().is_empty() {
            anyhow::bail!("asset_bucket must not be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        if self.notification_ttl_ms == 0 || self.notification_ttl_ms > MAX_NOTIFICATION_TTL_MS {
            anyhow::bail!(
                "notification_ttl_ms must be between 1 and {}, got {}",
                MAX_NOTIFICATION_TTL_MS,
                self.notification_ttl_ms
            );
        }
        Ok(())
    }

    /// How long a notification stays visible.
    pub fn notification_ttl(&self) -> anyhow::Result<chrono::Duration> {
        i64::try_from(self.notification_ttl_ms)
            .ok()
            .and_then(chrono::Duration::try_milliseconds)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "notification_ttl_ms {} is out of range",
                    self.notification_ttl_ms
                )
            })
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:54321".to_string()
}

fn default_asset_bucket() -> String {
    "avatars".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_notification_ttl_ms() -> u64 {
    4000
}

fn default_notification_capacity() -> usize {
    16
}

fn default_fallback_full_name() -> String {
    "User".to_string()
}
