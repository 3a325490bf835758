//! Configuration for the remote store client.

use std::time::Duration;

/// Connection settings for the REST store.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project base URL (e.g., "https://xyz.supabase.co").
    pub base_url: String,
    /// API key sent as both `apikey` and bearer credential.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// REST root for all collections.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url)
    }

    /// Endpoint for a single collection.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url(), table)
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
