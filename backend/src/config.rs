//! Gym Manager API configuration.
//!
//! Defaults point at the production API. `GYM_MANAGER_BASE_URL` and
//! `GYM_MANAGER_TIMEOUT_SECS` override them.

use std::env;
use std::time::Duration;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://trainmore-apiv6.gymmanager.eu/api/v1";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const AUTHENTICATE_PATH: &str = "/Authorize/AuthenticateJson";
const CLUBS_PATH: &str = "/Clubs?onlyActive=true";
const MEMBERSHIPS_PATH: &str = "/PeopleMemberships";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// API root without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from environment variables, falling back to defaults.
    ///
    /// Does not load `.env`; the binary does that once at startup.
    pub fn from_env() -> Self {
        let mut config = env::var("GYM_MANAGER_BASE_URL")
            .map(Self::new)
            .unwrap_or_default();

        if let Some(secs) = env::var("GYM_MANAGER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Login endpoint.
    pub fn authenticate_url(&self) -> String {
        format!("{}{}", self.base_url, AUTHENTICATE_PATH)
    }

    /// Listing endpoint used by the connectivity self-test.
    pub fn clubs_url(&self) -> String {
        format!("{}{}", self.base_url, CLUBS_PATH)
    }

    /// Base path that membership change URLs hang off.
    pub fn memberships_url(&self) -> String {
        format!("{}{}", self.base_url, MEMBERSHIPS_PATH)
    }
}
