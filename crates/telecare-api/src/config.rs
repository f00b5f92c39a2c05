//! API service configuration.

use std::time::Duration;

use serde::Deserialize;

use telecare_relay::RelayConfig;

/// Configuration for the HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g. "0.0.0.0:8080").
    #[serde(default = "ApiConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Production posture. Forces https toward gateways regardless of
    /// stored `insecure_connection` flags.
    #[serde(default)]
    pub production: bool,

    /// Gateway relay timeout in seconds.
    #[serde(default = "ApiConfig::default_relay_timeout")]
    pub relay_timeout_seconds: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "ApiConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Inbound request timeout in seconds.
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    const fn default_relay_timeout() -> u64 {
        30
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    const fn default_request_timeout() -> u64 {
        60
    }

    /// Relay client configuration derived from this config.
    #[must_use]
    pub const fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            timeout: Duration::from_secs(self.relay_timeout_seconds),
            enforce_tls: self.production,
        }
    }

    /// Inbound request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            production: false,
            relay_timeout_seconds: Self::default_relay_timeout(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            cors_origins: vec!["*".to_string()],
        }
    }
}
