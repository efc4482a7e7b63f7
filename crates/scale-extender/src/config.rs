//! Service configuration.

use serde::Deserialize;

/// Configuration for the extender HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtenderConfig {
    /// Listen address (e.g., "0.0.0.0:80").
    #[serde(default = "ExtenderConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Maximum request body size in bytes.
    ///
    /// Callbacks that carry full node objects grow with the cluster, so this
    /// is far above the usual API limits.
    #[serde(default = "ExtenderConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Requested log level (`TRACE`, `DEBUG`, `INFO`, `WARNING`, `ERROR`,
    /// `ALERT`).
    #[serde(default = "ExtenderConfig::default_log_level")]
    pub log_level: String,
}

impl ExtenderConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:80".to_string()
    }

    const fn default_max_body() -> usize {
        64 * 1024 * 1024 // 64 MiB
    }

    fn default_log_level() -> String {
        "INFO".to_string()
    }

    /// Load configuration from environment variables.
    ///
    /// Supported environment variables:
    /// - `LISTEN_ADDR`: Listen address (default: `0.0.0.0:80`)
    /// - `MAX_BODY_BYTES`: Request body limit (default: 64 MiB)
    /// - `LOG_LEVEL`: Log level (default: `INFO`)
    ///
    /// Unset, empty or unparseable values keep their defaults, except
    /// `LOG_LEVEL`, which is kept verbatim (empty when unset) and resolved by
    /// [`LogLevel`](crate::logging::LogLevel). This runs
    /// before logging is set up, so it reports nothing itself.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(Self::default_listen_addr),
            max_body_bytes: var("MAX_BODY_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or_else(Self::default_max_body),
            log_level: lookup("LOG_LEVEL").unwrap_or_default(),
        }
    }
}

impl Default for ExtenderConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            max_body_bytes: Self::default_max_body(),
            log_level: Self::default_log_level(),
        }
    }
}
