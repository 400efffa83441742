//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cluster entry point (e.g., "hume" or "http://localhost:8000").
    pub proxy: String,

    /// OAuth token; empty means no credentials are attached.
    pub token: String,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Chunks buffered between a streaming writer and its request body.
    pub pipe_capacity: usize,

    /// How a heavy proxy is chosen from the discovered list.
    pub proxy_selection: ProxySelection,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy: "localhost:8000".to_string(),
            token: String::new(),
            timeouts: TimeoutConfig::default(),
            pipe_capacity: 16,
            proxy_selection: ProxySelection::First,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Config for the given entry point with every other field defaulted.
    pub fn for_proxy(proxy: impl Into<String>) -> Self {
        Self {
            proxy: proxy.into(),
            ..Self::default()
        }
    }

    /// Overlay `YT_PROXY` and `YT_TOKEN` from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(proxy) = std::env::var("YT_PROXY") {
            config.proxy = proxy;
        }
        if let Ok(token) = std::env::var("YT_TOKEN") {
            config.token = token;
        }
        config
    }

    /// The entry point as a base URL.
    pub fn cluster_url(&self) -> String {
        normalize_proxy_url(&self.proxy)
    }
}

/// Prefix `http://` when no scheme is given and drop trailing slashes.
pub fn normalize_proxy_url(proxy: &str) -> String {
    let proxy = proxy.trim().trim_end_matches('/');
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}

/// Heavy proxy selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProxySelection {
    /// Always the first listed proxy.
    #[default]
    First,
    /// Uniformly random among the listed proxies.
    Random,
}

/// Timeout configuration for the HTTP transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Whole-request timeout for unary calls in seconds (0 disables it).
    ///
    /// Streaming calls are bounded only by their context.
    pub request_secs: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 60,
            idle_secs: 90,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn request(&self) -> Option<Duration> {
        (self.request_secs > 0).then(|| Duration::from_secs(self.request_secs))
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
