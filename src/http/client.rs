//! HTTP client facade.
//!
//! # Responsibilities
//! - Own the immutable pieces shared by every call: entry point, connection
//!   pool, credentials, proxy selection policy
//! - Hand out cheap clones for concurrent callers

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, ProxySelection};
use crate::credentials::{Credentials, TokenCredentials};
use crate::error::{Error, Result};
use crate::http::discovery::{FirstProxy, ProxySelector, RandomProxy};

/// Client for the cluster's HTTP proxies.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

#[derive(Clone)]
struct Inner {
    cluster_url: String,
    http: reqwest::Client,
    credentials: Option<Arc<dyn Credentials>>,
    selector: Arc<dyn ProxySelector>,
    pipe_capacity: usize,
    request_timeout: Option<Duration>,
}

impl HttpClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let cluster_url = config.cluster_url();
        url::Url::parse(&cluster_url).map_err(|e| Error::InvalidUrl(format!("{cluster_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect())
            .pool_idle_timeout(config.timeouts.idle())
            .no_proxy()
            .build()?;

        let credentials: Option<Arc<dyn Credentials>> = if config.token.is_empty() {
            None
        } else {
            Some(Arc::new(TokenCredentials::new(&config.token)?))
        };

        let selector: Arc<dyn ProxySelector> = match config.proxy_selection {
            ProxySelection::First => Arc::new(FirstProxy),
            ProxySelection::Random => Arc::new(RandomProxy),
        };

        tracing::debug!(
            cluster_url = %cluster_url,
            authenticated = credentials.is_some(),
            "HTTP client created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                cluster_url,
                http,
                credentials,
                selector,
                pipe_capacity: config.pipe_capacity.max(1),
                request_timeout: config.timeouts.request(),
            }),
        })
    }

    /// Replace the credential attacher.
    pub fn with_credentials(mut self, credentials: Arc<dyn Credentials>) -> Self {
        Arc::make_mut(&mut self.inner).credentials = Some(credentials);
        self
    }

    /// Replace the heavy proxy selection policy.
    pub fn with_proxy_selector(mut self, selector: Arc<dyn ProxySelector>) -> Self {
        Arc::make_mut(&mut self.inner).selector = selector;
        self
    }

    pub fn cluster_url(&self) -> &str {
        &self.inner.cluster_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn credentials(&self) -> Option<&dyn Credentials> {
        self.inner.credentials.as_deref()
    }

    pub(crate) fn selector(&self) -> &dyn ProxySelector {
        self.inner.selector.as_ref()
    }

    pub(crate) fn pipe_capacity(&self) -> usize {
        self.inner.pipe_capacity
    }

    pub(crate) fn request_timeout(&self) -> Option<Duration> {
        self.inner.request_timeout
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("cluster_url", &self.inner.cluster_url)
            .field("credentials", &self.inner.credentials)
            .field("selector", &self.inner.selector)
            .field("pipe_capacity", &self.inner.pipe_capacity)
            .finish()
    }
}
