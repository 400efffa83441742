//! Heavy proxy discovery.
//!
//! # Responsibilities
//! - Ask the cluster entry point for its heavy proxies (`GET /hosts`)
//! - Choose one through a pluggable [`ProxySelector`]
//!
//! # Design Decisions
//! - No caching: every heavy call performs a fresh lookup
//! - A non-200 reply is a transport-level failure, an empty list is not

use std::fmt;
use std::time::Instant;

use reqwest::StatusCode;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::client::HttpClient;
use crate::observability::metrics;

/// Picks one proxy out of a non-empty discovery list.
pub trait ProxySelector: Send + Sync + fmt::Debug {
    fn select<'a>(&self, proxies: &'a [String]) -> Option<&'a str>;
}

/// Always the first listed proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstProxy;

impl ProxySelector for FirstProxy {
    fn select<'a>(&self, proxies: &'a [String]) -> Option<&'a str> {
        proxies.first().map(String::as_str)
    }
}

/// A uniformly random proxy, spreading heavy load across the list.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomProxy;

impl ProxySelector for RandomProxy {
    fn select<'a>(&self, proxies: &'a [String]) -> Option<&'a str> {
        if proxies.is_empty() {
            return None;
        }
        proxies.get(fastrand::usize(..proxies.len())).map(String::as_str)
    }
}

impl HttpClient {
    /// Fetch the heavy proxy list as advertised by the cluster.
    pub async fn list_heavy_proxies(&self, ctx: &Context) -> Result<Vec<String>> {
        let start = Instant::now();
        let url = format!("{}/hosts", self.cluster_url());

        let result = ctx
            .run(async {
                let rsp = self.http().get(&url).send().await?;
                if rsp.status() != StatusCode::OK {
                    return Err(Error::DiscoveryStatus {
                        status: rsp.status().as_u16(),
                    });
                }
                let body = rsp.bytes().await?;
                serde_json::from_slice::<Vec<String>>(&body).map_err(Error::MalformedProxyList)
            })
            .await;

        metrics::record_discovery(metrics::outcome_label(&result));
        match &result {
            Ok(proxies) => tracing::debug!(
                count = proxies.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Heavy proxies discovered"
            ),
            Err(e) => tracing::warn!(url = %url, error = %e, "Heavy proxy discovery failed"),
        }
        result
    }

    /// Resolve the base URL of the heavy proxy to use for one call.
    pub async fn pick_heavy_proxy(&self, ctx: &Context) -> Result<String> {
        let proxies = self.list_heavy_proxies(ctx).await?;
        let host = self.selector().select(&proxies).ok_or(Error::EmptyProxyList)?;

        let url = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        tracing::debug!(proxy = %url, "Heavy proxy selected");
        Ok(url)
    }
}
