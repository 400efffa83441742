//! Shared utilities for integration testing against mock cluster proxies.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;

use yt_http::{ClientConfig, HttpClient};

/// Bind an ephemeral port, build the router (it may need its own address for
/// `/hosts`) and serve it in the background.
pub async fn spawn_proxy<F>(build: F) -> SocketAddr
where
    F: FnOnce(SocketAddr) -> Router,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build(addr);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Router whose `/hosts` advertises the proxy itself as the only heavy proxy.
pub fn self_hosting(addr: SocketAddr) -> Router {
    let hosts = vec![addr.to_string()];
    Router::new().route("/hosts", get(move || async move { Json(hosts) }))
}

pub fn client_for(addr: SocketAddr) -> HttpClient {
    HttpClient::new(&ClientConfig::for_proxy(addr.to_string())).unwrap()
}

pub fn client_with_token(addr: SocketAddr, token: &str) -> HttpClient {
    let mut config = ClientConfig::for_proxy(addr.to_string());
    config.token = token.to_string();
    HttpClient::new(&config).unwrap()
}

/// JSON body of an `X-YT-Error` header.
pub fn yt_error_json(code: i32, message: &str) -> String {
    serde_json::json!({ "code": code, "message": message }).to_string()
}

/// Captures request headers seen by a handler.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<HeaderMap>>>,
}

impl Recorder {
    pub fn record(&self, headers: HeaderMap) {
        self.seen.lock().unwrap().push(headers);
    }

    pub fn take(&self) -> Vec<HeaderMap> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}
