//! Heavy proxy discovery against mock entry points.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use yt_http::http::RandomProxy;
use yt_http::{Context, Error, ErrorKind};

mod common;

#[tokio::test]
async fn test_empty_proxy_list_is_distinct() {
    let addr = common::spawn_proxy(|_| {
        Router::new().route("/hosts", get(|| async { Json(Vec::<String>::new()) }))
    })
    .await;
    let client = common::client_for(addr);

    let err = client.pick_heavy_proxy(&Context::background()).await.unwrap_err();
    assert!(matches!(err, Error::EmptyProxyList), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Protocol);

    let err = client
        .read_file(&Context::background(), "//tmp/file")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyProxyList), "got {err:?}");
}

#[tokio::test]
async fn test_discovery_failure_status_is_transport() {
    let addr = common::spawn_proxy(|_| {
        Router::new().route(
            "/hosts",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
    })
    .await;
    let client = common::client_for(addr);

    let err = client
        .write_file(&Context::background(), "//tmp/file")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DiscoveryStatus { status: 500 }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_malformed_proxy_list() {
    let addr = common::spawn_proxy(|_| {
        Router::new().route("/hosts", get(|| async { "not a list" }))
    })
    .await;
    let client = common::client_for(addr);

    let err = client.pick_heavy_proxy(&Context::background()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedProxyList(_)), "got {err:?}");
}

#[tokio::test]
async fn test_first_proxy_gets_scheme() {
    let addr = common::spawn_proxy(|_| {
        Router::new().route(
            "/hosts",
            get(|| async { Json(vec!["heavy-1:80", "https://heavy-2"]) }),
        )
    })
    .await;
    let client = common::client_for(addr);
    let ctx = Context::background();

    assert_eq!(client.pick_heavy_proxy(&ctx).await.unwrap(), "http://heavy-1:80");
    assert_eq!(
        client.list_heavy_proxies(&ctx).await.unwrap(),
        vec!["heavy-1:80", "https://heavy-2"]
    );

    let random = client.with_proxy_selector(Arc::new(RandomProxy));
    let picked = random.pick_heavy_proxy(&ctx).await.unwrap();
    assert!(picked == "http://heavy-1:80" || picked == "https://heavy-2");
}

#[tokio::test]
async fn test_unreachable_entry_point() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = common::client_for(addr);
    let err = client.pick_heavy_proxy(&Context::background()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport, "got {err:?}");
}
