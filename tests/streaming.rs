//! Streaming upload and download execution against a mock heavy proxy.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::any;
use futures_util::stream;

use yt_http::{Context, Error, ErrorKind, Yson};

mod common;

type Store = Arc<Mutex<Vec<u8>>>;

#[tokio::test]
async fn test_write_accepted_in_order() {
    let store = Store::default();
    let recorder = common::Recorder::default();
    let (stored, seen) = (store.clone(), recorder.clone());
    let addr = common::spawn_proxy(move |addr| {
        common::self_hosting(addr).route(
            "/api/v4/write_file",
            any(move |headers: HeaderMap, body: Bytes| {
                let (stored, seen) = (stored.clone(), seen.clone());
                async move {
                    seen.record(headers);
                    stored.lock().unwrap().extend_from_slice(&body);
                    ""
                }
            }),
        )
    })
    .await;
    let client = common::client_for(addr);

    let mut writer = client
        .write_file(&Context::background(), "//tmp/file")
        .await
        .unwrap();
    let mut expected = Vec::new();
    for i in 0..50 {
        let chunk = format!("chunk-{i};");
        writer.write(chunk.as_bytes()).await.unwrap();
        expected.extend_from_slice(chunk.as_bytes());
    }
    writer.close().await.unwrap();

    assert_eq!(*store.lock().unwrap(), expected);
    let headers = recorder.take().pop().unwrap();
    assert_eq!(headers["x-yt-input-format"], "yson");
    assert_eq!(headers["x-yt-parameters"], r#"{"path"="//tmp/file"}"#);
}

#[tokio::test]
async fn test_write_rejected_after_body() {
    let addr = common::spawn_proxy(|addr| {
        common::self_hosting(addr).route(
            "/api/v4/write_file",
            any(|_body: Bytes| async {
                (
                    StatusCode::BAD_REQUEST,
                    [("x-yt-error", common::yt_error_json(500, "quota exceeded"))],
                    "",
                )
            }),
        )
    })
    .await;
    let client = common::client_for(addr);

    let mut writer = client
        .write_file(&Context::background(), "//tmp/file")
        .await
        .unwrap();
    writer.write(b"some data").await.unwrap();

    let err = writer.close().await.unwrap_err();
    assert!(err.contains_error_code(500), "got {err:?}");
}

#[tokio::test]
async fn test_writes_fail_promptly_after_early_rejection() {
    let addr = common::spawn_proxy(|addr| {
        common::self_hosting(addr).route(
            "/api/v4/write_file",
            any(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [("x-yt-error", common::yt_error_json(500, "rejected"))],
                    "",
                )
            }),
        )
    })
    .await;
    let client = common::client_for(addr);

    let mut writer = client
        .write_file(&Context::background(), "//tmp/file")
        .await
        .unwrap();

    let chunk = vec![b'x'; 64 * 1024];
    let write_err = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Err(e) = writer.write(&chunk).await {
                return e;
            }
        }
    })
    .await
    .expect("writes must not hang after the upload was rejected");
    assert!(matches!(write_err, Error::WriteAborted(_)), "got {write_err:?}");

    // Once failed, stays failed.
    assert!(matches!(writer.write(b"more").await, Err(Error::WriteAborted(_))));
    assert!(writer.close().await.is_err());
}

#[tokio::test]
async fn test_cancel_aborts_upload() {
    let addr = common::spawn_proxy(|addr| {
        common::self_hosting(addr).route(
            "/api/v4/write_file",
            any(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                ""
            }),
        )
    })
    .await;
    let client = common::client_for(addr);
    let (ctx, cancel) = Context::with_cancel();

    let mut writer = client.write_file(&ctx, "//tmp/file").await.unwrap();
    let pump = tokio::spawn(async move {
        let chunk = vec![b'y'; 64 * 1024];
        loop {
            if let Err(e) = writer.write(&chunk).await {
                return (e, writer.close().await);
            }
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();

    let (write_err, closed) = tokio::time::timeout(Duration::from_secs(10), pump)
        .await
        .expect("cancellation must unblock the writer")
        .unwrap();
    assert!(matches!(write_err, Error::WriteAborted(_)), "got {write_err:?}");
    assert!(matches!(closed, Err(Error::Cancelled)), "got {closed:?}");
}

#[tokio::test]
async fn test_read_file() {
    let addr = common::spawn_proxy(|addr| {
        common::self_hosting(addr).route(
            "/api/v4/read_file",
            any(|| async { "first line\nsecond line\n" }),
        )
    })
    .await;
    let client = common::client_for(addr);

    let mut reader = client
        .read_file(&Context::background(), "//tmp/file")
        .await
        .unwrap();
    let body = reader.read_to_end().await.unwrap();
    assert_eq!(&body[..], b"first line\nsecond line\n");
    assert!(reader.chunk().await.unwrap().is_none());
    reader.close();
}

#[tokio::test]
async fn test_read_errors() {
    let addr = common::spawn_proxy(|addr| {
        common::self_hosting(addr)
            .route(
                "/api/v4/read_file",
                any(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        [("x-yt-error", common::yt_error_json(500, "no such file"))],
                        "ignored",
                    )
                }),
            )
            .route(
                "/api/v4/read_table",
                any(|| async {
                    (
                        StatusCode::OK,
                        [("x-yt-error", common::yt_error_json(1, "late failure"))],
                        "{\"a\"=1};",
                    )
                }),
            )
    })
    .await;
    let client = common::client_for(addr);
    let ctx = Context::background();

    let err = client.read_file(&ctx, "//tmp/missing").await.unwrap_err();
    assert!(err.contains_error_code(500), "got {err:?}");

    let mut reader = client.read_table(&ctx, "//tmp/table").await.unwrap();
    let err = reader.next_row().await.unwrap_err();
    assert!(err.contains_error_code(1), "got {err:?}");
    assert!(reader.next_row().await.unwrap().is_none());
}

#[tokio::test]
async fn test_table_round_trip() {
    let store = Store::default();
    let (written, served) = (store.clone(), store.clone());
    let addr = common::spawn_proxy(move |addr| {
        common::self_hosting(addr)
            .route(
                "/api/v4/write_table",
                any(move |body: Bytes| {
                    let written = written.clone();
                    async move {
                        written.lock().unwrap().extend_from_slice(&body);
                        ""
                    }
                }),
            )
            .route(
                "/api/v4/read_table",
                any(move || {
                    let served = served.clone();
                    async move { served.lock().unwrap().clone() }
                }),
            )
    })
    .await;
    let client = common::client_for(addr);
    let ctx = Context::background();

    let mut writer = client.write_table(&ctx, "//tmp/table").await.unwrap();
    for i in 0..3 {
        writer
            .write_row(&serde_json::json!({ "key": i, "name": format!("row {i}") }))
            .await
            .unwrap();
    }
    writer.close().await.unwrap();

    let mut reader = client.read_table(&ctx, "//tmp/table").await.unwrap();
    let mut rows = Vec::new();
    while let Some(row) = reader.next_row().await.unwrap() {
        rows.push(row);
    }
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].get("key"), Some(&Yson::Int64(2)));
    assert_eq!(rows[0].get("name"), Some(&Yson::from("row 0")));
}

/// Body that sends `pieces` one by one with a pause between them, then
/// optionally fails instead of ending cleanly.
fn slow_body(pieces: Vec<Vec<u8>>, fail_at_end: bool) -> Body {
    let pieces = stream::unfold(
        (pieces.into_iter(), fail_at_end),
        |(mut rest, fail_at_end)| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            match rest.next() {
                Some(piece) => Some((Ok(Bytes::from(piece)), (rest, fail_at_end))),
                None if fail_at_end => Some((
                    Err(std::io::Error::other("backend went away")),
                    (rest, false),
                )),
                None => None,
            }
        },
    );
    Body::from_stream(pieces)
}

#[tokio::test]
async fn test_read_failure_after_headers_surfaces() {
    let addr = common::spawn_proxy(|addr| {
        common::self_hosting(addr).route(
            "/api/v4/read_file",
            any(|| async {
                slow_body(vec![b"partial ".to_vec(), b"contents".to_vec()], true)
            }),
        )
    })
    .await;
    let client = common::client_for(addr);

    let mut reader = client
        .read_file(&Context::background(), "//tmp/file")
        .await
        .unwrap();
    let err = reader.read_to_end().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport, "got {err:?}");
    assert!(matches!(err, Error::Transport(_)));

    // The handle is exhausted after the failure.
    assert!(reader.chunk().await.unwrap().is_none());
}

#[tokio::test]
async fn test_read_table_across_small_chunks() {
    let text = b"{\"key\"=-17;\"ratio\"=1e-07;\"name\"=\"a;b\"};\n[%true;-2.5e+10;12u];\n{\"n\"={\"m\"=[#;-0.5]}};\n";
    let pieces: Vec<Vec<u8>> = text.chunks(3).map(<[u8]>::to_vec).collect();
    let addr = common::spawn_proxy(move |addr| {
        common::self_hosting(addr).route(
            "/api/v4/read_table",
            any(move || {
                let pieces = pieces.clone();
                async move { slow_body(pieces, false) }
            }),
        )
    })
    .await;
    let client = common::client_for(addr);

    let mut reader = client
        .read_table(&Context::background(), "//tmp/table")
        .await
        .unwrap();
    let mut rows = Vec::new();
    while let Some(row) = reader.next_row().await.unwrap() {
        rows.push(row);
    }

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("key"), Some(&Yson::Int64(-17)));
    assert_eq!(rows[0].get("ratio"), Some(&Yson::Double(1e-7)));
    assert_eq!(rows[0].get("name"), Some(&Yson::from("a;b")));
    assert_eq!(
        rows[1],
        Yson::List(vec![Yson::Bool(true), Yson::Double(-2.5e10), Yson::Uint64(12)])
    );
    assert_eq!(
        rows[2].get("n").and_then(|n| n.get("m")),
        Some(&Yson::List(vec![Yson::Entity, Yson::Double(-0.5)]))
    );
}
