//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! Call (verb + params + payload)
//!     → discovery.rs (heavy verbs only: GET /hosts, pick a proxy)
//!     → request.rs (URL, X-YT-* headers, body, credentials)
//!     → exactly one executor:
//!         - unary.rs  (control plane, buffered reply)
//!         - write.rs  (heavy upload through a pipe + background task)
//!         - read.rs   (heavy download over the live response body)
//!     → CallResult / WriteHandle / ReadHandle or Error
//! ```
//!
//! # Design Decisions
//! - `X-YT-Error` is checked before the status code
//! - Non-2xx replies without a header error get one last attempt to decode
//!   an error from the body
//! - Responses are dropped (closing the connection) on every error path

pub mod client;
pub mod discovery;
pub mod read;
pub mod request;
pub mod unary;
pub mod write;

pub use client::HttpClient;
pub use discovery::{FirstProxy, ProxySelector, RandomProxy};
pub use read::ReadHandle;
pub use write::WriteHandle;

use reqwest::header::{HeaderMap, HeaderName};

use crate::error::{Error, Result, YtError};

pub const X_YT_HEADER_FORMAT: HeaderName = HeaderName::from_static("x-yt-header-format");
pub const X_YT_PARAMETERS: HeaderName = HeaderName::from_static("x-yt-parameters");
pub const X_YT_CORRELATION_ID: HeaderName = HeaderName::from_static("x-yt-correlation-id");
pub const X_YT_INPUT_FORMAT: HeaderName = HeaderName::from_static("x-yt-input-format");
pub const X_YT_OUTPUT_FORMAT: HeaderName = HeaderName::from_static("x-yt-output-format");
pub const X_YT_ERROR: HeaderName = HeaderName::from_static("x-yt-error");

/// Decode `X-YT-Error` when present.
pub(crate) fn decode_error_header(headers: &HeaderMap) -> Result<Option<YtError>> {
    let Some(value) = headers.get(X_YT_ERROR) else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(value.as_bytes())
        .map(Some)
        .map_err(Error::MalformedErrorHeader)
}

/// Last effort attempt to get a useful error out of a failed response.
pub(crate) async fn unexpected_status(rsp: reqwest::Response) -> Error {
    let status = rsp.status().as_u16();
    if let Ok(body) = rsp.bytes().await {
        if let Ok(err) = serde_json::from_slice::<YtError>(&body) {
            if err.code != 0 || !err.message.is_empty() {
                return Error::Yt(err);
            }
        }
    }

    Error::UnexpectedStatus { status }
}
