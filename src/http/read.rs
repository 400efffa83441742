//! Streaming download execution.
//!
//! # Responsibilities
//! - Open a heavy read and hand the caller the live response body
//! - Turn non-200 replies into errors before any data is exposed
//! - Surface mid-stream failures and cancellation from each chunk read

use std::time::Instant;

use bytes::Bytes;
use futures_util::{stream, Stream};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::Instrument;

use crate::call::Call;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::client::HttpClient;
use crate::http::{decode_error_header, unexpected_status};
use crate::observability::metrics;

/// Reader side of an in-flight streaming download.
#[derive(Debug)]
pub struct ReadHandle {
    response: reqwest::Response,
    ctx: Context,
    pending: Option<Error>,
    finished: bool,
}

impl HttpClient {
    /// Start a streaming download for `call`.
    pub async fn open_read(&self, ctx: &Context, call: Call) -> Result<ReadHandle> {
        let start = Instant::now();
        let verb = call.verb;
        let span = tracing::debug_span!("yt_read", verb = %verb, call_id = %call.call_id);

        let result = ctx
            .run(async {
                let req = self.build_request(ctx, &call, None).await?;
                let rsp = self.http().execute(req).await?;
                if rsp.status() != StatusCode::OK {
                    if let Some(err) = decode_error_header(rsp.headers())? {
                        return Err(Error::Yt(err));
                    }
                    return Err(unexpected_status(rsp).await);
                }
                Ok(rsp)
            })
            .instrument(span.clone())
            .await;

        metrics::record_call(verb, metrics::outcome_label(&result), start);
        let response = match result {
            Ok(rsp) => rsp,
            Err(e) => {
                span.in_scope(|| tracing::debug!(error = %e, "Read rejected"));
                return Err(e);
            }
        };

        // An error header on a 200 reply is reported on the first read.
        let pending = match decode_error_header(response.headers()) {
            Ok(Some(err)) => Some(Error::Yt(err)),
            Ok(None) => None,
            Err(e) => Some(e),
        };
        span.in_scope(|| tracing::debug!(deferred_error = pending.is_some(), "Read opened"));

        Ok(ReadHandle {
            response,
            ctx: ctx.clone(),
            pending,
            finished: false,
        })
    }
}

impl ReadHandle {
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Next chunk of the body, `None` at the end.
    ///
    /// After an error the handle is exhausted and returns `None`.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        if let Some(err) = self.pending.take() {
            self.finished = true;
            return Err(err);
        }
        if self.finished {
            return Ok(None);
        }

        let response = &mut self.response;
        let result = self
            .ctx
            .run(async { Ok(response.chunk().await?) })
            .await;
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    /// Read everything that is left.
    pub async fn read_to_end(&mut self) -> Result<Bytes> {
        let mut out = Vec::new();
        while let Some(chunk) = self.chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(out))
    }

    /// Adapt the handle into a stream of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send {
        stream::unfold(self, |mut handle| async move {
            match handle.chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), handle)),
                Ok(None) => None,
                Err(e) => Some((Err(e), handle)),
            }
        })
    }

    /// Release the connection without reading the rest.
    pub fn close(self) {
        tracing::trace!(finished = self.finished, "Read handle closed");
    }
}
