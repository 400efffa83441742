//! Unary (request/reply) execution.
//!
//! # Data Flow
//! ```text
//! Call → build_request → send → X-YT-Error? → status 2xx? → body bytes
//! ```
//!
//! The whole exchange, body included, is raced against the context.

use std::time::Instant;

use tracing::Instrument;

use crate::call::{Call, CallResult};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::client::HttpClient;
use crate::http::{decode_error_header, unexpected_status};
use crate::observability::metrics;

impl HttpClient {
    /// Execute a call and buffer its reply.
    pub async fn execute(&self, ctx: &Context, call: Call) -> Result<CallResult> {
        let start = Instant::now();
        let verb = call.verb;
        let span = tracing::debug_span!("yt_call", verb = %verb, call_id = %call.call_id);

        let result = ctx
            .run(async {
                let mut req = self.build_request(ctx, &call, None).await?;
                if let Some(timeout) = self.request_timeout() {
                    *req.timeout_mut() = Some(timeout);
                }
                let rsp = self.http().execute(req).await?;
                read_result(rsp).await
            })
            .instrument(span.clone())
            .await;

        metrics::record_call(verb, metrics::outcome_label(&result), start);
        span.in_scope(|| match &result {
            Ok(res) => tracing::debug!(bytes = res.value.len(), "Call succeeded"),
            Err(e) => tracing::debug!(error = %e, "Call failed"),
        });
        result
    }
}

async fn read_result(rsp: reqwest::Response) -> Result<CallResult> {
    if let Some(err) = decode_error_header(rsp.headers())? {
        return Err(Error::Yt(err));
    }
    if !rsp.status().is_success() {
        return Err(unexpected_status(rsp).await);
    }

    let value = rsp.bytes().await?;
    Ok(CallResult { value })
}
