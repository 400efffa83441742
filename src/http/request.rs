//! Request construction.
//!
//! # Responsibilities
//! - Resolve the target proxy (entry point or discovered heavy proxy)
//! - Encode parameters into `X-YT-Parameters`
//! - Attach the body, format headers and credentials
//!
//! # Design Decisions
//! - A live stream body takes precedence over the call's buffered payload
//! - `X-YT-Input-Format` is sent only when a body is attached

use reqwest::header::HeaderValue;

use crate::call::Call;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::client::HttpClient;
use crate::http::{
    X_YT_CORRELATION_ID, X_YT_HEADER_FORMAT, X_YT_INPUT_FORMAT, X_YT_OUTPUT_FORMAT,
    X_YT_PARAMETERS,
};

const YSON: HeaderValue = HeaderValue::from_static("yson");

impl HttpClient {
    /// Build the HTTP request for `call`.
    ///
    /// Heavy verbs trigger proxy discovery, so this may touch the network.
    pub(crate) async fn build_request(
        &self,
        ctx: &Context,
        call: &Call,
        body: Option<reqwest::Body>,
    ) -> Result<reqwest::Request> {
        let base = if call.verb.is_heavy() {
            self.pick_heavy_proxy(ctx).await?
        } else {
            self.cluster_url().to_string()
        };
        let url = format!("{base}/api/v4/{}", call.verb);

        let params = call.encode_params();
        let params = HeaderValue::from_str(&params)
            .map_err(|e| Error::InvalidParams(format!("{e}: {params}")))?;
        let call_id = HeaderValue::from_str(&call.call_id.to_string())
            .map_err(|e| Error::InvalidParams(e.to_string()))?;

        let mut builder = self
            .http()
            .request(call.verb.http_method(), &url)
            .header(X_YT_HEADER_FORMAT, YSON)
            .header(X_YT_PARAMETERS, params)
            .header(X_YT_CORRELATION_ID, call_id);

        let body = body.or_else(|| call.payload.clone().map(reqwest::Body::from));
        if let Some(body) = body {
            builder = builder.header(X_YT_INPUT_FORMAT, YSON).body(body);
        }

        let mut req = builder.header(X_YT_OUTPUT_FORMAT, YSON).build()?;

        if let Some(credentials) = self.credentials() {
            credentials.set(&mut req);
        }

        tracing::trace!(
            verb = %call.verb,
            call_id = %call.call_id,
            method = %req.method(),
            url = %req.url(),
            "Request built"
        );
        Ok(req)
    }
}
