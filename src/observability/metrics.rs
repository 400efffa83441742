//! Metrics collection.
//!
//! # Metrics
//! - `yt_http_calls_total` (counter): calls by verb and outcome
//! - `yt_http_call_duration_seconds` (histogram): time to response headers
//! - `yt_http_discovery_total` (counter): heavy proxy lookups by outcome
//! - `yt_http_open_writers` (gauge): streaming uploads in flight

use std::time::Instant;

use crate::error::{Error, ErrorKind};
use crate::verb::Verb;

/// Label value describing how a call ended.
pub fn outcome_label<T>(result: &Result<T, Error>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(err) => match err.kind() {
            ErrorKind::Transport => "transport_error",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Remote => "remote_error",
            ErrorKind::Protocol => "protocol_error",
        },
    }
}

/// Record a finished call.
pub fn record_call(verb: Verb, outcome: &'static str, start: Instant) {
    metrics::counter!("yt_http_calls_total", "verb" => verb.as_str(), "outcome" => outcome)
        .increment(1);
    metrics::histogram!("yt_http_call_duration_seconds", "verb" => verb.as_str())
        .record(start.elapsed().as_secs_f64());
}

/// Record a heavy proxy lookup.
pub fn record_discovery(outcome: &'static str) {
    metrics::counter!("yt_http_discovery_total", "outcome" => outcome).increment(1);
}

/// Track streaming uploads in flight.
pub fn writer_opened() {
    metrics::gauge!("yt_http_open_writers").increment(1.0);
}

pub fn writer_finished() {
    metrics::gauge!("yt_http_open_writers").decrement(1.0);
}
