//! Streaming upload execution.
//!
//! # Data Flow
//! ```text
//! WriteHandle::write ──▶ mpsc pipe ──▶ request body stream ──▶ heavy proxy
//!                                                                  │
//! WriteHandle::close ◀── outcome slot (oneshot) ◀── background task ◀┘
//! ```
//!
//! # Design Decisions
//! - The request is built (and the proxy discovered) before the task is
//!   spawned, so setup failures come straight back from `open_write`
//! - The task deposits exactly one outcome; a failed exchange also aborts
//!   the body stream so the connection is torn down
//! - Writers wait only on pipe capacity or on the outcome, never on both
//!   being stuck: once the exchange has ended, writes fail promptly

use std::io;
use std::time::Instant;

use bytes::Bytes;
use futures_util::{stream, Stream};
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

use crate::call::Call;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::http::client::HttpClient;
use crate::http::{decode_error_header, unexpected_status};
use crate::observability::metrics;
use crate::verb::Verb;

/// Writer side of an in-flight streaming upload.
///
/// Must be finished with [`WriteHandle::close`] to learn whether the upload
/// was accepted.
#[derive(Debug)]
pub struct WriteHandle {
    verb: Verb,
    call_id: Guid,
    pipe: mpsc::Sender<Bytes>,
    outcome: OutcomeSlot,
}

#[derive(Debug)]
enum OutcomeSlot {
    Pending(oneshot::Receiver<Result<()>>),
    Ready(Result<()>),
}

impl HttpClient {
    /// Start a streaming upload for `call`.
    pub async fn open_write(&self, ctx: &Context, call: Call) -> Result<WriteHandle> {
        let (pipe, rx) = mpsc::channel(self.pipe_capacity());
        let (abort_ctx, abort) = Context::with_cancel();

        let req = self
            .build_request(ctx, &call, Some(pipe_body(rx, abort_ctx)))
            .await?;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let span = tracing::debug_span!("yt_write", verb = %call.verb, call_id = %call.call_id);
        let client = self.clone();
        let task_ctx = ctx.clone();
        let verb = call.verb;

        metrics::writer_opened();
        tokio::spawn(
            async move {
                let start = Instant::now();
                let result = task_ctx
                    .run(async {
                        let rsp = client.http().execute(req).await?;
                        accept_upload(rsp).await
                    })
                    .await;

                if let Err(e) = &result {
                    abort.cancel();
                    tracing::debug!(error = %e, "Upload rejected");
                } else {
                    tracing::debug!("Upload accepted");
                }
                metrics::record_call(verb, metrics::outcome_label(&result), start);
                metrics::writer_finished();

                if outcome_tx.send(result).is_err() {
                    tracing::trace!("Write handle dropped before outcome");
                }
            }
            .instrument(span),
        );

        Ok(WriteHandle {
            verb: call.verb,
            call_id: call.call_id,
            pipe,
            outcome: OutcomeSlot::Pending(outcome_rx),
        })
    }
}

impl WriteHandle {
    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn call_id(&self) -> Guid {
        self.call_id
    }

    /// Queue `data` for upload, waiting only for pipe capacity.
    ///
    /// Fails with [`Error::WriteAborted`] once the exchange has ended; the
    /// underlying error is kept for [`WriteHandle::close`].
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.write_chunk(Bytes::copy_from_slice(data)).await
    }

    /// Like [`WriteHandle::write`] without copying.
    pub async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        let rx = match &mut self.outcome {
            OutcomeSlot::Ready(outcome) => return Err(aborted(outcome)),
            OutcomeSlot::Pending(rx) => rx,
        };
        if chunk.is_empty() {
            return Ok(());
        }

        tokio::select! {
            biased;
            outcome = rx => {
                let outcome = outcome.unwrap_or(Err(Error::WriteTaskLost));
                let err = aborted(&outcome);
                self.outcome = OutcomeSlot::Ready(outcome);
                Err(err)
            }
            sent = self.pipe.send(chunk) => match sent {
                Ok(()) => Ok(()),
                // The body stream is gone; the task is about to report why.
                Err(_) => Err(self.settle().await),
            },
        }
    }

    /// Finish the upload and return its outcome.
    pub async fn close(self) -> Result<()> {
        let WriteHandle { pipe, outcome, .. } = self;
        drop(pipe);

        match outcome {
            OutcomeSlot::Ready(outcome) => outcome,
            OutcomeSlot::Pending(rx) => rx.await.unwrap_or(Err(Error::WriteTaskLost)),
        }
    }

    async fn settle(&mut self) -> Error {
        if let OutcomeSlot::Pending(rx) = &mut self.outcome {
            let outcome = rx.await.unwrap_or(Err(Error::WriteTaskLost));
            self.outcome = OutcomeSlot::Ready(outcome);
        }
        match &self.outcome {
            OutcomeSlot::Ready(outcome) => aborted(outcome),
            OutcomeSlot::Pending(_) => Error::WriteTaskLost,
        }
    }
}

fn aborted(outcome: &Result<()>) -> Error {
    match outcome {
        Ok(()) => Error::WriteAborted("upload already completed".into()),
        Err(e) => Error::WriteAborted(e.to_string()),
    }
}

fn pipe_body(rx: mpsc::Receiver<Bytes>, abort: Context) -> reqwest::Body {
    reqwest::Body::wrap_stream(pipe_stream(rx, abort))
}

/// Chunks from the pipe in FIFO order; yields an error once `abort` fires.
fn pipe_stream(
    rx: mpsc::Receiver<Bytes>,
    abort: Context,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::unfold(Some((rx, abort)), |state| async move {
        let (mut rx, abort) = state?;
        tokio::select! {
            biased;
            _ = abort.done() => Some((Err(io::Error::other("upload aborted")), None)),
            chunk = rx.recv() => chunk.map(|chunk| (Ok(chunk), Some((rx, abort)))),
        }
    })
}

async fn accept_upload(rsp: reqwest::Response) -> Result<()> {
    if let Some(err) = decode_error_header(rsp.headers())? {
        return Err(Error::Yt(err));
    }
    if !rsp.status().is_success() {
        return Err(unexpected_status(rsp).await);
    }
    Ok(())
}
