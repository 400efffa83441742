//! Cancellation and deadlines for calls.
//!
//! Every client operation takes a [`Context`]. When the context fires before
//! the network exchange completes, its error ([`Error::Cancelled`] or
//! [`Error::DeadlineExceeded`]) is reported instead of whatever the HTTP
//! layer saw while being torn down.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{Error, ErrorKind, Result};

/// Carries a cancellation flag and an optional deadline.
///
/// Clones share the same flag. Derived contexts ([`Context::with_timeout`])
/// share the flag too and only tighten the deadline.
#[derive(Debug, Clone)]
pub struct Context {
    cancel: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the contexts it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }
}

impl Context {
    /// A context that never fires.
    pub fn background() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            cancel: Arc::new(tx),
            deadline: None,
        }
    }

    /// A fresh context plus the handle that cancels it.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let ctx = Self::background();
        let handle = CancelHandle {
            cancel: ctx.cancel.clone(),
        };
        (ctx, handle)
    }

    /// Derive a context that also fires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that also fires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context fired, if it has.
    pub fn err(&self) -> Option<Error> {
        if *self.cancel.borrow() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        let mut rx = self.cancel.subscribe();
        let cancelled = async move {
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = cancelled => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => cancelled.await,
        }
    }

    /// Drive `fut` unless the context fires first.
    ///
    /// A transport failure observed after the context fired is replaced by
    /// the context's own error.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            _ = self.done() => Err(self.err().unwrap_or(Error::Cancelled)),
            res = fut => match res {
                Err(err) if err.kind() == ErrorKind::Transport => Err(self.err().unwrap_or(err)),
                other => other,
            },
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
