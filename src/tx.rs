//! Master transactions.
//!
//! [`HttpClient::begin`] issues `start_transaction` and wraps the returned id
//! in a [`Transaction`]. Every call routed through the handle carries the
//! `transaction_id` parameter.

use serde::Serialize;

use crate::call::{Call, CallResult};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::http::{HttpClient, ReadHandle, WriteHandle};
use crate::verb::Verb;
use crate::yson::Yson;

/// Parameters of `start_transaction`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StartTxOptions {
    /// Lease timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Parent transaction.
    #[serde(rename = "transaction_id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Guid>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ping_ancestor_transactions: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Handle to a started transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    client: HttpClient,
    id: Guid,
}

impl HttpClient {
    /// Start a transaction.
    pub async fn begin(&self, ctx: &Context, options: StartTxOptions) -> Result<Transaction> {
        let call = Call::new(Verb::StartTransaction).with_options(&options)?;
        let res = self.execute(ctx, call).await?;
        let id = parse_tx_id(&res)?;

        tracing::debug!(tx = %id, "Transaction started");
        Ok(Transaction {
            client: self.clone(),
            id,
        })
    }

    /// Attach to an already running transaction.
    pub fn attach(&self, id: Guid) -> Transaction {
        Transaction {
            client: self.clone(),
            id,
        }
    }
}

impl Transaction {
    pub fn id(&self) -> Guid {
        self.id
    }

    /// Route `call` through this transaction.
    pub fn bind(&self, call: Call) -> Call {
        call.with_param("transaction_id", self.id)
    }

    pub async fn execute(&self, ctx: &Context, call: Call) -> Result<CallResult> {
        self.client.execute(ctx, self.bind(call)).await
    }

    pub async fn open_write(&self, ctx: &Context, call: Call) -> Result<WriteHandle> {
        self.client.open_write(ctx, self.bind(call)).await
    }

    pub async fn open_read(&self, ctx: &Context, call: Call) -> Result<ReadHandle> {
        self.client.open_read(ctx, self.bind(call)).await
    }

    /// Extend the transaction lease.
    pub async fn ping(&self, ctx: &Context) -> Result<()> {
        self.finish(ctx, Verb::PingTransaction).await
    }

    pub async fn commit(self, ctx: &Context) -> Result<()> {
        self.finish(ctx, Verb::CommitTransaction).await?;
        tracing::debug!(tx = %self.id, "Transaction committed");
        Ok(())
    }

    pub async fn abort(self, ctx: &Context) -> Result<()> {
        self.finish(ctx, Verb::AbortTransaction).await?;
        tracing::debug!(tx = %self.id, "Transaction aborted");
        Ok(())
    }

    async fn finish(&self, ctx: &Context, verb: Verb) -> Result<()> {
        let call = Call::new(verb).with_param("transaction_id", self.id);
        self.client.execute(ctx, call).await.map(drop)
    }
}

/// Accepts both `{"transaction_id"="..."}` and a bare string.
fn parse_tx_id(res: &CallResult) -> Result<Guid> {
    match res.decode()?.into_field("transaction_id") {
        Yson::String(s) => Ok(s.parse()?),
        other => Err(Error::UnexpectedResponse(format!(
            "start_transaction returned {}",
            crate::yson::to_string(&other)
        ))),
    }
}
