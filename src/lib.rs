//! HTTP transport for YT clusters.
//!
//! Turns typed remote calls into requests against the cluster's proxies and
//! turns replies back into results or structured errors.
//!
//! ```text
//! Call ──▶ request builder ──▶ unary | streaming write | streaming read
//!              │
//!              └── heavy verbs: GET /hosts ──▶ proxy selector
//! ```

pub mod api;
pub mod call;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod guid;
pub mod http;
pub mod observability;
pub mod table;
pub mod tx;
pub mod verb;
pub mod yson;

pub use call::{Call, CallResult};
pub use config::ClientConfig;
pub use context::{CancelHandle, Context};
pub use error::{Error, ErrorKind, Result, YtError};
pub use guid::Guid;
pub use http::{HttpClient, ReadHandle, WriteHandle};
pub use tx::{StartTxOptions, Transaction};
pub use verb::Verb;
pub use yson::Yson;
