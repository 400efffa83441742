//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or YT_PROXY / YT_TOKEN
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → consumed once by HttpClient::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a client is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{normalize_proxy_url, ClientConfig, ObservabilityConfig, ProxySelection, TimeoutConfig};
