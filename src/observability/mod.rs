//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Executors produce:
//!     → logging.rs (structured tracing events, one span per call)
//!     → metrics.rs (call counters and latency histograms)
//!
//! Consumers:
//!     → whatever subscriber / recorder the embedding application installs
//!     → the bundled CLI installs a fmt subscriber via logging::init
//! ```
//!
//! # Design Decisions
//! - The library only emits; it never installs a metrics recorder
//! - Correlation id is recorded on every call span

pub mod logging;
pub mod metrics;
