//! YSON, the structured encoding used by the cluster.
//!
//! # Data Flow
//! ```text
//! Call parameters (Yson map)
//!     → writer.rs (compact text form, ASCII only)
//!     → X-YT-Parameters header
//!
//! Response body / table stream
//!     → parser.rs (single value or list fragment)
//!     → Yson tree handed to the caller
//! ```
//!
//! # Design Decisions
//! - Only the text flavour is produced; binary YSON is rejected by the parser
//! - Every non-printable or non-ASCII byte is escaped so the output is a
//!   valid HTTP header value
//! - Attributes (`<...>`) are not modelled

pub mod parser;
pub mod value;
pub mod writer;

pub use parser::{from_slice, next_fragment_item};
pub use value::{Yson, YsonMap};
pub use writer::{map_to_string, to_string, write_fragment_item};

use thiserror::Error;

/// Errors produced while decoding or converting YSON.
#[derive(Debug, Error)]
pub enum YsonError {
    /// Input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A byte that cannot start or continue the current token.
    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    /// A numeric literal that does not parse.
    #[error("invalid number {literal:?} at offset {offset}")]
    InvalidNumber { literal: String, offset: usize },

    /// A `%` literal other than booleans and special doubles.
    #[error("unknown literal %{literal} at offset {offset}")]
    UnknownLiteral { literal: String, offset: usize },

    /// String contents are not UTF-8 after unescaping.
    #[error("string at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    /// Attribute maps are not supported.
    #[error("attributes are not supported (offset {0})")]
    Attributes(usize),

    /// Maps and lists nested deeper than [`parser::MAX_DEPTH`].
    #[error("nesting too deep at offset {0}")]
    NestingTooDeep(usize),

    /// Data left after a complete top-level value.
    #[error("trailing data at offset {0}")]
    TrailingData(usize),

    /// A serde value could not be represented as YSON.
    #[error("cannot convert to yson: {0}")]
    Convert(#[from] serde_json::Error),
}
