//! JSON codecs for the ANF and CoreExpr dialects.
//!
//! Two wire formats coexist and callers pick one at the call site:
//!
//! - the **tagged form**: every node is an object
//!   `{"type": T, ...fields}`. Used for [`CoreExpr`](crate::CoreExpr)
//!   and kept for ANF as a legacy encoding (debug friendliness);
//! - the **compact form**, the preferred ANF encoding (size): variables
//!   are bare JSON strings, bools and ints bare scalars, strings
//!   `{"str": s}`, ops `{"op": name}`, and lambda/call/if/let are
//!   positional arrays.
//!
//! Each `dump` is the inverse of the corresponding `parse`: round-trips
//! reproduce structurally equal expressions and byte-identical documents
//! modulo JSON whitespace. Parsers either succeed or fail without
//! partial effect. A single decoder never accepts both formats.

mod anf_compact;
mod anf_tagged;
mod core_tagged;

use thiserror::Error;

/// Failure to decode a dialect from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not well-formed JSON.
    #[error("invalid JSON: {0}")]
    Json(String),
    /// Well-formed JSON that matches no accepted node shape.
    #[error("JSON does not encode a {dialect} expression")]
    Shape { dialect: &'static str },
}

impl ParseError {
    pub(crate) fn json(err: &serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}
