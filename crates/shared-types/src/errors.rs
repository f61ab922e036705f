//! # Error Types
//!
//! Parse errors for the textual forms of chain identifiers.

use thiserror::Error;

/// Errors produced when parsing identifiers from their text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not valid hexadecimal.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded bytes had the wrong length.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Output reference was not of the form `<txid>:<vout>`.
    #[error("Malformed outpoint: {0}")]
    MalformedOutPoint(String),

    /// Output index was not a valid `u32`.
    #[error("Invalid output index: {0}")]
    InvalidOutputIndex(String),
}

impl From<hex::FromHexError> for ParseError {
    fn from(err: hex::FromHexError) -> Self {
        ParseError::InvalidHex(err.to_string())
    }
}
