//! Error vocabulary shared across crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parse errors for the primitive types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Coarse failure category every rejected operation falls into.
///
/// Each crate's error enum maps its variants onto one of these via `kind()`,
/// so callers can tell a malformed request from a premature one without
/// matching on every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed input or out-of-bounds parameter; rejected before any mutation.
    Validation,
    /// Caller is not allowed to perform the operation.
    Authorization,
    /// Operation attempted outside its time window.
    Timing,
    /// Operation conflicts with the current state of the record.
    State,
    /// An external call made on the DAO's behalf failed.
    ExternalCall,
}
