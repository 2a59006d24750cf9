//! Error type for the RPC boundary: conversions between wire and domain
//! types, and the `tonic::Status` mapping at each handler.

use thiserror::Error;

/// Errors raised converting between wire (`prost`) and domain
/// (`hotcert-types`) representations, before a `tonic::Status` is ever
/// constructed.
#[derive(Debug, Error)]
pub enum RpcError {
    /// A wire message failed to decode into its domain type.
    #[error("malformed wire message: {0}")]
    Malformed(String),
}

/// Result alias for this crate's fallible conversions.
pub type Result<T> = std::result::Result<T, RpcError>;
