//! Error type shared by the wire and domain types in this crate.

use thiserror::Error;

/// Errors raised while decoding, encoding, or validating HotCertification
/// wire and domain types.
#[derive(Debug, Error)]
pub enum TypesError {
    /// A byte sequence claiming to be a command/CSR/certificate did not
    /// decode to a well-formed value.
    #[error("malformed encoding: {0}")]
    Malformed(String),

    /// A PKCS#10 CSR failed to parse.
    #[error("invalid CSR: {0}")]
    InvalidCsr(String),

    /// A fingerprint string was not 64 lowercase hex characters.
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}

/// Result alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, TypesError>;
