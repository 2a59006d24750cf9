//! Error type for the threshold RSA and certificate machinery.

use thiserror::Error;

/// Errors raised by key generation, partial signing, share verification,
/// combination, or certificate construction.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A key generation parameter was out of range (e.g. threshold > total).
    #[error("invalid threshold parameters: {0}")]
    InvalidParameters(String),

    /// A signature share failed its zero-knowledge proof of correctness.
    #[error("share {id} failed verification")]
    InvalidShare {
        /// Index of the offending share.
        id: u32,
    },

    /// Fewer valid shares were supplied than the threshold requires.
    #[error("need {needed} shares to combine, have {have}")]
    InsufficientShares {
        /// Shares required.
        needed: usize,
        /// Shares actually supplied.
        have: usize,
    },

    /// The combined signature did not verify against the public key.
    #[error("combined signature failed verification")]
    CombinedSignatureInvalid,

    /// X.509/PKCS#10 structure could not be parsed or built.
    #[error("certificate encoding error: {0}")]
    Encoding(String),

    /// PEM framing was malformed or carried an unexpected type label.
    #[error("PEM error: {0}")]
    Pem(String),

    /// Low-level RSA primitive failed.
    #[error("RSA error: {0}")]
    Rsa(#[from] rsa::Error),

    /// I/O failure while reading or writing a key/certificate file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
