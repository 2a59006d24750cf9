//! Error type for the Coordinator and its signing loop.

use thiserror::Error;

/// Errors surfaced by Coordinator operations and the signing loop.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A request referenced by fingerprint was not found in the database.
    #[error("request {0} not found")]
    NotFound(String),

    /// `GetPartialSig` was invoked for a request that has not cleared
    /// replication's validation step.
    #[error("CSR has not been validated")]
    NotValidated,

    /// Fewer than `K` valid shares arrived before the signing deadline.
    #[error("signing quorum not reached: got {have}, need {need}")]
    QuorumNotReached {
        /// Valid shares actually collected.
        have: usize,
        /// Shares required.
        need: usize,
    },

    /// A bounded channel had no room and the caller chose not to wait.
    #[error("queue is full")]
    QueueFull,

    /// A channel's paired end was dropped (shutdown in progress).
    #[error("channel closed")]
    ChannelClosed,

    /// The underlying command bytes failed to decode.
    #[error("types error: {0}")]
    Types(#[from] hotcert_types::TypesError),

    /// A cryptographic operation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] hotcert_crypto::CryptoError),
}

/// Result alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;
