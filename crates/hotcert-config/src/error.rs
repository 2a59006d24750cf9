//! Error type for configuration loading.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::CoordinatorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file's contents were not valid TOML, or didn't match the
    /// expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `id` did not name any entry in `peers`.
    #[error("id {id} has no corresponding entry in peers")]
    UnknownId {
        /// The replica id that was not found.
        id: u16,
    },

    /// `pacemaker = "fixed"` but no `leader-id` names a known peer.
    #[error("leader-id {leader_id} has no corresponding entry in peers")]
    UnknownLeader {
        /// The configured leader id.
        leader_id: u16,
    },
}

/// Result alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
