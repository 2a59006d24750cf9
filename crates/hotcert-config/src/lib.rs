//! Configuration and CLI option parsing for the HotCertification
//! binaries: TOML-backed [`CoordinatorConfig`] plus the `clap`-derived
//! argument structs for each binary. An explicit struct passed at
//! construction; no process-wide singletons.

mod cli;
mod config;
mod error;
mod pacemaker;
mod peer;

pub use cli::{ClientArgs, KeygenArgs, ServerArgs};
pub use config::CoordinatorConfig;
pub use error::{ConfigError, Result};
pub use pacemaker::PacemakerPolicy;
pub use peer::Peer;
