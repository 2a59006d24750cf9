//! Per-replica request lifecycle: the request database, the three
//! consensus adapter roles, the gateway signing loop, and the peer-side
//! `GetPartialSig` handler.

mod broadcaster;
mod coordinator;
mod database;
mod error;
mod signing_loop;
mod validator;

pub use broadcaster::SigningBroadcaster;
pub use coordinator::{log_settings, Coordinator, Settings, SigningJob, SigningQueueHandle};
pub use error::{CoordinatorError, Result};
pub use signing_loop::run as run_signing_loop;
pub use validator::{AlwaysValid, CsrValidator};
