//! Extension point for CSR validation.
//!
//! `Accept` always succeeds in the current scheme — production
//! deployments plug real validation in here (proof-of-possession of the
//! subject's private key, an external identity check against
//! `validation_info`) without touching the Coordinator's replication
//! logic.

use hotcert_types::Csr;

/// Decides whether a freshly seen CSR may proceed to `validated=true`.
pub trait CsrValidator: Send + Sync {
    /// Validate `csr`. Parse errors in the inner PKCS#10 are tolerated by
    /// the caller regardless of this return value; this only gates the
    /// `validated` flag.
    fn validate(&self, csr: &Csr) -> bool;
}

/// The current scheme's validator: every CSR is valid. See module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysValid;

impl CsrValidator for AlwaysValid {
    fn validate(&self, _csr: &Csr) -> bool {
        true
    }
}
