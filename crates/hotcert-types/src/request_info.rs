//! Per-replica, in-memory bookkeeping for one certificate request.

use crate::csr::Csr;

/// Everything a replica tracks about one in-flight (or finished) request.
///
/// The lifecycle flags are monotonic: every setter only ever moves a flag
/// from `false` to `true`, matching the invariant that `RequestInfo` never
/// regresses once a stage has been reached.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    csr: Csr,
    /// TBS certificate bytes once generated. Only ever populated on the
    /// gateway replica for this request.
    certificate: Option<Vec<u8>>,
    received: bool,
    validated: bool,
    proposed: bool,
    replicated: bool,
    signed: bool,
    returned: bool,
}

impl RequestInfo {
    /// Create a fresh entry for a request this replica has just received
    /// directly from a client (the gateway path).
    pub fn received(csr: Csr) -> Self {
        Self {
            csr,
            certificate: None,
            received: true,
            validated: false,
            proposed: false,
            replicated: false,
            signed: false,
            returned: false,
        }
    }

    /// Create a fresh entry for a request this replica first learned about
    /// through `Accept` (it is not the gateway for this request).
    /// `validated` starts `false`; the caller sets it once its validator
    /// has run.
    pub fn accepted(csr: Csr) -> Self {
        Self {
            csr,
            certificate: None,
            received: false,
            validated: false,
            proposed: false,
            replicated: false,
            signed: false,
            returned: false,
        }
    }

    /// The request this entry tracks.
    pub fn csr(&self) -> &Csr {
        &self.csr
    }

    /// The TBS/signed certificate bytes, if this replica is the gateway and
    /// has generated one.
    pub fn certificate(&self) -> Option<&[u8]> {
        self.certificate.as_deref()
    }

    /// Record the generated certificate bytes (called by the gateway once
    /// per request, before signing).
    pub fn set_certificate(&mut self, certificate: Vec<u8>) {
        self.certificate = Some(certificate);
    }

    /// True if this replica is the gateway for this request.
    pub fn is_gateway(&self) -> bool {
        self.received
    }

    pub fn received_flag(&self) -> bool {
        self.received
    }

    pub fn validated_flag(&self) -> bool {
        self.validated
    }

    pub fn proposed_flag(&self) -> bool {
        self.proposed
    }

    pub fn replicated_flag(&self) -> bool {
        self.replicated
    }

    pub fn signed_flag(&self) -> bool {
        self.signed
    }

    pub fn returned_flag(&self) -> bool {
        self.returned
    }

    pub fn mark_validated(&mut self) {
        self.validated = true;
    }

    pub fn mark_proposed(&mut self) {
        self.proposed = true;
    }

    pub fn mark_replicated(&mut self) {
        self.replicated = true;
    }

    pub fn mark_signed(&mut self) {
        self.signed = true;
    }

    pub fn mark_returned(&mut self) {
        self.returned = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_sets_only_received() {
        let info = RequestInfo::received(Csr::new(1, vec![], vec![]));
        assert!(info.received_flag());
        assert!(!info.validated_flag());
        assert!(info.is_gateway());
    }

    #[test]
    fn accepted_starts_unvalidated_and_not_received() {
        let info = RequestInfo::accepted(Csr::new(1, vec![], vec![]));
        assert!(!info.received_flag());
        assert!(!info.validated_flag());
        assert!(!info.is_gateway());
    }

    #[test]
    fn flags_only_move_forward() {
        let mut info = RequestInfo::accepted(Csr::new(1, vec![], vec![]));
        info.mark_proposed();
        info.mark_replicated();
        assert!(info.proposed_flag());
        assert!(info.replicated_flag());
        assert!(!info.signed_flag());
    }
}
