//! The cross-replica correlation key for a certificate request.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::csr::Csr;
use crate::error::{Result, TypesError};

/// `hex(SHA256(encode(csr)))` — deterministic across replicas for
/// byte-identical requests, and the sole key into a replica's request
/// database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of a request.
    pub fn from_csr(csr: &Csr) -> Self {
        let digest = Sha256::digest(csr.encode());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Build a fingerprint directly from a raw 32-byte digest, e.g. when
    /// reconstructing one read back from storage.
    pub fn from_digest(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a fingerprint from its hex representation.
    pub fn from_hex(s: &str) -> Result<Self> {
        let decoded = hex::decode(s).map_err(|e| TypesError::InvalidFingerprint(e.to_string()))?;
        if decoded.len() != 32 {
            return Err(TypesError::InvalidFingerprint(format!(
                "expected 32 bytes, got {}",
                decoded.len()
            )));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded form, as used for logging and as the database key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_identical_requests() {
        let a = Csr::new(1, vec![9, 9], vec![]);
        let b = Csr::new(1, vec![9, 9], vec![]);
        assert_eq!(Fingerprint::from_csr(&a), Fingerprint::from_csr(&b));
    }

    #[test]
    fn differs_for_different_requests() {
        let a = Csr::new(1, vec![9, 9], vec![]);
        let b = Csr::new(2, vec![9, 9], vec![]);
        assert_ne!(Fingerprint::from_csr(&a), Fingerprint::from_csr(&b));
    }

    #[test]
    fn hex_round_trip() {
        let fp = Fingerprint::from_csr(&Csr::new(3, vec![1], vec![2]));
        let parsed = Fingerprint::from_hex(&fp.to_hex()).expect("parse");
        assert_eq!(fp, parsed);
    }
}

#[cfg(test)]
mod proptest_determinism {
    use super::*;
    use proptest::prelude::*;

    fn arb_csr() -> impl Strategy<Value = Csr> {
        (any::<u32>(), proptest::collection::vec(any::<u8>(), 0..64), proptest::collection::vec(any::<u8>(), 0..64))
            .prop_map(|(client_id, certificate_request, validation_info)| {
                Csr::new(client_id, certificate_request, validation_info)
            })
    }

    proptest! {
        /// Scenario 6: identical requests always fingerprint identically,
        /// on any replica, at any time.
        #[test]
        fn same_csr_same_fingerprint(csr in arb_csr()) {
            let a = Fingerprint::from_csr(&csr);
            let b = Fingerprint::from_csr(&csr);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn hex_round_trips(csr in arb_csr()) {
            let fp = Fingerprint::from_csr(&csr);
            let parsed = Fingerprint::from_hex(&fp.to_hex()).expect("hex always parses back");
            prop_assert_eq!(fp, parsed);
        }
    }
}
