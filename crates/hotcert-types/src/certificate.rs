//! The issued artifact: a DER-encoded X.509 certificate, before or after
//! the threshold signature has been spliced in.

use serde::{Deserialize, Serialize};

/// DER bytes of an X.509 certificate.
///
/// Before signing, the `Signature` field of these bytes is a placeholder
/// produced by a dummy per-replica RSA key (see `hotcert-crypto`); once the
/// aggregated threshold signature has been spliced in and the bytes
/// re-serialized, the same type represents the final, verifiable
/// certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate(#[serde(with = "serde_bytes")] Vec<u8>);

impl Certificate {
    /// Wrap raw DER bytes.
    pub fn from_der(der: Vec<u8>) -> Self {
        Self(der)
    }

    /// The DER-encoded bytes.
    pub fn as_der(&self) -> &[u8] {
        &self.0
    }

    /// Consume the wrapper, returning the DER bytes.
    pub fn into_der(self) -> Vec<u8> {
        self.0
    }
}

/// The bytes a replica hashes and signs a partial signature over:
/// `RawTBSCertificate` extracted from a [`Certificate`]'s DER encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tbs(#[serde(with = "serde_bytes")] Vec<u8>);

impl Tbs {
    /// Wrap the raw `TBSCertificate` DER bytes.
    pub fn from_der(der: Vec<u8>) -> Self {
        Self(der)
    }

    /// The DER-encoded `TBSCertificate` bytes.
    pub fn as_der(&self) -> &[u8] {
        &self.0
    }
}
