//! Wire representation of a client certificate request and its canonical
//! deterministic encoding.
//!
//! The encoding here is the one consensus command bytes and `Fingerprint`
//! both derive from — see [`Csr::encode`] and [`Fingerprint::from_csr`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};

/// A client's request to have a CSR certified, as received off the wire.
///
/// `(client_id, certificate_request, validation_info)` together form the
/// request's identity; see [`crate::Fingerprint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Csr {
    /// Opaque client identifier chosen by the submitter.
    pub client_id: u32,
    /// ASN.1 DER encoding of a PKCS#10 `CertificationRequest`.
    #[serde(with = "serde_bytes")]
    pub certificate_request: Vec<u8>,
    /// Out-of-band validation material (proof-of-possession, identity
    /// attestations, ...). Opaque to the coordinator.
    #[serde(with = "serde_bytes")]
    pub validation_info: Vec<u8>,
}

impl Csr {
    /// Construct a request from its three wire fields.
    pub fn new(
        client_id: u32,
        certificate_request: impl Into<Vec<u8>>,
        validation_info: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            client_id,
            certificate_request: certificate_request.into(),
            validation_info: validation_info.into(),
        }
    }

    /// Encode this request as a deterministic byte sequence.
    ///
    /// Byte-identical `Csr` values encode to byte-identical output on every
    /// replica; this is what consensus command bytes and [`Fingerprint`]
    /// preimages are built from. Layout: big-endian `client_id`, then each
    /// remaining field as a 4-byte big-endian length prefix followed by its
    /// bytes, so variable-length fields never run together ambiguously.
    ///
    /// [`Fingerprint`]: crate::Fingerprint
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 8 + self.certificate_request.len() + self.validation_info.len());
        out.extend_from_slice(&self.client_id.to_be_bytes());
        encode_field(&mut out, &self.certificate_request);
        encode_field(&mut out, &self.validation_info);
        out
    }

    /// Decode a byte sequence produced by [`Csr::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(TypesError::Malformed("command shorter than client_id".into()));
        }
        let mut client_id_bytes = [0u8; 4];
        client_id_bytes.copy_from_slice(&bytes[0..4]);
        let client_id = u32::from_be_bytes(client_id_bytes);

        let mut cursor = 4usize;
        let (certificate_request, next) = decode_field(bytes, cursor)?;
        cursor = next;
        let (validation_info, next) = decode_field(bytes, cursor)?;
        cursor = next;

        if cursor != bytes.len() {
            return Err(TypesError::Malformed("trailing bytes after validation_info".into()));
        }

        Ok(Self {
            client_id,
            certificate_request,
            validation_info,
        })
    }
}

fn encode_field(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u32).to_be_bytes());
    out.extend_from_slice(field);
}

fn decode_field(bytes: &[u8], cursor: usize) -> Result<(Vec<u8>, usize)> {
    if bytes.len() < cursor + 4 {
        return Err(TypesError::Malformed("truncated length prefix".into()));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[cursor..cursor + 4]);
    let len = u32::from_be_bytes(len_bytes) as usize;
    let start = cursor + 4;
    let end = start
        .checked_add(len)
        .ok_or_else(|| TypesError::Malformed("length overflow".into()))?;
    if bytes.len() < end {
        return Err(TypesError::Malformed("truncated field".into()));
    }
    Ok((bytes[start..end].to_vec(), end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encode_decode() {
        let csr = Csr::new(7, vec![1, 2, 3], vec![]);
        let encoded = csr.encode();
        let decoded = Csr::decode(&encoded).expect("decode");
        assert_eq!(csr, decoded);
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = Csr::new(42, b"der-bytes".to_vec(), b"validation".to_vec());
        let b = Csr::new(42, b"der-bytes".to_vec(), b"validation".to_vec());
        assert_eq!(a.encode(), b.encode());
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(Csr::decode(&[0, 0]).is_err());
    }
}

#[cfg(test)]
mod proptest_encoding {
    use super::*;
    use proptest::prelude::*;

    fn arb_csr() -> impl Strategy<Value = Csr> {
        (any::<u32>(), proptest::collection::vec(any::<u8>(), 0..64), proptest::collection::vec(any::<u8>(), 0..64))
            .prop_map(|(client_id, certificate_request, validation_info)| {
                Csr::new(client_id, certificate_request, validation_info)
            })
    }

    proptest! {
        #[test]
        fn encode_decode_round_trips(csr in arb_csr()) {
            let decoded = Csr::decode(&csr.encode()).expect("encode output always decodes");
            prop_assert_eq!(decoded, csr);
        }

        #[test]
        fn encoding_is_pure(csr in arb_csr()) {
            prop_assert_eq!(csr.encode(), csr.encode());
        }
    }
}
