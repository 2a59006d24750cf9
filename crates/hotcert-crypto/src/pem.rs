//! PEM file I/O for threshold keys and certificates.
//!
//! Type labels are fixed strings kept byte-for-byte compatible with the
//! format this scheme was distilled from, so key material generated by
//! this implementation and an interoperating one can be told apart from
//! generic PEM blobs at a glance.

use std::fs;
use std::path::Path;

use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};
use crate::key::{KeyMeta, KeyShare, ThresholdKey, VerificationKey};

/// PEM type label for a serialized threshold key share + metadata blob.
pub const THRESHOLD_KEY_LABEL: &str = "HOTCERTIFICATION THRESHOLD KEY";
/// PEM type label for a DER-encoded X.509 certificate.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

#[derive(Serialize, Deserialize)]
struct ThresholdKeyBlob {
    index: u32,
    s_i: Vec<u8>,
    n: Vec<u8>,
    e: Vec<u8>,
    k: u32,
    l: u32,
    v: Vec<u8>,
    u: Vec<u8>,
    u_i: Vec<Vec<u8>>,
    dummy_pkcs8_der: Vec<u8>,
}

/// Serialize a threshold key to the bytes carried inside its PEM block.
fn to_blob(key: &ThresholdKey) -> Result<Vec<u8>> {
    let dummy_pkcs8_der = key
        .dummy_private_key()
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?
        .as_bytes()
        .to_vec();

    let blob = ThresholdKeyBlob {
        index: key.share.index,
        s_i: key.share.s_i.to_bytes_be(),
        n: key.meta.n.to_bytes_be(),
        e: key.meta.e.to_bytes_be(),
        k: key.meta.k as u32,
        l: key.meta.l as u32,
        v: key.meta.verification_key.v.to_bytes_be(),
        u: key.meta.verification_key.u.to_bytes_be(),
        u_i: key
            .meta
            .verification_key
            .u_i
            .iter()
            .map(|x| x.to_bytes_be())
            .collect(),
        dummy_pkcs8_der,
    };
    bincode::serialize(&blob).map_err(|e| CryptoError::Encoding(e.to_string()))
}

fn from_blob(bytes: &[u8]) -> Result<ThresholdKey> {
    let blob: ThresholdKeyBlob =
        bincode::deserialize(bytes).map_err(|e| CryptoError::Encoding(e.to_string()))?;

    let share = KeyShare {
        index: blob.index,
        s_i: num_bigint_dig::BigUint::from_bytes_be(&blob.s_i),
    };
    let meta = KeyMeta {
        n: num_bigint_dig::BigUint::from_bytes_be(&blob.n),
        e: num_bigint_dig::BigUint::from_bytes_be(&blob.e),
        k: blob.k as usize,
        l: blob.l as usize,
        verification_key: VerificationKey {
            v: num_bigint_dig::BigUint::from_bytes_be(&blob.v),
            u: num_bigint_dig::BigUint::from_bytes_be(&blob.u),
            u_i: blob
                .u_i
                .iter()
                .map(|x| num_bigint_dig::BigUint::from_bytes_be(x))
                .collect(),
        },
    };
    let dummy_priv = RsaPrivateKey::from_pkcs8_der(&blob.dummy_pkcs8_der)
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    Ok(ThresholdKey::new(share, meta, dummy_priv))
}

/// Write a threshold key to `path` as a PEM file, mode `0600` on unix.
pub fn write_threshold_key_file(path: impl AsRef<Path>, key: &ThresholdKey) -> Result<()> {
    let blob = to_blob(key)?;
    let encoded = pem::encode(&pem::Pem::new(THRESHOLD_KEY_LABEL, blob));
    fs::write(&path, encoded)?;
    set_private_mode(path.as_ref())?;
    Ok(())
}

/// Read a threshold key back from a PEM file written by
/// [`write_threshold_key_file`].
pub fn read_threshold_key_file(path: impl AsRef<Path>) -> Result<ThresholdKey> {
    let contents = fs::read_to_string(&path)?;
    let parsed = pem::parse(&contents).map_err(|e| CryptoError::Pem(e.to_string()))?;
    if parsed.tag() != THRESHOLD_KEY_LABEL {
        return Err(CryptoError::Pem(format!(
            "expected PEM label {THRESHOLD_KEY_LABEL}, got {}",
            parsed.tag()
        )));
    }
    from_blob(parsed.contents())
}

/// Write a DER-encoded certificate to `path` as a PEM file, mode `0644`.
pub fn write_cert_file(path: impl AsRef<Path>, der: &[u8]) -> Result<()> {
    let encoded = pem::encode(&pem::Pem::new(CERTIFICATE_LABEL, der.to_vec()));
    fs::write(&path, encoded)?;
    Ok(())
}

/// Read a DER-encoded certificate back from a PEM file.
pub fn read_cert_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let contents = fs::read_to_string(&path)?;
    let parsed = pem::parse(&contents).map_err(|e| CryptoError::Pem(e.to_string()))?;
    if parsed.tag() != CERTIFICATE_LABEL {
        return Err(CryptoError::Pem(format!(
            "expected PEM label {CERTIFICATE_LABEL}, got {}",
            parsed.tag()
        )));
    }
    Ok(parsed.contents().to_vec())
}

#[cfg(unix)]
fn set_private_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_private_mode(_path: &Path) -> Result<()> {
    Ok(())
}
