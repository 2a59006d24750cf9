//! Self-signing the root CA certificate at trusted-dealer setup time.
//!
//! The root certificate is not a shortcut: it is produced by running the
//! same threshold signing protocol the live system uses for client
//! certificates, once, offline, with every freshly generated key share
//! participating in-process.

use der::{Decode, Encode};
use rsa::pkcs8::EncodePrivateKey;
use rsa::RsaPrivateKey;

use crate::cert::{pkcs1v15_pad_digest, splice_signature, ISSUER_NAME};
use crate::combine::combine;
use crate::error::{CryptoError, Result};
use crate::key::{KeyMeta, ThresholdKey};
use crate::shares::SigShareSet;
use crate::sign::{partial_sign, verify_share};
use hotcert_types::Tbs;

/// Build the root CA's TBS bytes: a self-signed, `IsCA=true` template with
/// key usage restricted to certificate signing.
fn build_root_tbs(dummy_key: &RsaPrivateKey) -> Result<Tbs> {
    let mut params = rcgen::CertificateParams::new(Vec::new());
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, ISSUER_NAME);
    params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    params.key_usages.push(rcgen::KeyUsagePurpose::KeyCertSign);
    params.not_before = rcgen::date_time_ymd(2020, 1, 1);
    params.not_after = params
        .not_before
        .checked_add(time::Duration::days(365 * 10))
        .ok_or_else(|| CryptoError::Encoding("validity period overflow".into()))?;

    let dummy_der = dummy_key
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    let dummy_keypair = rcgen::KeyPair::try_from(dummy_der.as_bytes())
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    params.key_pair = Some(dummy_keypair);

    let placeholder =
        rcgen::Certificate::from_params(params).map_err(|e| CryptoError::Encoding(e.to_string()))?;
    let placeholder_der = placeholder
        .serialize_der()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    let parsed = x509_cert::Certificate::from_der(&placeholder_der)
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    let tbs_der = parsed
        .tbs_certificate
        .to_der()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    Ok(Tbs::from_der(tbs_der))
}

/// Self-sign the root CA certificate, using at least `meta.k` of the
/// freshly generated `keys` to produce the threshold signature.
///
/// Returns the final DER-encoded, fully signed root certificate.
pub fn generate_root_cert(keys: &[ThresholdKey], meta: &KeyMeta) -> Result<Vec<u8>> {
    if keys.is_empty() {
        return Err(CryptoError::InvalidParameters(
            "need at least one key share to self-sign the root cert".into(),
        ));
    }
    let tbs = build_root_tbs(keys[0].dummy_private_key())?;
    let padded_digest = pkcs1v15_pad_digest(&tbs, meta);

    let mut set = SigShareSet::new(meta.k);
    let mut sealed = None;
    for key in keys.iter().take(meta.k.max(keys.len().min(meta.l))) {
        let share = partial_sign(key, &padded_digest);
        verify_share(meta, &padded_digest, &share)?;
        if let Some(s) = set.insert(share) {
            sealed = Some(s);
            break;
        }
    }
    let sealed = sealed.ok_or_else(|| CryptoError::InsufficientShares {
        needed: meta.k,
        have: set.count(),
    })?;

    let signature = combine(meta, &padded_digest, &sealed)?;
    let certificate = splice_signature(&tbs, &signature)?;
    Ok(certificate.into_der())
}
