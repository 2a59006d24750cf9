//! TBS certificate construction and signature splicing.
//!
//! Standard X.509 encoders insist on a signer before they'll emit DER, so
//! we hand them a per-replica dummy RSA key (same modulus size as the
//! threshold key, generated once at startup) purely to get canonical
//! `TBSCertificate` bytes out, then throw the placeholder signature away
//! and splice in the real threshold signature once the signing quorum
//! completes. This is option (a) from the design notes: simpler than
//! hand-rolling a TBS encoder, at the cost of one throwaway keypair per
//! replica.

use der::asn1::BitStringRef;
use der::{Decode, Encode};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::EncodePrivateKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use x509_cert::request::CertReq;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_cert::Certificate as X509Certificate;

use hotcert_types::{Certificate, Csr, Tbs};

use crate::error::{CryptoError, Result};
use crate::key::KeyMeta;

/// Issuer name carried by every certificate this authority produces.
pub const ISSUER_NAME: &str = "HotCertification Authority";

/// Validity period for issued certificates, matching the original source's
/// ten-year lifetime.
const VALIDITY_YEARS: i64 = 10;

/// Build the canonical TBS bytes for a certificate over the subject and
/// public key carried in `csr.certificate_request` (a DER-encoded PKCS#10
/// request), signed (and then discarded) with `dummy_key` purely to drive
/// the X.509 encoder.
///
/// `rcgen` has no way to hand it a subject key it doesn't itself hold the
/// private half of, so the placeholder round-trips through a throwaway
/// keypair and subject like `splice_signature` later throws away its
/// placeholder signature: once rcgen has produced a structurally valid
/// `TBSCertificate`, the CSR's real `subject` and `subjectPublicKeyInfo`
/// are spliced in before anything is hashed or signed.
///
/// Returns the placeholder-signed certificate's TBS bytes, which are the
/// object every replica actually signs a partial signature over.
pub fn build_tbs(csr: &Csr, dummy_key: &RsaPrivateKey) -> Result<Tbs> {
    let request = CertReq::from_der(&csr.certificate_request)
        .map_err(|e| CryptoError::Encoding(format!("malformed inner PKCS#10 request: {e}")))?;

    let mut cert_params = rcgen::CertificateParams::new(Vec::new());
    cert_params.not_before = rcgen::date_time_ymd(2020, 1, 1);
    cert_params.not_after = cert_params
        .not_before
        .checked_add(time::Duration::days(365 * VALIDITY_YEARS))
        .ok_or_else(|| CryptoError::Encoding("validity period overflow".into()))?;
    cert_params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "placeholder");
    cert_params
        .key_usages
        .push(rcgen::KeyUsagePurpose::DigitalSignature);
    cert_params
        .key_usages
        .push(rcgen::KeyUsagePurpose::KeyEncipherment);

    let dummy_der = dummy_key
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    let dummy_keypair = rcgen::KeyPair::try_from(dummy_der.as_bytes())
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    let placeholder = rcgen::Certificate::from_params(cert_params.clone())
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    let placeholder_der = placeholder
        .serialize_der_with_signer(&placeholder_issuer(&dummy_keypair)?)
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    let mut parsed = X509Certificate::from_der(&placeholder_der)
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    // Overwrite the placeholder subject and subject public key info with
    // the CSR's real ones: this is the step that makes the issued
    // certificate's subject and public key match the request rather than
    // the throwaway values rcgen had to invent to produce a valid TBS.
    parsed.tbs_certificate.subject = request.info.subject.clone();
    parsed.tbs_certificate.subject_public_key_info = request.info.public_key.clone();

    let tbs_der = parsed
        .tbs_certificate
        .to_der()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    Ok(Tbs::from_der(tbs_der))
}

/// Build the rcgen issuer certificate the dummy key "signs" the
/// placeholder with. The key's own self-signed certificate is never kept
/// around past this call; only the TBS bytes it lets us produce matter.
fn placeholder_issuer(dummy_keypair: &rcgen::KeyPair) -> Result<rcgen::Certificate> {
    let mut issuer_params = rcgen::CertificateParams::new(Vec::new());
    issuer_params
        .distinguished_name
        .push(rcgen::DnType::CommonName, ISSUER_NAME);
    issuer_params.key_pair = Some(dummy_keypair.clone());
    rcgen::Certificate::from_params(issuer_params).map_err(|e| CryptoError::Encoding(e.to_string()))
}

/// SHA-256 the TBS bytes and PKCS#1 v1.5-pad the digest to the modulus
/// byte length, the exact object a threshold key signs a partial
/// signature over.
pub fn pkcs1v15_pad_digest(tbs: &Tbs, meta: &KeyMeta) -> Vec<u8> {
    use sha2::Digest;
    let digest = sha2::Sha256::digest(tbs.as_der());
    pkcs1v15_pad(&digest, meta.modulus_bytes())
}

/// RFC 8017 EMSA-PKCS1-v1_5 encoding for a SHA-256 digest.
fn pkcs1v15_pad(digest: &[u8], modulus_bytes: usize) -> Vec<u8> {
    // DER prefix for SHA-256's DigestInfo, per RFC 8017 Appendix B.1.
    const SHA256_DIGEST_INFO_PREFIX: [u8; 19] = [
        0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
        0x05, 0x00, 0x04, 0x20,
    ];
    let mut t = Vec::with_capacity(SHA256_DIGEST_INFO_PREFIX.len() + digest.len());
    t.extend_from_slice(&SHA256_DIGEST_INFO_PREFIX);
    t.extend_from_slice(digest);

    let ps_len = modulus_bytes - t.len() - 3;
    let mut out = Vec::with_capacity(modulus_bytes);
    out.push(0x00);
    out.push(0x01);
    out.extend(std::iter::repeat(0xffu8).take(ps_len));
    out.push(0x00);
    out.extend_from_slice(&t);
    out
}

/// Splice the combined threshold signature into a TBS certificate,
/// producing the final, verifiable DER-encoded certificate.
pub fn splice_signature(tbs: &Tbs, signature: &[u8]) -> Result<Certificate> {
    let tbs_parsed = x509_cert::TbsCertificate::from_der(tbs.as_der())
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    let signature_algorithm = AlgorithmIdentifierOwned {
        oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
        parameters: Some(der::Any::from(der::asn1::Null)),
    };

    let signature_bits = BitStringRef::from_bytes(signature)
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    let signed = X509Certificate {
        tbs_certificate: tbs_parsed,
        signature_algorithm,
        signature: signature_bits.to_owned().into(),
    };

    let der = signed
        .to_der()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    Ok(Certificate::from_der(der))
}

/// Sign `digest` with a throwaway RSA key, purely so a standard encoder
/// has something to call during dummy-TBS generation; the resulting
/// signature is never inspected.
#[allow(dead_code)]
fn dummy_sign(key: &RsaPrivateKey, digest: &[u8]) -> Result<Vec<u8>> {
    let signing_key = SigningKey::<Sha256>::new(key.clone());
    let signature = signing_key.sign_with_rng(&mut rand::rngs::OsRng, digest);
    Ok(signature.to_bytes().to_vec())
}
