//! Deterministic-enough CSR generation for tests.

use hotcert_types::Csr;

/// Build a CSR for `common_name`, DER-encoding a fresh throwaway keypair's
/// self-signed PKCS#10 request as `certificate_request`.
pub fn make_csr(client_id: u32, common_name: &str) -> Csr {
    let mut params = rcgen::CertificateParams::new(Vec::new());
    params.distinguished_name = rcgen::DistinguishedName::new();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, common_name);
    let cert = rcgen::Certificate::from_params(params).expect("rcgen params are well-formed");
    let csr_der = cert
        .serialize_request_der()
        .expect("self-signed CSR serialization");
    Csr::new(client_id, csr_der, Vec::new())
}
