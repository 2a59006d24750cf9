//! Builds the CSR a manual or benchmark invocation submits.

use hotcert_types::Csr;

/// Build a CSR for `common_name`, DER-encoding a fresh throwaway keypair's
/// self-signed PKCS#10 request as `certificate_request`, per the
/// original's `generateCSR` (`cmd/client/main.go`).
pub fn build_csr(client_id: u32, common_name: &str) -> anyhow::Result<Csr> {
    let mut params = rcgen::CertificateParams::new(Vec::new());
    params.distinguished_name = rcgen::DistinguishedName::new();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, common_name);
    let cert = rcgen::Certificate::from_params(params)?;
    let csr_der = cert.serialize_request_der()?;
    Ok(Csr::new(client_id, csr_der, Vec::new()))
}
