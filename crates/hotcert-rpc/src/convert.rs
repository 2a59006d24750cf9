//! Conversions between the generated protobuf types and this workspace's
//! domain types (`hotcert-types`).

use hotcert_types::{Certificate, Csr, Fingerprint, SigShare, Tbs};

use crate::error::{Result, RpcError};
use crate::proto;

impl From<&Csr> for proto::CsrProto {
    fn from(csr: &Csr) -> Self {
        Self {
            client_id: csr.client_id,
            certificate_request: csr.certificate_request.clone().into(),
            validation_info: csr.validation_info.clone().into(),
        }
    }
}

impl From<proto::CsrProto> for Csr {
    fn from(wire: proto::CsrProto) -> Self {
        Csr::new(
            wire.client_id,
            wire.certificate_request.to_vec(),
            wire.validation_info.to_vec(),
        )
    }
}

impl From<&Certificate> for proto::CertificateProto {
    fn from(cert: &Certificate) -> Self {
        Self {
            certificate: cert.as_der().to_vec().into(),
        }
    }
}

impl From<proto::CertificateProto> for Certificate {
    fn from(wire: proto::CertificateProto) -> Self {
        Certificate::from_der(wire.certificate.to_vec())
    }
}

/// Build the wire `TbsProto` for one `GetPartialSig` call.
pub fn tbs_request(fingerprint: &Fingerprint, tbs: &Tbs) -> proto::TbsProto {
    proto::TbsProto {
        fingerprint: fingerprint.to_hex(),
        certificate: tbs.as_der().to_vec().into(),
    }
}

/// Decode a `TbsProto` back into `(Fingerprint, Tbs)`.
pub fn from_tbs_request(wire: proto::TbsProto) -> Result<(Fingerprint, Tbs)> {
    let fingerprint = Fingerprint::from_hex(&wire.fingerprint)
        .map_err(|e| RpcError::Malformed(e.to_string()))?;
    Ok((fingerprint, Tbs::from_der(wire.certificate.to_vec())))
}

impl From<&SigShare> for proto::SigShareProto {
    fn from(share: &SigShare) -> Self {
        Self {
            xi: share.xi.clone().into(),
            c: share.c.clone().into(),
            z: share.z.clone().into(),
            id: share.id,
        }
    }
}

impl From<proto::SigShareProto> for SigShare {
    fn from(wire: proto::SigShareProto) -> Self {
        SigShare::new(wire.xi.to_vec(), wire.c.to_vec(), wire.z.to_vec(), wire.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csr_round_trips_through_proto() {
        let csr = Csr::new(9, vec![1, 2, 3], vec![4, 5]);
        let wire = proto::CsrProto::from(&csr);
        let back: Csr = wire.into();
        assert_eq!(csr, back);
    }

    #[test]
    fn sig_share_round_trips_through_proto() {
        let share = SigShare::new(vec![1], vec![2], vec![3], 7);
        let wire = proto::SigShareProto::from(&share);
        let back: SigShare = wire.into();
        assert_eq!(share, back);
    }

    #[test]
    fn tbs_request_round_trips() {
        let fingerprint = Fingerprint::from_csr(&Csr::new(1, vec![9], vec![]));
        let tbs = Tbs::from_der(vec![1, 2, 3]);
        let wire = tbs_request(&fingerprint, &tbs);
        let (decoded_fp, decoded_tbs) = from_tbs_request(wire).expect("decodes");
        assert_eq!(decoded_fp, fingerprint);
        assert_eq!(decoded_tbs.as_der(), tbs.as_der());
    }
}
