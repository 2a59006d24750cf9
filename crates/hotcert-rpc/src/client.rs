//! Client-side gRPC wrappers: the gateway's fan-out to peer signing
//! endpoints (implementing `hotcert_coordinator::SigningBroadcaster`) and
//! a thin `CertificationService` client for `hotcert-client`.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Channel;
use tracing::debug;

use hotcert_coordinator::SigningBroadcaster;
use hotcert_types::{Fingerprint, SigShare, Tbs};

use crate::convert::tbs_request;
use crate::proto::certification_service_client::CertificationServiceClient;
use crate::proto::signing_service_client::SigningServiceClient;
use crate::proto::CsrProto;

/// Per-peer dial timeout for the signing broadcast.
const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Fans `GetPartialSig` out to every peer signing address over gRPC,
/// dropping peers that fail to connect or respond; a transport failure
/// is treated the same as a single uncollected share.
pub struct GrpcSigningBroadcaster {
    peer_addrs: Vec<String>,
}

impl GrpcSigningBroadcaster {
    /// Build a broadcaster over `peer_addrs` (every peer's
    /// `signing-peer-address`, including this replica's own if it should
    /// count its own share towards the quorum via the network path; most
    /// deployments instead serve the local share in-process and only list
    /// other peers here).
    pub fn new(peer_addrs: Vec<String>) -> Self {
        Self { peer_addrs }
    }

    async fn call_one(addr: &str, fingerprint: &Fingerprint, tbs: &Tbs) -> Option<SigShare> {
        let endpoint = Channel::from_shared(format!("http://{addr}"))
            .ok()?
            .connect_timeout(DIAL_TIMEOUT);
        let channel = match endpoint.connect().await {
            Ok(channel) => channel,
            Err(err) => {
                debug!(addr, %err, "failed to dial peer signing endpoint");
                return None;
            }
        };
        let mut client = SigningServiceClient::new(channel);
        let request = tbs_request(fingerprint, tbs);
        match client.get_partial_sig(request).await {
            Ok(response) => Some(response.into_inner().into()),
            Err(status) => {
                debug!(addr, %status, "peer declined GetPartialSig");
                None
            }
        }
    }
}

#[async_trait]
impl SigningBroadcaster for GrpcSigningBroadcaster {
    async fn broadcast(&self, fingerprint: &Fingerprint, tbs: &Tbs) -> Vec<SigShare> {
        let calls = self
            .peer_addrs
            .iter()
            .map(|addr| Self::call_one(addr, fingerprint, tbs));
        futures::future::join_all(calls)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// A minimal `CertificationService` client, used by `hotcert-client` for
/// both single-request and benchmark (many-requests) modes.
pub struct CertificationClient {
    client: CertificationServiceClient<Channel>,
}

impl CertificationClient {
    /// Connect to a replica's client endpoint at `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self, tonic::transport::Error> {
        let endpoint = Channel::from_shared(format!("http://{addr}"))?.connect_timeout(DIAL_TIMEOUT);
        let channel = endpoint.connect().await?;
        Ok(Self {
            client: CertificationServiceClient::new(channel),
        })
    }

    /// Submit `csr` and block until the gateway returns a certificate or
    /// an error.
    pub async fn get_certificate(
        &mut self,
        csr: &hotcert_types::Csr,
    ) -> Result<Vec<u8>, tonic::Status> {
        let request = CsrProto::from(csr);
        let response = self.client.get_certificate(request).await?;
        Ok(response.into_inner().certificate.to_vec())
    }
}
