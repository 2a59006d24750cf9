//! `tonic` service implementations wrapping a [`Coordinator`] for each of
//! the three replica endpoints: client, signing, and replication.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{info, warn};

use hotcert_coordinator::{Coordinator, CoordinatorError};
use hotcert_types::{Csr, Fingerprint};

use crate::convert::from_tbs_request;
use crate::proto::certification_service_server::CertificationService;
use crate::proto::replication_service_server::ReplicationService;
use crate::proto::signing_service_server::SigningService;
use crate::proto::{CertificateProto, CsrProto, ReplicationMessage, SigShareProto, TbsProto};

fn coordinator_error_to_status(err: CoordinatorError) -> Status {
    match err {
        CoordinatorError::NotFound(_) | CoordinatorError::NotValidated => {
            Status::permission_denied(err.to_string())
        }
        CoordinatorError::QuorumNotReached { .. } => Status::resource_exhausted(err.to_string()),
        CoordinatorError::Types(_) | CoordinatorError::Crypto(_) => {
            Status::invalid_argument(err.to_string())
        }
        CoordinatorError::QueueFull | CoordinatorError::ChannelClosed => {
            Status::unavailable(err.to_string())
        }
    }
}

/// Implements `CertificationService.GetCertificate`: the sole
/// client-facing surface, gateway role for
/// whichever replica handles the call.
pub struct CertificationServer {
    coordinator: Arc<Coordinator>,
}

impl CertificationServer {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }
}

#[tonic::async_trait]
impl CertificationService for CertificationServer {
    async fn get_certificate(
        &self,
        request: Request<CsrProto>,
    ) -> std::result::Result<Response<CertificateProto>, Status> {
        let csr: Csr = request.into_inner().into();
        let fingerprint = Fingerprint::from_csr(&csr);

        let waiter = self
            .coordinator
            .submit(csr)
            .await
            .map_err(coordinator_error_to_status)?;

        let der = waiter
            .await
            .map_err(|_| Status::internal("signing loop dropped without resolving this request"))?
            .map_err(coordinator_error_to_status)?;

        info!(%fingerprint, "issued certificate");
        Ok(Response::new(CertificateProto {
            certificate: der.into(),
        }))
    }
}

/// Implements `SigningService.GetPartialSig`: the peer role, answered by
/// every replica regardless of whether it is the gateway for this
/// request.
pub struct SigningServer {
    coordinator: Arc<Coordinator>,
}

impl SigningServer {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }
}

#[tonic::async_trait]
impl SigningService for SigningServer {
    async fn get_partial_sig(
        &self,
        request: Request<TbsProto>,
    ) -> std::result::Result<Response<SigShareProto>, Status> {
        let (fingerprint, tbs) =
            from_tbs_request(request.into_inner()).map_err(|e| Status::invalid_argument(e.to_string()))?;

        let share = self
            .coordinator
            .get_partial_sig(&fingerprint, &tbs)
            .map_err(coordinator_error_to_status)?;

        Ok(Response::new((&share).into()))
    }
}

/// Implements the opaque `ReplicationService.Send` passthrough: an
/// opaque peer-to-peer protocol consumed from the BFT engine, not
/// specified at this layer. This binding exists only so the replication
/// endpoint has a concrete transport; it feeds the payload directly
/// through this replica's own `Accept`/`Proposed`/`Exec` pipeline rather
/// than implementing any cross-replica ordering protocol, which is a
/// real consensus engine's job.
pub struct ReplicationServer {
    coordinator: Arc<Coordinator>,
}

impl ReplicationServer {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }
}

#[tonic::async_trait]
impl ReplicationService for ReplicationServer {
    async fn send(
        &self,
        request: Request<ReplicationMessage>,
    ) -> std::result::Result<Response<ReplicationMessage>, Status> {
        let payload = request.into_inner().payload;

        if !hotcert_consensus::Acceptor::accept(self.coordinator.as_ref(), &payload).await {
            warn!("replication payload rejected by Accept");
            return Err(Status::failed_precondition("command rejected"));
        }
        hotcert_consensus::Acceptor::proposed(self.coordinator.as_ref(), &payload).await;
        hotcert_consensus::Executor::exec(self.coordinator.as_ref(), &payload).await;

        Ok(Response::new(ReplicationMessage { payload }))
    }
}
