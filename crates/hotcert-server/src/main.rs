//! The HotCertification replica process: loads this replica's
//! configuration and threshold key, then serves the client, signing, and
//! replication endpoints off one shared `Coordinator`.
//!
//! There is no real BFT engine wired in here, since consensus ordering
//! is treated as an external collaborator; the replication endpoint
//! instead runs each accepted command directly through this replica's
//! own `Accept`/`Proposed`/`Exec` pipeline (see
//! `hotcert_rpc::ReplicationServer`), which is sufficient for
//! single-replica (`K=L=1`) deployments and as the integration point a
//! real engine's adapter wiring would replace.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use hotcert_config::{CoordinatorConfig, ServerArgs};
use hotcert_coordinator::{log_settings, run_signing_loop, Coordinator, Settings};
use hotcert_crypto::read_threshold_key_file;
use hotcert_rpc::proto::certification_service_server::CertificationServiceServer;
use hotcert_rpc::proto::replication_service_server::ReplicationServiceServer;
use hotcert_rpc::proto::signing_service_server::SigningServiceServer;
use hotcert_rpc::{CertificationServer, GrpcSigningBroadcaster, ReplicationServer, SigningServer};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = ServerArgs::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ServerArgs) -> anyhow::Result<()> {
    let mut config = CoordinatorConfig::load(&args.config)?;
    if let Some(id) = args.id {
        config.id = id;
    }
    if let Some(thresholdkey) = args.thresholdkey {
        config.thresholdkey = thresholdkey;
    }
    if let Some(privkey) = args.privkey {
        config.privkey = privkey;
    }

    let threshold_key = Arc::new(read_threshold_key_file(&config.thresholdkey)?);
    info!(id = config.id, k = threshold_key.meta.k, l = threshold_key.meta.l, "loaded threshold key");

    let settings = Settings {
        queue_capacity: config.queue_capacity,
        signing_deadline: config.signing_deadline(),
    };
    log_settings(&settings);

    let cancellation = CancellationToken::new();
    let (coordinator, signing_queue) = Coordinator::new(settings, cancellation.clone(), threshold_key);

    let peer_signing_addrs: Vec<String> = config
        .other_peers()
        .map(|p| p.signing_peer_address.clone())
        .collect();
    let broadcaster = Arc::new(GrpcSigningBroadcaster::new(peer_signing_addrs));

    let signing_task = tokio::spawn(run_signing_loop(
        coordinator.clone(),
        signing_queue,
        broadcaster,
        cancellation.clone(),
    ));

    let client_addr: SocketAddr = config.self_peer().client_address.parse()?;
    let signing_addr: SocketAddr = config.self_peer().signing_peer_address.parse()?;
    let replication_addr: SocketAddr = config.self_peer().replication_peer_address.parse()?;

    let client_task = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(CertificationServiceServer::new(CertificationServer::new(
                coordinator.clone(),
            )))
            .serve_with_shutdown(client_addr, cancellation.clone().cancelled_owned()),
    );

    let signing_server_task = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(SigningServiceServer::new(SigningServer::new(coordinator.clone())))
            .serve_with_shutdown(signing_addr, cancellation.clone().cancelled_owned()),
    );

    let replication_task = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(ReplicationServiceServer::new(ReplicationServer::new(
                coordinator.clone(),
            )))
            .serve_with_shutdown(replication_addr, cancellation.clone().cancelled_owned()),
    );

    info!(%client_addr, %signing_addr, %replication_addr, "replica listening");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT, shutting down");
        }
        _ = cancellation.cancelled() => {}
    }

    cancellation.cancel();
    let _ = tokio::join!(client_task, signing_server_task, replication_task, signing_task);
    Ok(())
}
