//! The gateway's signing loop: drains `SigningQueue`, drives one threshold
//! signing round per request, and resolves the submitter's waiter.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use hotcert_crypto::{
    build_tbs, combine, pkcs1v15_pad_digest, splice_signature, verify_share, KeyMeta, SigShareSet,
};
use hotcert_types::Fingerprint;

use crate::broadcaster::SigningBroadcaster;
use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;

/// Run the signing loop until the coordinator's signing queue closes or
/// `cancellation` fires. Intended to run in its own dedicated task.
pub async fn run(
    coordinator: Arc<Coordinator>,
    mut queue: crate::coordinator::SigningQueueHandle,
    broadcaster: Arc<dyn SigningBroadcaster>,
    cancellation: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = cancellation.cancelled() => break,
            job = queue.receiver.recv() => job,
        };
        let Some(job) = job else {
            break;
        };

        let fingerprint = job.fingerprint;
        let outcome = sign_one(&coordinator, &broadcaster, &job.csr, fingerprint).await;

        match &outcome {
            Ok(_) => info!(%fingerprint, "certificate signed"),
            Err(err) => warn!(%fingerprint, %err, "signing failed"),
        }

        coordinator.database().with_lock(|db| {
            if let Some(info) = db.get_mut(&fingerprint) {
                info.mark_returned();
            }
        });
        coordinator.resolve(&fingerprint, outcome);
    }
}

async fn sign_one(
    coordinator: &Coordinator,
    broadcaster: &Arc<dyn SigningBroadcaster>,
    csr: &hotcert_types::Csr,
    fingerprint: Fingerprint,
) -> crate::error::Result<Vec<u8>> {
    let key = coordinator.threshold_key();
    let tbs = build_tbs(csr, key.dummy_private_key())?;
    coordinator.database().with_lock(|db| {
        if let Some(info) = db.get_mut(&fingerprint) {
            info.set_certificate(tbs.as_der().to_vec());
        }
    });

    let padded_digest = pkcs1v15_pad_digest(&tbs, &key.meta);

    let shares = tokio::time::timeout(
        coordinator.signing_deadline(),
        broadcaster.broadcast(&fingerprint, &tbs),
    )
    .await
    .unwrap_or_default();

    let sealed = collect_quorum(&key.meta, &padded_digest, shares)?;

    let signature = combine(&key.meta, &padded_digest, &sealed)?;
    let certificate = splice_signature(&tbs, &signature)?;
    Ok(certificate.into_der())
}

/// Verify each incoming share and feed it into a [`SigShareSet`],
/// dropping shares that fail verification (the source tolerates the
/// contributing peer being Byzantine rather than banning it) and
/// ignoring any shares beyond the threshold.
fn collect_quorum(
    meta: &KeyMeta,
    padded_digest: &[u8],
    shares: Vec<hotcert_types::SigShare>,
) -> crate::error::Result<hotcert_crypto::SealedSigShareSet> {
    let mut set = SigShareSet::new(meta.k);
    for share in shares {
        if verify_share(meta, padded_digest, &share).is_err() {
            error!(id = share.id, "discarding invalid signature share");
            continue;
        }
        if let Some(sealed) = set.insert(share) {
            return Ok(sealed);
        }
    }
    Err(CoordinatorError::QuorumNotReached {
        have: set.count(),
        need: meta.k,
    })
}
