//! The Coordinator: per-replica request database, queues, and the three
//! consensus adapter roles.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hotcert_consensus::{Acceptor, CommandSource, Executor};
use hotcert_crypto::{partial_sign, pkcs1v15_pad_digest, verify_share, ThresholdKey};
use hotcert_types::{Csr, Fingerprint, RequestInfo, SigShare, Tbs};

use crate::database::Database;
use crate::error::{CoordinatorError, Result};
use crate::validator::{AlwaysValid, CsrValidator};

/// Runtime tuning knobs the binary wires in from configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Capacity of `ReplicationQueue` and `SigningQueue`.
    pub queue_capacity: usize,
    /// Deadline for one `GetPartialSig` broadcast round, default
    /// `3 * view_timeout` per the engine's pacemaker.
    pub signing_deadline: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            signing_deadline: Duration::from_secs(30),
        }
    }
}

/// One pending signing job, as handed to the dedicated signing-loop task
/// consuming `SigningQueue`.
pub struct SigningJob {
    pub fingerprint: Fingerprint,
    pub csr: Csr,
}

/// Handle to the signing loop's consuming end of `SigningQueue`. Owned
/// exclusively by whichever task runs [`crate::signing_loop::run`].
pub struct SigningQueueHandle {
    pub(crate) receiver: mpsc::Receiver<SigningJob>,
}

/// Per-replica coordinator: owns the request database and the three
/// bounded queues (`ReplicationQueue`, `SigningQueue`, and the per-request
/// waiters that stand in for `FinishedCerts`; see `DESIGN.md`).
pub struct Coordinator {
    database: Database,
    replication_tx: mpsc::Sender<Vec<u8>>,
    replication_rx: AsyncMutex<mpsc::Receiver<Vec<u8>>>,
    signing_tx: mpsc::Sender<SigningJob>,
    waiters: StdMutex<std::collections::HashMap<Fingerprint, oneshot::Sender<Result<Vec<u8>>>>>,
    validator: Box<dyn CsrValidator>,
    cancellation: CancellationToken,
    settings: Settings,
    threshold_key: Arc<ThresholdKey>,
}

impl Coordinator {
    /// Construct a Coordinator and the signing queue handle its signing
    /// loop task should be started with.
    pub fn new(
        settings: Settings,
        cancellation: CancellationToken,
        threshold_key: Arc<ThresholdKey>,
    ) -> (Arc<Self>, SigningQueueHandle) {
        Self::with_validator(settings, cancellation, threshold_key, Box::new(AlwaysValid))
    }

    /// Construct a Coordinator with a custom [`CsrValidator`].
    pub fn with_validator(
        settings: Settings,
        cancellation: CancellationToken,
        threshold_key: Arc<ThresholdKey>,
        validator: Box<dyn CsrValidator>,
    ) -> (Arc<Self>, SigningQueueHandle) {
        let (replication_tx, replication_rx) = mpsc::channel(settings.queue_capacity);
        let (signing_tx, signing_rx) = mpsc::channel(settings.queue_capacity);

        let coordinator = Arc::new(Self {
            database: Database::new(),
            replication_tx,
            replication_rx: AsyncMutex::new(replication_rx),
            signing_tx,
            waiters: StdMutex::new(std::collections::HashMap::new()),
            validator,
            cancellation,
            settings,
            threshold_key,
        });

        (coordinator, SigningQueueHandle { receiver: signing_rx })
    }

    /// Signing broadcast deadline configured for this replica.
    pub fn signing_deadline(&self) -> Duration {
        self.settings.signing_deadline
    }

    /// This replica's own threshold key share, used both by the signing
    /// loop (driving the gateway side of a round) and [`Self::get_partial_sig`]
    /// (the peer side, answering `GetPartialSig`).
    pub fn threshold_key(&self) -> &Arc<ThresholdKey> {
        &self.threshold_key
    }

    /// Submit a freshly received client request (gateway path): enqueues
    /// it on `ReplicationQueue` and inserts `{received=true}` keyed by its
    /// fingerprint, then registers a waiter that resolves once the
    /// signing loop finishes (or fails) this fingerprint.
    ///
    /// Enqueueing may suspend if `ReplicationQueue` is full (backpressure).
    pub async fn submit(&self, csr: Csr) -> Result<oneshot::Receiver<Result<Vec<u8>>>> {
        let fingerprint = Fingerprint::from_csr(&csr);
        let (tx, rx) = oneshot::channel();
        {
            let mut waiters = self.waiters.lock().expect("waiters mutex poisoned");
            waiters.insert(fingerprint, tx);
        }
        self.database.with_lock(|db| {
            db.entry(fingerprint).or_insert_with(|| RequestInfo::received(csr.clone()));
        });
        self.replication_tx
            .send(csr.encode())
            .await
            .map_err(|_| CoordinatorError::ChannelClosed)?;
        Ok(rx)
    }

    /// Peer role handler for `GetPartialSig`: authorize, produce a partial
    /// signature, and mark this fingerprint `signed=true`.
    pub fn authorize_signing_request(&self, fingerprint: &Fingerprint) -> Result<()> {
        self.database.with_lock(|db| match db.get(fingerprint) {
            Some(info) if info.validated_flag() => Ok(()),
            Some(_) => Err(CoordinatorError::NotValidated),
            None => Err(CoordinatorError::NotFound(fingerprint.to_hex())),
        })
    }

    /// Full `GetPartialSig` handler: authorize the request, produce this
    /// replica's partial signature over `tbs`, self-verify it before
    /// handing it back (a malformed share from this replica would only be
    /// caught by the gateway otherwise), and mark `signed=true`.
    pub fn get_partial_sig(&self, fingerprint: &Fingerprint, tbs: &Tbs) -> Result<SigShare> {
        self.authorize_signing_request(fingerprint)?;

        let padded_digest = pkcs1v15_pad_digest(tbs, &self.threshold_key.meta);
        let share = partial_sign(&self.threshold_key, &padded_digest);
        verify_share(&self.threshold_key.meta, &padded_digest, &share)?;

        self.mark_signed(fingerprint);
        Ok(share)
    }

    /// Record that this fingerprint's partial signature has been served.
    pub fn mark_signed(&self, fingerprint: &Fingerprint) {
        self.database.with_lock(|db| {
            if let Some(info) = db.get_mut(fingerprint) {
                info.mark_signed();
            }
        });
    }

    /// Resolve the waiter registered by `submit`, if any. Called by the
    /// signing loop once a fingerprint's outcome (success or failure) is
    /// known. A missing waiter (non-gateway replica, or already resolved)
    /// is not an error.
    pub(crate) fn resolve(&self, fingerprint: &Fingerprint, outcome: Result<Vec<u8>>) {
        let waiter = {
            let mut waiters = self.waiters.lock().expect("waiters mutex poisoned");
            waiters.remove(fingerprint)
        };
        if let Some(tx) = waiter {
            let _ = tx.send(outcome);
        }
    }

    pub(crate) fn database(&self) -> &Database {
        &self.database
    }
}

#[async_trait]
impl CommandSource for Coordinator {
    async fn get(&self) -> Option<Vec<u8>> {
        if self.cancellation.is_cancelled() {
            return None;
        }
        let mut rx = self.replication_rx.lock().await;
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => None,
            command = rx.recv() => command,
        }
    }
}

#[async_trait]
impl Acceptor for Coordinator {
    async fn accept(&self, command: &[u8]) -> bool {
        if command.is_empty() {
            return true;
        }
        let csr = match Csr::decode(command) {
            Ok(csr) => csr,
            Err(err) => {
                warn!(%err, "failed to decode command in Accept");
                return false;
            }
        };
        let fingerprint = Fingerprint::from_csr(&csr);
        let valid = self.validator.validate(&csr);

        self.database.with_lock(|db| match db.get_mut(&fingerprint) {
            None => {
                let mut info = RequestInfo::accepted(csr);
                if valid {
                    info.mark_validated();
                }
                db.insert(fingerprint, info);
                valid
            }
            Some(info) if info.proposed_flag() => false,
            Some(info) => {
                if valid {
                    info.mark_validated();
                }
                valid
            }
        })
    }

    async fn proposed(&self, command: &[u8]) {
        if command.is_empty() {
            return;
        }
        let Ok(csr) = Csr::decode(command) else {
            warn!("failed to decode command in Proposed");
            return;
        };
        let fingerprint = Fingerprint::from_csr(&csr);
        self.database.with_lock(|db| {
            if let Some(info) = db.get_mut(&fingerprint) {
                info.mark_proposed();
            }
        });
    }
}

#[async_trait]
impl Executor for Coordinator {
    async fn exec(&self, command: &[u8]) {
        if command.is_empty() {
            return;
        }
        let Ok(csr) = Csr::decode(command) else {
            warn!("failed to decode command in Exec");
            return;
        };
        let fingerprint = Fingerprint::from_csr(&csr);

        let is_gateway = self.database.with_lock(|db| {
            let Some(info) = db.get_mut(&fingerprint) else {
                warn!(%fingerprint, "Exec for unknown fingerprint");
                return false;
            };
            info.mark_replicated();
            info.is_gateway()
        });

        if is_gateway {
            if let Err(err) = self
                .signing_tx
                .send(SigningJob { fingerprint, csr })
                .await
            {
                warn!(%fingerprint, %err, "failed to enqueue signing job, channel closed");
            } else {
                debug!(%fingerprint, "enqueued for signing");
            }
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator").finish_non_exhaustive()
    }
}

/// Log a startup line summarizing this replica's queue configuration.
pub fn log_settings(settings: &Settings) {
    info!(
        queue_capacity = settings.queue_capacity,
        signing_deadline_secs = settings.signing_deadline.as_secs(),
        "coordinator configured"
    );
}
