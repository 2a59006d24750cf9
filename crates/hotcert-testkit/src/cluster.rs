//! An in-memory N-replica cluster, wired through one [`LocalOrderer`] and
//! one [`ClusterBroadcaster`], for exercising the Coordinator end to end
//! without a real BFT engine or gRPC transport.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hotcert_consensus::{LocalOrderer, ReplicaHandle};
use hotcert_coordinator::{run_signing_loop, Coordinator, Settings};
use hotcert_crypto::{generate_threshold_keys, KeyMeta, ThresholdKey};
use hotcert_types::Csr;

use crate::broadcaster::ClusterBroadcaster;

/// A running cluster of `l` coordinators sharing one threshold key setup
/// with threshold `k`.
pub struct Cluster {
    pub coordinators: Vec<Arc<Coordinator>>,
    pub meta: KeyMeta,
    orderer: LocalOrderer,
    down: Arc<StdMutex<HashSet<usize>>>,
    cancellation: CancellationToken,
    signing_tasks: Vec<JoinHandle<()>>,
}

impl Cluster {
    /// Start a cluster with `l` replicas, threshold `k`, and the given RSA
    /// modulus size. Uses a small `key_size` in tests; production deploys
    /// a much larger modulus (see `hotcert-keygen`).
    pub async fn start(k: usize, l: usize, key_size: usize) -> Self {
        let (keys, meta) = generate_threshold_keys(k, l, key_size).expect("keygen");
        Self::start_with_keys(keys, meta).await
    }

    async fn start_with_keys(keys: Vec<ThresholdKey>, meta: KeyMeta) -> Self {
        let cancellation = CancellationToken::new();
        let down = Arc::new(StdMutex::new(HashSet::new()));

        let settings = Settings {
            queue_capacity: 64,
            signing_deadline: Duration::from_secs(5),
        };

        let mut coordinators = Vec::with_capacity(keys.len());
        let mut handles = Vec::with_capacity(keys.len());
        for key in keys {
            let (coordinator, handle) =
                Coordinator::new(settings.clone(), cancellation.clone(), Arc::new(key));
            coordinators.push(coordinator);
            handles.push(handle);
        }

        let broadcaster: Arc<dyn hotcert_coordinator::SigningBroadcaster> = Arc::new(
            ClusterBroadcaster::new(coordinators.clone(), down.clone()),
        );

        let signing_tasks = coordinators
            .iter()
            .cloned()
            .zip(handles)
            .map(|(coordinator, handle)| {
                let broadcaster = broadcaster.clone();
                let cancellation = cancellation.clone();
                tokio::spawn(run_signing_loop(coordinator, handle, broadcaster, cancellation))
            })
            .collect();

        let replicas: Vec<Arc<dyn ReplicaHandle>> = coordinators
            .iter()
            .cloned()
            .map(|c| c as Arc<dyn ReplicaHandle>)
            .collect();
        let orderer = LocalOrderer::new(replicas);

        Self {
            coordinators,
            meta,
            orderer,
            down,
            cancellation,
            signing_tasks,
        }
    }

    /// Mark replica `index` (0-based) as unresponsive: the orderer still
    /// calls its `Acceptor`/`Executor` methods (it is still a correct,
    /// running replica for consensus purposes), but
    /// [`ClusterBroadcaster`] skips it when fanning out `GetPartialSig`,
    /// simulating a signing peer that has stopped answering RPCs.
    pub fn stop_signer(&self, index: usize) {
        self.down.lock().expect("down set mutex poisoned").insert(index);
    }

    pub fn start_signer(&self, index: usize) {
        self.down.lock().expect("down set mutex poisoned").remove(&index);
    }

    /// Submit a CSR through replica `gateway` (0-based) and wait for its
    /// outcome.
    pub async fn submit(
        &self,
        gateway: usize,
        csr: Csr,
    ) -> hotcert_coordinator::Result<Vec<u8>> {
        let rx = self.coordinators[gateway]
            .submit(csr)
            .await
            .expect("submit enqueues onto a capacity-64 channel");
        self.orderer.run_until_empty().await;
        rx.await.expect("signing loop resolves every registered waiter")
    }

    /// Drain the replication queue without waiting on any particular
    /// outcome; useful for the replay-rejection scenario, which inspects
    /// `Accept`'s return value rather than a certificate.
    pub async fn drain(&self) {
        self.orderer.run_until_empty().await;
    }

    pub async fn shutdown(self) {
        self.cancellation.cancel();
        for task in self.signing_tasks {
            let _ = task.await;
        }
    }
}
