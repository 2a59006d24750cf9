//! A [`SigningBroadcaster`] that calls peer `Coordinator`s in-process,
//! standing in for the `GetPartialSig` gRPC fan-out in tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tracing::debug;

use hotcert_coordinator::{Coordinator, SigningBroadcaster};
use hotcert_types::{Fingerprint, SigShare, Tbs};

/// Broadcasts to every coordinator in `replicas` except those whose index
/// is currently marked down (simulating a stopped/faulty peer).
pub struct ClusterBroadcaster {
    replicas: Vec<Arc<Coordinator>>,
    down: Arc<StdMutex<HashSet<usize>>>,
}

impl ClusterBroadcaster {
    pub fn new(replicas: Vec<Arc<Coordinator>>, down: Arc<StdMutex<HashSet<usize>>>) -> Self {
        Self { replicas, down }
    }
}

#[async_trait]
impl SigningBroadcaster for ClusterBroadcaster {
    async fn broadcast(&self, fingerprint: &Fingerprint, tbs: &Tbs) -> Vec<SigShare> {
        let down = self.down.lock().expect("down set mutex poisoned").clone();
        let calls = self
            .replicas
            .iter()
            .enumerate()
            .filter(|(index, _)| !down.contains(index))
            .map(|(_, replica)| {
                let replica = replica.clone();
                let fingerprint = *fingerprint;
                let tbs = tbs.clone();
                async move { replica.get_partial_sig(&fingerprint, &tbs) }
            });

        futures::future::join_all(calls)
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(share) => Some(share),
                Err(err) => {
                    debug!(%err, "peer declined GetPartialSig");
                    None
                }
            })
            .collect()
    }
}
