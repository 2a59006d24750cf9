//! An in-process stand-in for the BFT engine, used by tests and
//! `hotcert-testkit`. Never wired into the `hotcert-server` binary.
//!
//! Polls each registered replica's `CommandSource` round-robin, and for
//! every command found, runs it through every replica's `Acceptor` and
//! (if a quorum accepts) `Executor`, in the same order on every replica.
//! There is no real ordering protocol here — a single task drives
//! everything serially — which is exactly what makes it useful as a
//! test double: replication is deterministic and synchronous.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::traits::ReplicaHandle;

/// Drives replication and execution across a fixed set of in-process
/// replica handles.
pub struct LocalOrderer {
    replicas: Vec<Arc<dyn ReplicaHandle>>,
    stopped: AtomicBool,
}

impl LocalOrderer {
    /// Build an orderer over `replicas`. Index order is stable and is used
    /// as the round-robin polling order.
    pub fn new(replicas: Vec<Arc<dyn ReplicaHandle>>) -> Self {
        Self {
            replicas,
            stopped: AtomicBool::new(false),
        }
    }

    /// Stop future `run_once`/`run_until_empty` calls from doing work.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Poll every replica once for a pending command and, for the first
    /// one found, drive it through accept/propose/exec on every replica.
    /// Returns `true` if a command was processed.
    pub async fn run_once(&self) -> bool {
        if self.stopped.load(Ordering::SeqCst) {
            return false;
        }
        for source in &self.replicas {
            let Some(command) = source.get().await else {
                continue;
            };
            self.replicate(&command).await;
            return true;
        }
        false
    }

    /// Drain every replica's `CommandSource` until none has anything
    /// pending, replicating each command found along the way.
    pub async fn run_until_empty(&self) -> usize {
        let mut processed = 0;
        while self.run_once().await {
            processed += 1;
        }
        processed
    }

    async fn replicate(&self, command: &[u8]) {
        let quorum = self.replicas.len() / 2 + 1;
        let mut accepted = 0;
        for replica in &self.replicas {
            if replica.accept(command).await {
                accepted += 1;
            }
        }

        if accepted < quorum {
            warn!(accepted, quorum, "command failed to reach quorum, dropping");
            return;
        }

        for replica in &self.replicas {
            replica.proposed(command).await;
        }
        for replica in &self.replicas {
            replica.exec(command).await;
        }
        debug!(accepted, quorum, "command replicated and executed");
    }
}
