//! Abstraction over broadcasting `GetPartialSig` to peer replicas.
//!
//! The Coordinator drives the signing loop but knows nothing about RPC
//! transport; `hotcert-rpc` implements this trait over tonic clients, and
//! `hotcert-server` wires the two together. Keeping the dependency this
//! direction (coordinator defines the trait, rpc implements it) avoids a
//! `coordinator -> rpc -> coordinator` cycle.

use async_trait::async_trait;

use hotcert_types::{Fingerprint, SigShare, Tbs};

/// Fans `GetPartialSig(fingerprint, tbs)` out to every configured peer and
/// collects whatever valid-looking shares come back before its own
/// internal per-peer timeouts expire.
///
/// Implementations are expected to drop shares from peers that error or
/// time out rather than fail the whole call; the signing loop applies its
/// own deadline around `broadcast` and its own share verification on top.
#[async_trait]
pub trait SigningBroadcaster: Send + Sync {
    /// Broadcast one `GetPartialSig` round and return every share that
    /// came back, in arrival order.
    async fn broadcast(&self, fingerprint: &Fingerprint, tbs: &Tbs) -> Vec<SigShare>;
}
