//! One entry in a replica's view of the rest of the group.

use serde::{Deserialize, Serialize};

/// Public knowledge about one peer replica: how to reach it and what
/// identity to expect, shared by every replica in the same configuration
/// file's `peers` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// 1-based index into the group, matching the consensus engine's
    /// replica numbering.
    pub id: u16,
    /// This peer's ECDSA public key (replication transport identity).
    pub pubkey: String,
    /// Path or PEM blob of the TLS certificate this peer presents, when
    /// `tls = true`.
    #[serde(rename = "tls-cert", default)]
    pub tls_cert: Option<String>,
    /// Address the client endpoint listens on, `host:port`.
    #[serde(rename = "client-address")]
    pub client_address: String,
    /// Address the replication (consensus transport) endpoint listens on.
    #[serde(rename = "replication-peer-address")]
    pub replication_peer_address: String,
    /// Address the signing endpoint (`GetPartialSig`) listens on.
    #[serde(rename = "signing-peer-address")]
    pub signing_peer_address: String,
}
