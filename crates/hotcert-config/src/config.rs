//! The replica's runtime configuration, loaded from one TOML file and
//! shared, read-only, for the lifetime of the process. An explicit
//! struct passed at construction rather than a process-wide global.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::pacemaker::PacemakerPolicy;
use crate::peer::Peer;

fn default_queue_capacity() -> usize {
    1024
}

/// Everything a replica needs to know about itself and its group,
/// deserialized from the TOML file named by `--config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// This replica's 1-based index into `peers`.
    pub id: u16,
    /// Root CA certificate file, used to verify peer TLS certs.
    #[serde(rename = "root-ca")]
    pub root_ca: PathBuf,
    /// Whether peer transports use TLS.
    #[serde(default)]
    pub tls: bool,
    /// ECDSA private key for the replication transport.
    pub privkey: PathBuf,
    /// Leader-election policy for the consensus engine.
    #[serde(default)]
    pub pacemaker: PacemakerPolicy,
    /// Fixed leader id, meaningful only when `pacemaker = "fixed"`.
    #[serde(rename = "leader-id")]
    pub leader_id: u16,
    /// Consensus view timeout, in milliseconds.
    #[serde(rename = "view-timeout")]
    pub view_timeout_ms: u64,
    /// This replica's threshold key share file.
    pub thresholdkey: PathBuf,
    /// RSA modulus size in bits (512/1024/2048/4096).
    #[serde(rename = "key-size")]
    pub key_size: usize,
    /// The group, including this replica's own entry.
    pub peers: Vec<Peer>,
    /// Capacity of `ReplicationQueue` and `SigningQueue`.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl CoordinatorConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.peers.iter().any(|p| p.id == self.id) {
            return Err(ConfigError::UnknownId { id: self.id });
        }
        if self.pacemaker == PacemakerPolicy::Fixed
            && !self.peers.iter().any(|p| p.id == self.leader_id)
        {
            return Err(ConfigError::UnknownLeader {
                leader_id: self.leader_id,
            });
        }
        Ok(())
    }

    /// This replica's own entry in `peers`.
    pub fn self_peer(&self) -> &Peer {
        self.peers
            .iter()
            .find(|p| p.id == self.id)
            .expect("validated at load time")
    }

    /// Every peer other than this replica.
    pub fn other_peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter().filter(move |p| p.id != self.id)
    }

    /// Total group size `L`.
    pub fn total(&self) -> usize {
        self.peers.len()
    }

    /// View timeout as a [`Duration`].
    pub fn view_timeout(&self) -> Duration {
        Duration::from_millis(self.view_timeout_ms)
    }

    /// Per-broadcast signing deadline: `3 * view_timeout`, generous
    /// enough to cover a full view change before giving up on a round.
    pub fn signing_deadline(&self) -> Duration {
        self.view_timeout() * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
        id = 1
        root-ca = "root.crt"
        tls = false
        privkey = "p1.key"
        pacemaker = "fixed"
        leader-id = 1
        view-timeout = 1000
        thresholdkey = "p1.thresholdkey"
        key-size = 2048

        [[peers]]
        id = 1
        pubkey = "p1.pub"
        client-address = "localhost:9001"
        replication-peer-address = "localhost:9101"
        signing-peer-address = "localhost:9201"

        [[peers]]
        id = 2
        pubkey = "p2.pub"
        client-address = "localhost:9002"
        replication-peer-address = "localhost:9102"
        signing-peer-address = "localhost:9202"
        "#
    }

    #[test]
    fn loads_a_well_formed_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hotcert.toml");
        std::fs::write(&path, sample_toml()).expect("write");

        let config = CoordinatorConfig::load(&path).expect("load");
        assert_eq!(config.id, 1);
        assert_eq!(config.total(), 2);
        assert_eq!(config.self_peer().client_address, "localhost:9001");
        assert_eq!(config.other_peers().count(), 1);
        assert_eq!(config.signing_deadline(), Duration::from_millis(3000));
    }

    #[test]
    fn rejects_an_id_with_no_matching_peer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hotcert.toml");
        std::fs::write(&path, sample_toml().replace("id = 1\n        root", "id = 9\n        root"))
            .expect("write");

        let result = CoordinatorConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::UnknownId { id: 9 })));
    }
}
