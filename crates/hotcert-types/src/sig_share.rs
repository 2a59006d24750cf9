//! Wire type for one replica's contribution to a threshold RSA signature.

use serde::{Deserialize, Serialize};

/// Shoup's signature share: a partial RSA signature plus a non-interactive
/// zero-knowledge proof of its correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigShare {
    /// The partial signature itself, `x_i`, as a big-endian integer.
    #[serde(with = "serde_bytes")]
    pub xi: Vec<u8>,
    /// Proof challenge `c`.
    #[serde(with = "serde_bytes")]
    pub c: Vec<u8>,
    /// Proof response `z`.
    #[serde(with = "serde_bytes")]
    pub z: Vec<u8>,
    /// Index of the contributing key share, `1..=L`.
    pub id: u32,
}

impl SigShare {
    /// Construct a share from its raw components.
    pub fn new(xi: Vec<u8>, c: Vec<u8>, z: Vec<u8>, id: u32) -> Self {
        Self { xi, c, z, id }
    }
}
