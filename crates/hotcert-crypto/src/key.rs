//! Threshold RSA key material: the trusted dealer's public setup plus each
//! replica's private share.

use num_bigint_dig::BigUint;
use rsa::RsaPrivateKey;
use zeroize::Zeroize;

/// The shared, public half of the threshold setup. Identical on every
/// replica; only `KeyShare` differs between them.
#[derive(Debug, Clone)]
pub struct KeyMeta {
    /// RSA modulus `n`.
    pub n: BigUint,
    /// RSA public exponent `e`.
    pub e: BigUint,
    /// Signing threshold `K` (number of shares required to combine).
    pub k: usize,
    /// Total number of shares `L`.
    pub l: usize,
    /// Verification key used to check individual shares' zero-knowledge
    /// proofs without learning the shares themselves.
    pub verification_key: VerificationKey,
}

impl KeyMeta {
    /// RSA modulus bit length, used to size padding and output buffers.
    pub fn modulus_bits(&self) -> usize {
        self.n.bits()
    }

    /// Byte length of the modulus, rounded up.
    pub fn modulus_bytes(&self) -> usize {
        (self.modulus_bits() + 7) / 8
    }
}

/// Shoup's verification key: a generator `v` of the squares subgroup of
/// `Z_n^*`, its image `u` under the public exponent, and one verification
/// value `u_i` per share index.
#[derive(Debug, Clone)]
pub struct VerificationKey {
    /// Generator of the quadratic residues subgroup of `Z_n^*`.
    pub v: BigUint,
    /// `v` raised to the secret exponent; unused by the current scheme but
    /// retained for wire compatibility with the original key format.
    pub u: BigUint,
    /// `u_i = v^{s_i} mod n` for each share index `1..=L`, 0-indexed here.
    pub u_i: Vec<BigUint>,
}

/// One replica's private contribution to the threshold key.
#[derive(Debug, Clone)]
pub struct KeyShare {
    /// This share's index, `1..=L`.
    pub index: u32,
    /// The secret share `s_i` of the RSA private exponent.
    pub s_i: BigUint,
}

impl Drop for KeyShare {
    fn drop(&mut self) {
        // BigUint has no Zeroize impl; best effort: overwrite the backing
        // digits via a fresh zero value so the old allocation is dropped.
        self.s_i = BigUint::from(0u32);
    }
}

/// A fully loaded threshold key: the public metadata, this replica's
/// private share, and a per-replica dummy RSA key used only to produce
/// canonical TBS certificate bytes before the real signature is spliced
/// in (see `hotcert-crypto::cert`).
pub struct ThresholdKey {
    pub share: KeyShare,
    pub meta: KeyMeta,
    dummy_priv: RsaPrivateKey,
}

impl ThresholdKey {
    /// Assemble a threshold key from its share, metadata, and dummy signer.
    pub fn new(share: KeyShare, meta: KeyMeta, dummy_priv: RsaPrivateKey) -> Self {
        Self {
            share,
            meta,
            dummy_priv,
        }
    }

    /// This replica's share index.
    pub fn index(&self) -> u32 {
        self.share.index
    }

    /// The per-replica dummy RSA key used to drive a standard X.509 library
    /// into emitting canonical `TBSCertificate` bytes.
    pub fn dummy_private_key(&self) -> &RsaPrivateKey {
        &self.dummy_priv
    }
}

impl std::fmt::Debug for ThresholdKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdKey")
            .field("index", &self.share.index)
            .field("k", &self.meta.k)
            .field("l", &self.meta.l)
            .finish_non_exhaustive()
    }
}
