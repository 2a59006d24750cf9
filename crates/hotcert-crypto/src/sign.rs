//! Partial signature generation and verification (Shoup's TC-RSA scheme).

use num_bigint_dig::{BigUint, ModInverse, RandBigInt};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use hotcert_types::SigShare;

use crate::error::{CryptoError, Result};
use crate::key::{KeyMeta, ThresholdKey};

/// Security parameter (bits) for the zero-knowledge proof's random
/// commitment, added on top of the modulus size so `z` statistically
/// hides `s_i`.
const PROOF_SLACK_BITS: usize = 128;

/// Compute this replica's partial signature over an already-hashed,
/// PKCS#1-v1.5-padded message.
pub fn partial_sign(key: &ThresholdKey, padded_digest: &[u8]) -> SigShare {
    let n = &key.meta.n;
    let delta = factorial(key.meta.l as u64);
    let x = BigUint::from_bytes_be(padded_digest) % n;
    let x_tilde = x.modpow(&BigUint::from(4u32), n);

    let exponent = BigUint::from(2u32) * &delta * &key.share.s_i;
    let xi = x_tilde.modpow(&exponent, n);

    let mut rng = OsRng;
    let r = rng.gen_biguint(n.bits() + PROOF_SLACK_BITS);

    let v = &key.meta.verification_key.v;
    let v_prime = v.modpow(&r, n);
    let x_prime = x_tilde.modpow(&(BigUint::from(4u32) * &r), n);
    let v_i = &key.meta.verification_key.u_i[(key.share.index - 1) as usize];
    let xi_sq = xi.modpow(&BigUint::from(2u32), n);

    let c = proof_challenge(v, &x_tilde, v_i, &xi_sq, &v_prime, &x_prime);
    let z = r + &c * &key.share.s_i;

    SigShare::new(xi.to_bytes_be(), c.to_bytes_be(), z.to_bytes_be(), key.share.index)
}

/// Verify a share's zero-knowledge proof without learning the contributing
/// share's secret.
pub fn verify_share(meta: &KeyMeta, padded_digest: &[u8], share: &SigShare) -> Result<()> {
    let n = &meta.n;
    let idx = share.id as usize;
    if idx == 0 || idx > meta.verification_key.u_i.len() {
        return Err(CryptoError::InvalidShare { id: share.id });
    }
    let v_i = &meta.verification_key.u_i[idx - 1];

    let x = BigUint::from_bytes_be(padded_digest) % n;
    let x_tilde = x.modpow(&BigUint::from(4u32), n);

    let xi = BigUint::from_bytes_be(&share.xi);
    let c = BigUint::from_bytes_be(&share.c);
    let z = BigUint::from_bytes_be(&share.z);

    let v = &meta.verification_key.v;
    let v_z = v.modpow(&z, n);
    let v_i_c_inv = mod_pow_inv(v_i, &c, n)?;
    let v_prime = (&v_z * &v_i_c_inv) % n;

    let x_tilde_4z = x_tilde.modpow(&(BigUint::from(4u32) * &z), n);
    let xi_sq = xi.modpow(&BigUint::from(2u32), n);
    let xi_2c_inv = mod_pow_inv(&xi_sq, &c, n)?;
    let x_prime = (&x_tilde_4z * &xi_2c_inv) % n;

    let expected = proof_challenge(v, &x_tilde, v_i, &xi_sq, &v_prime, &x_prime);
    if expected == c {
        Ok(())
    } else {
        Err(CryptoError::InvalidShare { id: share.id })
    }
}

/// `base^(-exp) mod n`, via modular inverse of `base^exp mod n`.
fn mod_pow_inv(base: &BigUint, exp: &BigUint, n: &BigUint) -> Result<BigUint> {
    let positive = base.modpow(exp, n);
    positive
        .mod_inverse(n)
        .and_then(|v| v.to_biguint())
        .ok_or_else(|| CryptoError::InvalidParameters("share value not invertible mod n".into()))
}

fn proof_challenge(
    v: &BigUint,
    x_tilde: &BigUint,
    v_i: &BigUint,
    xi_sq: &BigUint,
    v_prime: &BigUint,
    x_prime: &BigUint,
) -> BigUint {
    let mut hasher = Sha256::new();
    for part in [v, x_tilde, v_i, xi_sq, v_prime, x_prime] {
        let bytes = part.to_bytes_be();
        hasher.update((bytes.len() as u32).to_be_bytes());
        hasher.update(&bytes);
    }
    BigUint::from_bytes_be(&hasher.finalize())
}

fn factorial(n: u64) -> BigUint {
    (1..=n).fold(BigUint::from(1u32), |acc, i| acc * BigUint::from(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::generate_threshold_keys;

    #[test]
    fn a_valid_share_verifies() {
        let (keys, meta) = generate_threshold_keys(2, 3, 512).expect("keygen");
        let digest = [7u8; 32];
        let share = partial_sign(&keys[0], &digest);
        verify_share(&meta, &digest, &share).expect("share should verify");
    }

    #[test]
    fn a_tampered_share_fails() {
        let (keys, meta) = generate_threshold_keys(2, 3, 512).expect("keygen");
        let digest = [7u8; 32];
        let mut share = partial_sign(&keys[0], &digest);
        share.xi[0] ^= 0xff;
        assert!(verify_share(&meta, &digest, &share).is_err());
    }
}
