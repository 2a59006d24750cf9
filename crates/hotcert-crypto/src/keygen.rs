//! Trusted-dealer generation of a threshold RSA key (Shoup's scheme).
//!
//! There is no distributed key generation here: one dealer (the
//! `hotcert-keygen` binary) knows the full private exponent momentarily,
//! splits it into `L` shares of which any `K` combine to a valid signature,
//! and discards everything except the shares themselves.

use num_bigint_dig::{BigUint, ModInverse, RandBigInt, RandPrime};
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::RsaPrivateKey;

use crate::error::{CryptoError, Result};
use crate::key::{KeyMeta, KeyShare, ThresholdKey, VerificationKey};

const PUBLIC_EXPONENT: u32 = 65537;

/// Generate a fresh `K`-of-`L` threshold RSA key, returning one
/// [`ThresholdKey`] per replica (indices `1..=l`) plus the shared
/// [`KeyMeta`] (already embedded in each returned key, but handed back
/// separately so callers that only need the public half don't have to
/// reach into a share).
///
/// `key_size` is the RSA modulus size in bits (the same modulus used for
/// both the threshold key and every replica's dummy TBS-generation key).
pub fn generate_threshold_keys(
    k: usize,
    l: usize,
    key_size: usize,
) -> Result<(Vec<ThresholdKey>, KeyMeta)> {
    if k == 0 || k > l {
        return Err(CryptoError::InvalidParameters(format!(
            "threshold {k} must be in 1..={l}"
        )));
    }

    let mut rng = OsRng;

    // p = 2p' + 1, q = 2q' + 1, both safe primes, so the order of Z_n^*'s
    // squares subgroup is p'*q' and has no small factors.
    let prime_bits = key_size / 2;
    let (p, p_prime) = gen_safe_prime(&mut rng, prime_bits);
    let (q, q_prime) = gen_safe_prime(&mut rng, prime_bits);
    let n = &p * &q;
    let m = &p_prime * &q_prime;

    let e = BigUint::from(PUBLIC_EXPONENT);
    let d = e
        .clone()
        .mod_inverse(&m)
        .and_then(|v| v.to_biguint())
        .ok_or_else(|| CryptoError::InvalidParameters("e not invertible mod m".into()))?;

    // Random polynomial f(x) = d + a_1 x + ... + a_{k-1} x^{k-1} mod m,
    // Shamir-shared so f(0) = d.
    let mut coefficients = Vec::with_capacity(k);
    coefficients.push(d.clone());
    for _ in 1..k {
        coefficients.push(rng.gen_biguint_below(&m));
    }

    let shares: Vec<BigUint> = (1..=l as u64)
        .map(|i| eval_polynomial(&coefficients, &BigUint::from(i), &m))
        .collect();

    // v generates the squares subgroup of Z_n^*: any random unit, squared.
    let r = rng.gen_biguint_below(&n);
    let v = r.modpow(&BigUint::from(2u32), &n);
    let u = v.modpow(&d, &n);
    let u_i: Vec<BigUint> = shares.iter().map(|s_i| v.modpow(s_i, &n)).collect();

    let meta = KeyMeta {
        n: n.clone(),
        e,
        k,
        l,
        verification_key: VerificationKey { v, u, u_i },
    };

    let mut keys = Vec::with_capacity(l);
    for (idx, s_i) in shares.into_iter().enumerate() {
        let share = KeyShare {
            index: (idx + 1) as u32,
            s_i,
        };
        let dummy = RsaPrivateKey::new(&mut rng, key_size)
            .map_err(CryptoError::Rsa)?;
        keys.push(ThresholdKey::new(share, meta.clone(), dummy));
    }

    Ok((keys, meta))
}

fn eval_polynomial(coefficients: &[BigUint], x: &BigUint, modulus: &BigUint) -> BigUint {
    let mut acc = BigUint::zero();
    for coeff in coefficients.iter().rev() {
        acc = (&acc * x + coeff) % modulus;
    }
    acc
}

/// Generate a safe prime `p = 2p' + 1` of roughly `bits` bits, returning
/// both `p` and `p'`.
fn gen_safe_prime(rng: &mut OsRng, bits: usize) -> (BigUint, BigUint) {
    loop {
        let p_prime = rng.gen_prime(bits - 1);
        let p = &p_prime * BigUint::from(2u32) + BigUint::one();
        if num_bigint_dig::prime::probably_prime(&p, 20) {
            return (p, p_prime);
        }
    }
}

#[allow(dead_code)]
fn random_nonzero_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}
