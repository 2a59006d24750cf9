//! Combining `K` verified signature shares into one RSA signature.

use num_bigint_dig::{BigInt, BigUint, ModInverse, Sign};
use num_traits::Signed;

use crate::error::{CryptoError, Result};
use crate::key::KeyMeta;
use crate::shares::SealedSigShareSet;

/// Combine a sealed (threshold-reached) set of shares into the final RSA
/// signature over `padded_digest`.
pub fn combine(meta: &KeyMeta, padded_digest: &[u8], shares: &SealedSigShareSet) -> Result<Vec<u8>> {
    let n = &meta.n;
    let delta = factorial(meta.l as u64);
    let x = BigUint::from_bytes_be(padded_digest) % n;

    let ids: Vec<u32> = shares.ids();

    // w = product_i xi_i ^ (2 * mu_i), mu_i = Delta * lambda_{0,i}^S(0).
    let mut w = BigUint::from(1u32);
    for id in &ids {
        let xi = shares.xi(*id).expect("id present in sealed set");
        let mu_i = lagrange_coefficient_at_zero(&ids, *id, &delta);
        let exponent = &mu_i * 2;
        w = (&w * mod_pow_signed(xi, &exponent, n)?) % n;
    }

    // Each share xi = x_tilde^(2*Delta*s_i) = x^(8*Delta*s_i), so
    // w = product_i xi_i^(2*mu_i) = x^(16*Delta^2*s) and w^e = x^(16*Delta^2)
    // mod n. gcd(e, 16*Delta^2) = 1 lets us recover the e-th root via
    // Bezout coefficients: a*e + b*(16*Delta^2) = 1, so y = w^b * x^a mod n
    // satisfies y^e = x mod n.
    let sixteen_delta_sq = BigInt::from(16u32) * BigInt::from_biguint(Sign::Plus, delta.clone()) * BigInt::from_biguint(Sign::Plus, delta);
    let e = BigInt::from_biguint(Sign::Plus, meta.e.clone());
    let (gcd, a, b) = extended_gcd(&e, &sixteen_delta_sq);
    if gcd != BigInt::from(1) {
        return Err(CryptoError::InvalidParameters(
            "public exponent not coprime with 16*L!^2; choose a different e".into(),
        ));
    }

    let w_b = mod_pow_signed(&w, &b, n)?;
    let x_a = mod_pow_signed(&x, &a, n)?;
    let y = (&w_b * &x_a) % n;

    let modulus_bytes = meta.modulus_bytes();
    let mut out = y.to_bytes_be();
    if out.len() < modulus_bytes {
        let mut padded = vec![0u8; modulus_bytes - out.len()];
        padded.extend_from_slice(&out);
        out = padded;
    }
    Ok(out)
}

/// `base^exp mod n` for a possibly-negative integer exponent, taking a
/// modular inverse when `exp < 0`.
fn mod_pow_signed(base: &BigUint, exp: &BigInt, n: &BigUint) -> Result<BigUint> {
    if exp.is_negative() {
        let positive_exp = (-exp).to_biguint().expect("negated BigInt is non-negative");
        let inv = base
            .mod_inverse(n)
            .and_then(|v| v.to_biguint())
            .ok_or_else(|| CryptoError::InvalidParameters("share not invertible mod n".into()))?;
        Ok(inv.modpow(&positive_exp, n))
    } else {
        let exp = exp.to_biguint().expect("non-negative BigInt");
        Ok(base.modpow(&exp, n))
    }
}

/// `Delta * lambda_{0,i}^S(0)`, always an integer because `Delta = L!`
/// absorbs every denominator a Lagrange coefficient over `{1..L}` can have.
fn lagrange_coefficient_at_zero(ids: &[u32], i: u32, delta: &BigUint) -> BigInt {
    let mut numerator = BigInt::from_biguint(Sign::Plus, delta.clone());
    let mut denominator = BigInt::from(1);
    for &j in ids {
        if j == i {
            continue;
        }
        numerator *= BigInt::from(-(j as i64));
        denominator *= BigInt::from(i as i64) - BigInt::from(j as i64);
    }
    // denominator divides numerator exactly because Delta = L! is divisible
    // by every product of differences among indices drawn from 1..=L.
    numerator / denominator
}

/// Extended Euclidean algorithm: returns `(gcd, a, b)` with `a*x + b*y = gcd`.
fn extended_gcd(x: &BigInt, y: &BigInt) -> (BigInt, BigInt, BigInt) {
    if y.is_zero() {
        return (x.clone(), BigInt::from(1), BigInt::from(0));
    }
    let (g, a1, b1) = extended_gcd(y, &(x % y));
    let q = x / y;
    (g, b1.clone(), a1 - &q * &b1)
}

fn factorial(n: u64) -> BigUint {
    (1..=n).fold(BigUint::from(1u32), |acc, i| acc * BigUint::from(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::generate_threshold_keys;
    use crate::shares::SigShareSet;
    use crate::sign::{partial_sign, verify_share};

    #[test]
    fn combines_threshold_shares_into_a_valid_signature() {
        let (keys, meta) = generate_threshold_keys(2, 3, 512).expect("keygen");
        let digest = [3u8; 32];

        let mut set = SigShareSet::new(meta.k);
        let mut sealed = None;
        for key in keys.iter().take(meta.k) {
            let share = partial_sign(key, &digest);
            verify_share(&meta, &digest, &share).expect("share verifies");
            if let Some(s) = set.insert(share) {
                sealed = Some(s);
            }
        }
        let sealed = sealed.expect("threshold reached");

        let signature = combine(&meta, &digest, &sealed).expect("combine");
        let sig_int = BigUint::from_bytes_be(&signature);
        let recovered = sig_int.modpow(&meta.e, &meta.n);
        let expected = BigUint::from_bytes_be(&digest) % &meta.n;
        assert_eq!(recovered, expected);
    }
}

#[cfg(test)]
mod proptest_any_quorum {
    use std::sync::OnceLock;

    use proptest::prelude::*;

    use super::*;
    use crate::key::ThresholdKey;
    use crate::keygen::generate_threshold_keys;
    use crate::sign::partial_sign;

    // (k=3, l=5) threshold keys, generated once: safe-prime keygen is too
    // slow to redo per proptest case, but which *subset* of 3-of-5 replicas
    // contributes shares is exactly what we want to vary.
    fn fixture() -> &'static (Vec<ThresholdKey>, KeyMeta) {
        static FIXTURE: OnceLock<(Vec<ThresholdKey>, KeyMeta)> = OnceLock::new();
        FIXTURE.get_or_init(|| generate_threshold_keys(3, 5, 512).expect("keygen"))
    }

    fn arb_subset_of_5_choose_3() -> impl Strategy<Value = Vec<usize>> {
        // Every 3-combination of {0,1,2,3,4}, picked uniformly.
        prop_oneof![
            Just(vec![0, 1, 2]),
            Just(vec![0, 1, 3]),
            Just(vec![0, 1, 4]),
            Just(vec![0, 2, 3]),
            Just(vec![0, 2, 4]),
            Just(vec![0, 3, 4]),
            Just(vec![1, 2, 3]),
            Just(vec![1, 2, 4]),
            Just(vec![1, 3, 4]),
            Just(vec![2, 3, 4]),
        ]
    }

    proptest! {
        /// Any 3-of-5 quorum of shares combines to the same valid signature,
        /// regardless of which three replicas contributed.
        #[test]
        fn any_quorum_recovers_the_digest(indices in arb_subset_of_5_choose_3(), digest in proptest::array::uniform32(any::<u8>())) {
            let (keys, meta) = fixture();

            let mut set = SigShareSet::new(meta.k);
            let mut sealed = None;
            for &i in &indices {
                if let Some(s) = set.insert(partial_sign(&keys[i], &digest)) {
                    sealed = Some(s);
                }
            }
            let sealed = sealed.expect("three shares reach the threshold");

            let signature = combine(meta, &digest, &sealed).expect("combine");
            let sig_int = BigUint::from_bytes_be(&signature);
            let recovered = sig_int.modpow(&meta.e, &meta.n);
            let expected = BigUint::from_bytes_be(&digest) % &meta.n;
            prop_assert_eq!(recovered, expected);
        }
    }
}
