//! Type-state collection of signature shares for one signing request.
//!
//! Mirrors the sealed/unsealed pattern used elsewhere in this workspace
//! for quorum collection: [`SigShareSet`] accepts shares until the
//! threshold is reached, at which point it seals into a
//! [`SealedSigShareSet`] — the only type `combine` accepts, so the type
//! system proves a quorum was present before combination is possible.

use std::collections::BTreeMap;

use hotcert_types::SigShare;

/// Unsealed share set: accepts shares from distinct indices until the
/// threshold is reached.
#[derive(Debug, Clone)]
pub struct SigShareSet {
    threshold: usize,
    shares: BTreeMap<u32, SigShare>,
}

impl SigShareSet {
    /// Create a collector that seals once `threshold` distinct shares have
    /// been inserted.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            shares: BTreeMap::new(),
        }
    }

    /// Insert a share (already verified by the caller). Returns
    /// `Some(sealed)` the moment the threshold is first reached; later
    /// calls keep accumulating extra shares but never re-seal.
    pub fn insert(&mut self, share: SigShare) -> Option<SealedSigShareSet> {
        self.shares.entry(share.id).or_insert(share);
        if self.shares.len() >= self.threshold {
            Some(SealedSigShareSet {
                shares: self.shares.clone(),
            })
        } else {
            None
        }
    }

    /// Number of distinct shares collected so far.
    pub fn count(&self) -> usize {
        self.shares.len()
    }
}

/// Sealed share set: type-level proof that at least `threshold` shares
/// were collected. The only type `combine` accepts.
#[derive(Debug, Clone)]
pub struct SealedSigShareSet {
    shares: BTreeMap<u32, SigShare>,
}

impl SealedSigShareSet {
    /// Indices of the shares in this set, in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        self.shares.keys().copied().collect()
    }

    /// The `xi` component of the share at `id`, if present.
    pub fn xi(&self, id: u32) -> Option<num_bigint_dig::BigUint> {
        self.shares
            .get(&id)
            .map(|s| num_bigint_dig::BigUint::from_bytes_be(&s.xi))
    }

    /// Number of shares sealed into this set.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Whether this set is empty — never true for a set produced by
    /// [`SigShareSet::insert`], but useful for defensive callers.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(id: u32) -> SigShare {
        SigShare::new(vec![id as u8], vec![0], vec![0], id)
    }

    #[test]
    fn seals_exactly_at_threshold() {
        let mut set = SigShareSet::new(2);
        assert!(set.insert(share(1)).is_none());
        let sealed = set.insert(share(2));
        assert!(sealed.is_some());
        assert_eq!(sealed.unwrap().len(), 2);
    }

    #[test]
    fn duplicate_index_does_not_double_count() {
        let mut set = SigShareSet::new(2);
        set.insert(share(1));
        set.insert(share(1));
        assert_eq!(set.count(), 1);
    }
}
