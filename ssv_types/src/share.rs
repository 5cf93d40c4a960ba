use crate::duty::PublicKeyBytes;
use bls::{AggregatePublicKey, PublicKeyShare, SecretKeyShare};

/// One other operator's identity in the committee, as seen by this node.
#[derive(Clone)]
pub struct Operator {
    pub id: u64,
    pub public_key_share: PublicKeyShare,
}

/// Everything this operator knows about its place in an SSV committee for
/// one validator: its own secret share, the full operator set, and the
/// validator's reconstructed aggregate public key.
///
/// Read-only to the core (spec.md §3): the runner never mutates a `Share`,
/// it only asks it questions (`quorum_threshold`, `has_signer`, ...).
#[derive(Clone)]
pub struct Share {
    /// `t`: the minimum number of partial signatures needed to reconstruct.
    pub threshold: usize,
    pub operator_id: u64,
    pub secret_key_share: SecretKeyShare,
    pub operators: Vec<Operator>,
    pub validator_pubkey: PublicKeyBytes,
    pub validator_aggregate_pubkey: AggregatePublicKey,
    /// The fully-assembled 32-byte `DomainAttester` signing domain
    /// (spec.md §6); computing the fork-version tail is out of scope.
    pub attester_domain: [u8; 32],
}

impl Share {
    /// Committee size `n = 3f + 1`; quorum is `2f + 1`.
    pub fn committee_size(&self) -> usize {
        self.operators.len()
    }

    /// `2f + 1` for a committee of size `n = 3f + 1`.
    pub fn quorum_threshold(&self) -> usize {
        let n = self.committee_size();
        let f = (n.saturating_sub(1)) / 3;
        2 * f + 1
    }

    /// Whether `signer_id` is a recognized member of this committee.
    pub fn has_signer(&self, signer_id: u64) -> bool {
        self.operators.iter().any(|op| op.id == signer_id)
    }

    pub fn public_key_share_of(&self, signer_id: u64) -> Option<&PublicKeyShare> {
        self.operators
            .iter()
            .find(|op| op.id == signer_id)
            .map(|op| &op.public_key_share)
    }
}
