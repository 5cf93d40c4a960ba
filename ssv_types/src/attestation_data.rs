use crate::{CommitteeIndex, Hash256, Slot};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A beacon-chain checkpoint: an epoch and the root of its first slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Checkpoint {
    pub epoch: u64,
    pub root: Hash256,
}

/// The object a quorum of operators reaches consensus on and signs.
///
/// SSZ-serializable per spec.md §3; once cached for a slot its non-index
/// fields are immutable, but `index` is overwritten per-consumer (see
/// spec.md §9 and [`crate::attestation_data::AttestationData::with_index`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: CommitteeIndex,
    pub beacon_block_root: Hash256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

impl AttestationData {
    /// Returns a copy with `index` overwritten to `committee_index`.
    ///
    /// spec.md §9 permits either mutating the cached struct in place (the
    /// original Go source's approach) or copying before overwriting; this
    /// crate always copies, which is the design note's recommended, safer
    /// strategy and what makes scenario 6 (concurrent distinct committee
    /// indices for the same cached slot) trivially correct: each caller
    /// gets an independent value, so there is no window between "overwrite"
    /// and "marshal" for another task to interleave in.
    pub fn with_index(&self, committee_index: u64) -> Self {
        let mut copy = self.clone();
        copy.index = CommitteeIndex::new(committee_index);
        copy
    }
}
