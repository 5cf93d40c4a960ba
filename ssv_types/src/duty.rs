use crate::Slot;
use serde::{Deserialize, Serialize};

/// 48-byte compressed BLS12-381 public key, used both for the aggregate
/// validator key and for individual operator key shares.
pub type PublicKeyBytes = [u8; 48];

/// The only role this core handles (spec.md §1 scopes out every other SSV
/// duty type — sync committee, proposer, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Attester,
}

/// An attester duty handed down by the beacon-chain scheduler.
///
/// Immutable once created (spec.md §3): nothing inside `ssv_runner` mutates
/// a `Duty` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duty {
    pub validator_pubkey: PublicKeyBytes,
    pub committee_index: u64,
    pub committee_length: u64,
    /// This validator's index within the attesting committee; the single
    /// bit it sets in the aggregation bitlist on submission.
    pub validator_committee_index: u64,
    pub slot: Slot,
    pub role: Role,
}

impl Duty {
    pub fn new(
        validator_pubkey: PublicKeyBytes,
        committee_index: u64,
        committee_length: u64,
        validator_committee_index: u64,
        slot: Slot,
    ) -> Self {
        Self {
            validator_pubkey,
            committee_index,
            committee_length,
            validator_committee_index,
            slot,
            role: Role::Attester,
        }
    }
}
