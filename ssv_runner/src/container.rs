//! Partial-signature aggregation and threshold reconstruction (spec.md
//! §4.B).

use crate::error::{AddPartialOutcome, ContainerError};
use bls::{reconstruct, AggregatePublicKey, PartialSignature, Signature};
use ssv_types::Share;
use std::collections::HashMap;

/// Partial signatures collected for one signing root, keyed by signer id so
/// each signer can contribute at most once (spec.md §3).
#[derive(Default)]
struct RootEntry {
    signatures: HashMap<u64, Signature>,
}

/// Collects partial BLS signatures across signing roots and reconstructs
/// the full threshold signature once a quorum (`2f+1`) is reached.
#[derive(Default)]
pub struct PartialSignatureContainer {
    roots: HashMap<[u8; 32], RootEntry>,
}

impl PartialSignatureContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a partial signature for `signer_id` over `root`. Returns
    /// `Added` the first time a given `(root, signer_id)` pair is seen and
    /// `Duplicate` on every subsequent call with the same pair — this
    /// method never overwrites an existing entry (spec.md §3, §4.B:
    /// "monotonic, deterministic").
    pub fn add_partial(
        &mut self,
        share: &Share,
        root: [u8; 32],
        signer_id: u64,
        signature: Signature,
    ) -> Result<AddPartialOutcome, ContainerError> {
        if !share.has_signer(signer_id) {
            return Err(ContainerError::InvalidSigner(signer_id));
        }

        let entry = self.roots.entry(root).or_default();
        if entry.signatures.contains_key(&signer_id) {
            return Ok(AddPartialOutcome::Duplicate);
        }
        entry.signatures.insert(signer_id, signature);
        Ok(AddPartialOutcome::Added)
    }

    /// The distinct signers that have contributed a partial signature for
    /// `root`.
    pub fn signers_for(&self, root: [u8; 32]) -> Vec<u64> {
        self.roots
            .get(&root)
            .map(|entry| entry.signatures.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `root` has reached the committee's quorum threshold.
    pub fn has_quorum(&self, share: &Share, root: [u8; 32]) -> bool {
        self.roots
            .get(&root)
            .is_some_and(|entry| entry.signatures.len() >= share.quorum_threshold())
    }

    /// Lagrange-interpolates the full threshold signature over `root` from
    /// the collected partials and verifies it against the validator's
    /// aggregate public key before returning it (spec.md §4.B:
    /// "verify before return").
    ///
    /// On failure, callers must fall back to verifying each partial
    /// signature individually to identify the offending signer(s)
    /// (spec.md §4.B, §7) — this method only reports that reconstruction
    /// failed, it does not itself identify the offender.
    pub fn reconstruct(
        &self,
        root: [u8; 32],
        aggregate_pubkey: &AggregatePublicKey,
    ) -> Result<Signature, ContainerError> {
        let entry = self.roots.get(&root).ok_or(ContainerError::InvalidReconstruction)?;
        let shares: Vec<PartialSignature> = entry
            .signatures
            .iter()
            .map(|(&signer_id, signature)| PartialSignature { signer_id, signature: signature.clone() })
            .collect();

        reconstruct(&shares, aggregate_pubkey, root).map_err(|_| ContainerError::InvalidReconstruction)
    }

    /// Verifies every collected partial signature for `root` individually
    /// against its signer's public key share, returning the signer ids
    /// whose partial signature failed verification (spec.md §4.C:
    /// `fall_back_and_verify_each_signature`).
    pub fn fallback_verify_each(&self, share: &Share, root: [u8; 32]) -> Vec<u64> {
        let Some(entry) = self.roots.get(&root) else {
            return Vec::new();
        };
        entry
            .signatures
            .iter()
            .filter_map(|(&signer_id, signature)| {
                let valid = share
                    .public_key_share_of(signer_id)
                    .is_some_and(|public_key| signature.verify(public_key, root));
                (!valid).then_some(signer_id)
            })
            .collect()
    }

    /// All roots currently tracked, for bookkeeping by `BaseRunner`.
    pub fn roots(&self) -> impl Iterator<Item = [u8; 32]> + '_ {
        self.roots.keys().copied()
    }
}
