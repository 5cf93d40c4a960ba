use sha2::{Digest, Sha256};
use tree_hash::TreeHash;

/// `DomainAttester = 0x01000000`, concatenated by the caller with a
/// fork-version-derived tail to form the full 32-byte signing domain
/// (spec.md §6). Computing the fork-derived tail is out of scope here
/// (it belongs to the beacon-chain fork-schedule the node already tracks);
/// `Share` carries the already-assembled 32-byte value.
pub const DOMAIN_ATTESTER_TYPE: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Computes the SSZ signing root of `object` under `domain`: the
/// merkle root of the two-leaf `SigningData` container
/// `{ object_root, domain }`, which for exactly two chunks is simply
/// `sha256(object_root || domain)`.
pub fn signing_root<T: TreeHash>(object: &T, domain: [u8; 32]) -> [u8; 32] {
    let object_root = object.tree_hash_root();
    let mut hasher = Sha256::new();
    hasher.update(object_root.as_ref());
    hasher.update(domain);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttestationData, Checkpoint, CommitteeIndex, Hash256, Slot};

    #[test]
    fn signing_root_depends_on_domain() {
        let data = AttestationData {
            slot: Slot::new(1),
            index: CommitteeIndex::new(0),
            beacon_block_root: Hash256::repeat_byte(1),
            source: Checkpoint { epoch: 0, root: Hash256::zero() },
            target: Checkpoint { epoch: 1, root: Hash256::zero() },
        };
        let root_a = signing_root(&data, [1u8; 32]);
        let root_b = signing_root(&data, [2u8; 32]);
        assert_ne!(root_a, root_b);
    }

    #[test]
    fn signing_root_is_deterministic() {
        let data = AttestationData {
            slot: Slot::new(5),
            index: CommitteeIndex::new(2),
            beacon_block_root: Hash256::repeat_byte(9),
            source: Checkpoint { epoch: 1, root: Hash256::zero() },
            target: Checkpoint { epoch: 2, root: Hash256::zero() },
        };
        assert_eq!(signing_root(&data, [7u8; 32]), signing_root(&data, [7u8; 32]));
    }
}
