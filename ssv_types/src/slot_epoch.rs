//! `Slot` and `CommitteeIndex` newtypes over `u64`.
//!
//! Kept deliberately thin (unlike the teacher's full `consensus/types`
//! crate, which also carries `Epoch`, fork versioning, and arithmetic
//! overflow checks via `safe_arith`) since the runner only ever compares
//! and orders slots — it does not do epoch math.

use serde::{Deserialize, Serialize};
use ssz::{Decode, DecodeError, Encode};
use std::fmt;
use std::ops::{Deref, Sub};
use tree_hash::TreeHash;

macro_rules! newtype_u64 {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(n: u64) -> Self {
                Self(n)
            }

            pub fn as_u64(self) -> u64 {
                self.0
            }

            /// `self - n`, floored at zero instead of panicking/wrapping.
            pub fn saturating_sub(self, n: u64) -> Self {
                Self(self.0.saturating_sub(n))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Deref for $name {
            type Target = u64;
            fn deref(&self) -> &u64 {
                &self.0
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n)
            }
        }

        impl From<$name> for u64 {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl Sub<u64> for $name {
            type Output = Self;
            fn sub(self, rhs: u64) -> Self {
                Self(self.0 - rhs)
            }
        }

        impl Encode for $name {
            fn is_ssz_fixed_len() -> bool {
                <u64 as Encode>::is_ssz_fixed_len()
            }
            fn ssz_fixed_len() -> usize {
                <u64 as Encode>::ssz_fixed_len()
            }
            fn ssz_bytes_len(&self) -> usize {
                self.0.ssz_bytes_len()
            }
            fn ssz_append(&self, buf: &mut Vec<u8>) {
                self.0.ssz_append(buf)
            }
        }

        impl Decode for $name {
            fn is_ssz_fixed_len() -> bool {
                <u64 as Decode>::is_ssz_fixed_len()
            }
            fn ssz_fixed_len() -> usize {
                <u64 as Decode>::ssz_fixed_len()
            }
            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
                u64::from_ssz_bytes(bytes).map(Self)
            }
        }

        impl TreeHash for $name {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                <u64 as TreeHash>::tree_hash_type()
            }
            fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
                self.0.tree_hash_packed_encoding()
            }
            fn tree_hash_packing_factor() -> usize {
                <u64 as TreeHash>::tree_hash_packing_factor()
            }
            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                self.0.tree_hash_root()
            }
        }
    };
}

newtype_u64!(Slot);
newtype_u64!(CommitteeIndex);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_numeric() {
        assert!(Slot::new(5) < Slot::new(10));
        assert!(Slot::new(10).saturating_sub(20) == Slot::new(0));
    }

    #[test]
    fn ssz_round_trips() {
        let slot = Slot::new(123_456);
        let bytes = slot.as_ssz_bytes();
        assert_eq!(Slot::from_ssz_bytes(&bytes).unwrap(), slot);
    }

    #[test]
    fn serde_is_transparent_u64() {
        let slot = Slot::new(7);
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, "7");
    }
}
