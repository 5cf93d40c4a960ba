//! BLS12-381 signing primitives for the SSV attester runner.
//!
//! This crate does not implement a BLS library (spec.md §1 Non-goals); it
//! wraps [`blst`] (the teacher's choice, see `crypto/bls` upstream) for
//! signing/verification and [`blstrs`] for the scalar-field arithmetic
//! needed by threshold reconstruction, since `blst`'s public API only
//! exposes the minimal-pubkey-size signature scheme and not raw scalar
//! multiplication of arbitrary points.
//!
//! The domain-separation tag below matches the IETF BLS ciphersuite used by
//! the Ethereum consensus specs (minimal-pubkey-size variant: signatures in
//! G2, public keys in G1).

mod error;
mod threshold;

pub use error::Error;
pub use threshold::testing;
pub use threshold::{reconstruct, PartialSignature};

use blst::min_pk::{PublicKey as BlstPublicKey, SecretKey as BlstSecretKey, Signature as BlstSig};
use std::fmt;
use zeroize::Zeroize;

/// Ciphersuite domain-separation tag, minimal-pubkey-size variant.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// This operator's secret share of the threshold-shared validator key.
///
/// The core never generates or persists this value; it is handed an
/// already-derived share by the (out-of-scope) key-management layer.
#[derive(Clone)]
pub struct SecretKeyShare(BlstSecretKey);

impl SecretKeyShare {
    /// Wraps an already-generated `blst` secret key. Only exposed within
    /// this crate; the `testing` fixtures are the sole caller outside of
    /// `deserialize`.
    pub(crate) fn from_blst(sk: BlstSecretKey) -> Self {
        Self(sk)
    }

    /// Deserializes a share from its 32-byte big-endian scalar encoding.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        BlstSecretKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidBytes)
    }

    /// Produces a BLS partial signature over `signing_root`.
    ///
    /// Constant-time over the secret share: `blst`'s scalar multiplication
    /// used internally by `sign` does not branch on secret data.
    pub fn sign(&self, signing_root: [u8; 32]) -> Signature {
        Signature(self.0.sign(&signing_root, DST, &[]))
    }

    /// The public key share corresponding to this secret share, for callers
    /// that need to verify a single partial independently of reconstruction
    /// (spec.md §4.B's fallback-and-verify-each path).
    pub fn public_key(&self) -> PublicKeyShare {
        PublicKeyShare(self.0.sk_to_pk())
    }
}

impl Zeroize for SecretKeyShare {
    fn zeroize(&mut self) {
        // `blst::min_pk::SecretKey` stores its scalar inline; overwriting
        // the wrapper with a freshly zeroed share is the closest this
        // opaque type allows to an in-place wipe.
        if let Ok(zero) = BlstSecretKey::from_bytes(&[0u8; 32]) {
            self.0 = zero;
        }
    }
}

/// A single operator's public key share, used to verify that operator's
/// individual partial signature.
#[derive(Clone)]
pub struct PublicKeyShare(BlstPublicKey);

impl PublicKeyShare {
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        BlstPublicKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidBytes)
    }

    pub fn serialize(&self) -> [u8; 48] {
        self.0.compress()
    }
}

impl fmt::Debug for PublicKeyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyShare({})", hex::encode(self.serialize()))
    }
}

/// The validator's aggregate public key (reconstructed off-chain ahead of
/// time from all operators' shares; owned by the `Share` the runner is
/// configured with).
#[derive(Clone)]
pub struct AggregatePublicKey(BlstPublicKey);

impl AggregatePublicKey {
    pub(crate) fn from_blst(pk: BlstPublicKey) -> Self {
        Self(pk)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        BlstPublicKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidBytes)
    }
}

impl fmt::Debug for AggregatePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AggregatePublicKey({})", hex::encode(self.0.compress()))
    }
}

/// A BLS signature: either a single operator's partial, or the
/// threshold-reconstructed full signature.
#[derive(Clone)]
pub struct Signature(BlstSig);

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}
impl Eq for Signature {}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.serialize()))
    }
}

impl Signature {
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        BlstSig::from_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidBytes)
    }

    pub fn serialize(&self) -> [u8; 96] {
        self.0.compress()
    }

    /// Verifies `self` over `signing_root` against `public_key`.
    pub fn verify(&self, public_key: &PublicKeyShare, signing_root: [u8; 32]) -> bool {
        self.0.verify(true, &signing_root, DST, &[], &public_key.0, true) == blst::BLST_ERROR::BLST_SUCCESS
    }

    /// Verifies `self` over `signing_root` against the validator's
    /// aggregate public key (used after threshold reconstruction).
    pub fn verify_aggregate(&self, public_key: &AggregatePublicKey, signing_root: [u8; 32]) -> bool {
        self.0.verify(true, &signing_root, DST, &[], &public_key.0, true) == blst::BLST_ERROR::BLST_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(byte: u8) -> SecretKeyShare {
        let mut ikm = [0u8; 32];
        ikm[0] = byte;
        ikm[1] = 42; // avoid the all-zero IKM, which `blst` rejects
        SecretKeyShare(BlstSecretKey::key_gen(&ikm, &[]).expect("key_gen"))
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let sk = share(7);
        let root = [9u8; 32];
        let sig = sk.sign(root);
        assert!(sig.verify(&sk.public_key(), root));
    }

    #[test]
    fn verify_rejects_wrong_root() {
        let sk = share(7);
        let sig = sk.sign([1u8; 32]);
        assert!(!sig.verify(&sk.public_key(), [2u8; 32]));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let sk_a = share(1);
        let sk_b = share(2);
        let root = [3u8; 32];
        let sig = sk_a.sign(root);
        assert!(!sig.verify(&sk_b.public_key(), root));
    }

    #[test]
    fn serialize_round_trips() {
        let sk = share(11);
        let sig = sk.sign([4u8; 32]);
        let bytes = sig.serialize();
        let decoded = Signature::deserialize(&bytes).unwrap();
        assert!(decoded == sig);
    }
}
