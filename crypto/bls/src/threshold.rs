//! Lagrange-interpolation reconstruction of a BLS threshold signature.
//!
//! Given t distinct partial signatures `sigma_i = sk_i * H(m)`, the full
//! signature `sk * H(m)` can be recovered by combining the partials with
//! the same Lagrange coefficients that would reconstruct `sk` from the
//! `sk_i` at x=0 — without ever materializing `sk` or any `sk_i` other than
//! this operator's own share. This is the standard BLS threshold-signature
//! combination (see spec.md §4.B); it does not require a pairing.

use crate::{AggregatePublicKey, Error, Signature};
use blstrs::{G2Affine, G2Projective, Scalar};
use ff::Field;
use group::{Curve, Group};
use std::collections::HashSet;

/// One signer's contribution to a reconstruction: their 1-indexed operator
/// id and the partial signature they produced over the same signing root.
#[derive(Clone)]
pub struct PartialSignature {
    pub signer_id: u64,
    pub signature: Signature,
}

/// Reconstructs the full threshold signature from `shares` and verifies it
/// against `aggregate_pubkey` over `signing_root`.
///
/// Returns [`Error::InvalidReconstruction`] if the combined signature does
/// not verify — per spec.md §4.B the caller must then fall back to
/// per-partial verification to identify the faulty signer(s); this
/// function deliberately does not do that itself, since it has no way to
/// report "which of these" without changing its return type away from a
/// single `Signature`.
pub fn reconstruct(
    shares: &[PartialSignature],
    aggregate_pubkey: &AggregatePublicKey,
    signing_root: [u8; 32],
) -> Result<Signature, Error> {
    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        if share.signer_id == 0 {
            return Err(Error::ZeroSignerId);
        }
        if !seen.insert(share.signer_id) {
            return Err(Error::DuplicateSigner(share.signer_id));
        }
    }

    let ids: Vec<u64> = shares.iter().map(|s| s.signer_id).collect();

    let mut acc = G2Projective::identity();
    for share in shares {
        let lambda = lagrange_coefficient_at_zero(share.signer_id, &ids);
        let point = decompress_signature(&share.signature)?;
        acc += point * lambda;
    }

    let combined_bytes = acc.to_affine().to_compressed();
    let combined = Signature::deserialize(&combined_bytes)?;

    if combined.verify_aggregate(aggregate_pubkey, signing_root) {
        Ok(combined)
    } else {
        Err(Error::InvalidReconstruction)
    }
}

/// `L_i(0) = prod_{j != i} x_j / (x_j - x_i)`, the Lagrange basis
/// polynomial for signer `id` evaluated at the origin, over the set of
/// signer ids actually present (not the full committee).
fn lagrange_coefficient_at_zero(id: u64, ids: &[u64]) -> Scalar {
    let xi = Scalar::from(id);
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;

    for &other in ids {
        if other == id {
            continue;
        }
        let xj = Scalar::from(other);
        numerator *= xj;
        denominator *= xj - xi;
    }

    let inverse: Scalar = Option::from(denominator.invert())
        .expect("signer ids are deduplicated, so xj - xi is never zero");
    numerator * inverse
}

fn decompress_signature(sig: &Signature) -> Result<G2Projective, Error> {
    let bytes = sig.serialize();
    let affine: G2Affine = Option::from(G2Affine::from_compressed(&bytes)).ok_or(Error::InvalidBytes)?;
    Ok(affine.into())
}

/// Fixture helpers for building valid toy threshold committees, used by
/// this crate's own tests and by downstream crates (`ssv_runner`) that need
/// a real Lagrange-consistent committee to exercise reconstruction against.
pub mod testing {
    use super::Scalar;
    use crate::{AggregatePublicKey, SecretKeyShare};
    use blst::min_pk::SecretKey as BlstSecretKey;
    use ff::Field;

    /// Builds a toy `t`-of-`n` sharing by sampling a secret polynomial of
    /// degree `t-1` and evaluating it at ids `1..=n`, the textbook way to
    /// turn Shamir shares into BLS key shares.
    pub fn toy_sharing(t: usize, n: usize) -> (Vec<(u64, SecretKeyShare)>, AggregatePublicKey) {
        // Deterministic, distinct, non-zero coefficients. Not a real
        // entropy source — fine for a test polynomial.
        let coeffs: Vec<Scalar> = (0..t)
            .map(|i| Scalar::from(1_000_003u64 * (i as u64 + 1) + 17))
            .collect();

        let eval = |x: u64| -> Scalar {
            let xs = Scalar::from(x);
            let mut acc = Scalar::ZERO;
            let mut pow = Scalar::ONE;
            for c in &coeffs {
                acc += *c * pow;
                pow *= xs;
            }
            acc
        };

        let secret = coeffs[0];
        let shares: Vec<(u64, SecretKeyShare)> = (1..=n as u64)
            .map(|id| {
                let scalar = eval(id);
                let sk = BlstSecretKey::from_bytes(&scalar.to_bytes_be()).expect("valid scalar");
                (id, SecretKeyShare::from_blst(sk))
            })
            .collect();

        let agg_sk = BlstSecretKey::from_bytes(&secret.to_bytes_be()).expect("valid secret");
        let agg_pk = AggregatePublicKey::from_blst(agg_sk.sk_to_pk());
        (shares, agg_pk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use self::testing::toy_sharing;

    #[test]
    fn reconstructs_with_any_quorum_subset() {
        let (shares, agg_pk) = toy_sharing(3, 4);
        let root = [5u8; 32];

        let partials: Vec<PartialSignature> = shares
            .iter()
            .map(|(id, sk)| PartialSignature {
                signer_id: *id,
                signature: sk.sign(root),
            })
            .collect();

        // Any 3-of-4 subset reconstructs the same signature.
        let subset_a = &partials[0..3];
        let subset_b = &partials[1..4];

        let sig_a = reconstruct(subset_a, &agg_pk, root).expect("reconstructs");
        let sig_b = reconstruct(subset_b, &agg_pk, root).expect("reconstructs");
        assert!(sig_a == sig_b);
    }

    #[test]
    fn rejects_duplicate_signer() {
        let (shares, agg_pk) = toy_sharing(2, 3);
        let root = [1u8; 32];
        let sig = shares[0].1.sign(root);
        let partials = vec![
            PartialSignature { signer_id: 1, signature: sig.clone() },
            PartialSignature { signer_id: 1, signature: sig },
        ];
        assert_eq!(
            reconstruct(&partials, &agg_pk, root),
            Err(Error::DuplicateSigner(1))
        );
    }

    #[test]
    fn wrong_key_fails_verification_not_panics() {
        let (shares, _agg_pk) = toy_sharing(2, 3);
        let (_other_shares, wrong_agg_pk) = toy_sharing(2, 3);
        let root = [2u8; 32];
        let partials: Vec<PartialSignature> = shares[..2]
            .iter()
            .map(|(id, sk)| PartialSignature {
                signer_id: *id,
                signature: sk.sign(root),
            })
            .collect();
        assert_eq!(
            reconstruct(&partials, &wrong_agg_pk, root),
            Err(Error::InvalidReconstruction)
        );
    }
}
