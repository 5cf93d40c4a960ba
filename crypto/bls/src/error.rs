use std::fmt;

/// Errors surfaced by BLS signing, verification and threshold reconstruction.
///
/// Mirrors spec.md §7's taxonomy-over-behavior approach: callers match on
/// the variant to decide recovery, they don't inspect a message string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A byte slice was the wrong length, or did not decode to a valid
    /// curve point / scalar.
    InvalidBytes,
    /// The reconstructed signature did not verify against the supplied
    /// aggregate public key. Per spec.md §4.B, the caller must then fall
    /// back to per-partial verification to identify the faulty signer(s).
    InvalidReconstruction,
    /// `reconstruct` was called with fewer than 2f+1 shares for the
    /// configured threshold.
    InsufficientShares { have: usize, need: usize },
    /// Two shares in the input set carried the same signer id.
    DuplicateSigner(u64),
    /// A signer id of `0` was supplied; ids are 1-indexed polynomial
    /// evaluation points and `0` is reserved for the secret itself.
    ZeroSignerId,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBytes => write!(f, "invalid BLS byte encoding"),
            Error::InvalidReconstruction => {
                write!(f, "reconstructed signature failed verification")
            }
            Error::InsufficientShares { have, need } => {
                write!(f, "have {have} partial signatures, need at least {need}")
            }
            Error::DuplicateSigner(id) => write!(f, "duplicate signer id {id}"),
            Error::ZeroSignerId => write!(f, "signer id 0 is reserved"),
        }
    }
}

impl std::error::Error for Error {}
