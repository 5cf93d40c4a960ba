use std::fmt;

/// Failure modes of `AttestationDataCache::get_or_create` (spec.md §4.A).
#[derive(Debug, Clone)]
pub enum CacheError {
    /// The beacon-node fetch that populated this slot's entry failed; every
    /// caller waiting on it (not just the one that triggered the fetch)
    /// observes this.
    FetchFailed(String),
    /// A caller asked for a slot whose cached value exists but was produced
    /// by a mismatched caller expectation (defensive — should not occur in
    /// correct usage, escalated as fatal per spec.md §7).
    TypeMismatch,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::FetchFailed(reason) => write!(f, "attestation data fetch failed: {reason}"),
            CacheError::TypeMismatch => write!(f, "cache entry type mismatch"),
        }
    }
}

impl std::error::Error for CacheError {}

/// Failure modes of `PartialSignatureContainer` (spec.md §4.B).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// `signer_id` is not a recognized member of the committee.
    InvalidSigner(u64),
    /// The combined signature failed verification against the aggregate
    /// public key; a per-signer fallback check is required to identify the
    /// offender (spec.md §4.B, §7).
    InvalidReconstruction,
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::InvalidSigner(id) => write!(f, "signer {id} is not a committee member"),
            ContainerError::InvalidReconstruction => write!(f, "reconstructed signature failed verification"),
        }
    }
}

impl std::error::Error for ContainerError {}

/// Outcome of `PartialSignatureContainer::add_partial` (spec.md §4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPartialOutcome {
    Added,
    Duplicate,
}

/// Failure modes of `BaseRunner`/`AttesterRunner` duty lifecycle management
/// (spec.md §4.C, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DutyError {
    /// A new duty was started while one is already in flight for this
    /// runner.
    DutyInProgress,
    /// A new duty's slot is behind the highest slot this runner has already
    /// decided (monotonicity invariant, spec.md §4.C).
    SlotRegressed { requested: u64, highest_decided: u64 },
    /// The attestation-data cache's fetch against the beacon node failed;
    /// the duty aborts (spec.md §7: `FetchFailed` -> "Abort duty").
    FetchFailed(String),
    /// The consensus engine reported an error processing a message; the
    /// message is dropped and the runner stays in its current phase.
    Consensus(String),
    /// Partial-signature reconstruction failed and the offending signer(s)
    /// could not be salvaged via per-signature fallback verification; the
    /// duty aborts with no retry this slot.
    InvalidSignatures,
    /// `Beacon::submit_attestation` failed; the duty is flagged
    /// `RoleSubmissionFailed` and is not retried within this slot.
    SubmitFailed(String),
}

impl fmt::Display for DutyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DutyError::DutyInProgress => write!(f, "a duty is already in progress"),
            DutyError::SlotRegressed { requested, highest_decided } => write!(
                f,
                "duty slot {requested} is behind highest decided slot {highest_decided}"
            ),
            DutyError::FetchFailed(reason) => write!(f, "attestation data fetch failed: {reason}"),
            DutyError::Consensus(reason) => write!(f, "consensus error: {reason}"),
            DutyError::InvalidSignatures => write!(f, "signature reconstruction failed verification"),
            DutyError::SubmitFailed(reason) => write!(f, "attestation submission failed: {reason}"),
        }
    }
}

impl std::error::Error for DutyError {}
