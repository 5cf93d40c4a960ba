//! External-collaborator contracts (spec.md §4.E-G): the QBFT consensus
//! engine, the signer/key-manager, and the network/beacon-node adapters.
//! Only the interfaces this core consumes are specified here — the engine
//! itself, the gossip transport, and the beacon client are out of scope
//! (spec.md §1).

use ssv_types::{AttestationData, ConsensusData, SsvMessage};
use std::future::Future;

/// A QBFT consensus instance for one duty (spec.md §4.E).
///
/// `feed` is idempotent: `decided` becomes `true` exactly once per
/// instance, no matter how many times messages are fed to it afterwards.
pub trait Consensus: Send + Sync {
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Proposes `data` as the value for this instance to decide on.
    fn decide(&self, data: ConsensusData) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Feeds one inbound consensus protocol message to the instance.
    /// Returns whether the instance has now decided, and the decided value
    /// the first time it does.
    fn feed(
        &self,
        message: SsvMessage,
    ) -> impl Future<Output = Result<(bool, Option<ConsensusData>), Self::Error>> + Send;

    /// The instance's current height/round, for observability.
    fn instance_progress(&self) -> (u64, u64);
}

/// Produces partial BLS signatures; the core holds a handle to this trait
/// object, never raw share key material (spec.md §4.F).
pub trait Signer: Send + Sync {
    /// Signs `signing_root` under `domain` with the share this signer was
    /// configured with. Constant-time over the secret share (delegated to
    /// `bls::SecretKeyShare::sign`).
    fn sign(&self, domain: [u8; 32], signing_root: [u8; 32]) -> bls::Signature;
}

/// Gossip broadcast (spec.md §4.G): best-effort, failure doesn't by itself
/// abort the duty (spec.md §7: `BroadcastFailed` is surfaced but
/// non-fatal).
pub trait Network: Send + Sync {
    type Error: std::fmt::Display + Send + Sync + 'static;

    fn broadcast(&self, message: SsvMessage) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Beacon-node operations this core depends on (spec.md §4.G).
pub trait Beacon: Send + Sync {
    type Error: std::fmt::Display + Send + Sync + 'static;

    fn get_attestation_data(
        &self,
        slot: ssv_types::Slot,
        committee_index: u64,
    ) -> impl Future<Output = Result<AttestationData, Self::Error>> + Send;

    fn submit_attestation(
        &self,
        attestation: crate::attester::Attestation,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
