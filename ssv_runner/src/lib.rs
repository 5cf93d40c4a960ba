//! The attester duty-runner core of an SSV operator node: the per-duty
//! state machine, partial-signature aggregation, and the slot-keyed
//! attestation-data cache that collapses concurrent duplicate beacon-node
//! fetches into one.
//!
//! The QBFT consensus engine, p2p transport, key storage, and beacon
//! client are external collaborators; this crate only specifies the
//! interfaces it consumes from them (see [`adapters`]).

pub mod adapters;
pub mod attester;
pub mod base_runner;
pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod state;

pub use adapters::{Beacon, Consensus, Network, Signer};
pub use attester::{Attestation, AttesterRunner, NoPreConsensus};
pub use base_runner::BaseRunner;
pub use cache::AttestationDataCache;
pub use config::RunnerConfig;
pub use container::PartialSignatureContainer;
pub use error::{AddPartialOutcome, CacheError, ContainerError, DutyError};
pub use state::{DecidedValue, DutyTimings, Phase, RunnerState};
