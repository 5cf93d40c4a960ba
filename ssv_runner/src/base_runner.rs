//! The shared duty-lifecycle state machine (spec.md §4.C): everything
//! about starting, advancing, and finishing a duty that does not depend on
//! which specific duty type (here, only `Attester`) is running.

use crate::container::PartialSignatureContainer;
use crate::error::DutyError;
use crate::state::{DecidedValue, Phase, RunnerState};
use ssv_types::{ConsensusData, Duty, Slot};

/// Drives one `RunnerState` through `Idle -> Consensus -> PostConsensus ->
/// Finished`. Not `Send`/`Sync` on its own — the surrounding runner is
/// responsible for ensuring only one task drives a given instance at a time
/// (spec.md §5: "RunnerState single-task-serialized").
pub struct BaseRunner {
    pub state: RunnerState,
}

impl Default for BaseRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseRunner {
    pub fn new() -> Self {
        Self { state: RunnerState::new() }
    }

    pub fn has_running_duty(&self) -> bool {
        self.state.has_running_duty()
    }

    /// Begins a new duty, rejecting it if one is already in flight or if
    /// its slot regresses behind what this runner has already decided
    /// (spec.md §4.C).
    pub fn base_start_new_duty(&mut self, duty: Duty) -> Result<(), DutyError> {
        if self.has_running_duty() {
            return Err(DutyError::DutyInProgress);
        }
        if let Some(highest) = self.state.highest_decided_slot {
            if duty.slot < highest {
                return Err(DutyError::SlotRegressed {
                    requested: duty.slot.as_u64(),
                    highest_decided: highest.as_u64(),
                });
            }
        }

        self.state = RunnerState::new();
        self.state.duty = Some(duty);
        self.state.phase = Phase::Consensus;
        self.state.timings.consensus_started = Some(now());
        Ok(())
    }

    /// Records that the consensus engine has decided, advancing
    /// `Idle/Consensus -> PostConsensus` and bumping `highest_decided_slot`
    /// (spec.md §4.C, §8 invariant 2: monotonic).
    pub fn base_consensus_msg_processing(
        &mut self,
        decided: bool,
        value: Option<ConsensusData>,
    ) -> Result<(), DutyError> {
        if self.state.phase != Phase::Consensus {
            // A late or duplicate decision for an instance we've already
            // moved past; drop it rather than erroring (spec.md §7:
            // ConsensusError -> drop message, stay in phase).
            return Ok(());
        }
        if !decided {
            return Ok(());
        }
        let Some(value) = value else {
            return Err(DutyError::Consensus("decided with no value".into()));
        };

        let slot = value.duty.slot;
        self.state.decided_value = Some(DecidedValue { consensus_data: value });
        self.state.phase = Phase::PostConsensus;
        self.state.timings.consensus_decided = Some(now());
        self.state.timings.post_consensus_started = Some(now());

        self.state.highest_decided_slot = Some(match self.state.highest_decided_slot {
            Some(current) if current >= slot => current,
            _ => slot,
        });
        Ok(())
    }

    /// Aborts the current duty, returning the runner to `Idle` so the next
    /// duty can start. `highest_decided_slot` is preserved — it is
    /// monotonic independent of this duty's outcome — while everything
    /// else about the aborted attempt is discarded (spec.md §7: `FetchFailed`
    /// and a failed `decide` call both "Abort duty" rather than leave the
    /// runner stuck mid-lifecycle with no way to start the next one).
    pub fn abort_duty(&mut self) {
        let highest_decided_slot = self.state.highest_decided_slot;
        self.state = RunnerState::new();
        self.state.highest_decided_slot = highest_decided_slot;
    }

    /// Accepts one post-consensus partial signature, returning whether its
    /// signing root now has quorum (spec.md §4.C).
    pub fn base_post_consensus_msg_processing(
        &mut self,
        root: [u8; 32],
        signer_id: u64,
        signature: bls::Signature,
        share: &ssv_types::Share,
    ) -> Result<bool, DutyError> {
        if self.state.phase != Phase::PostConsensus {
            return Ok(false);
        }
        self.state
            .post_consensus
            .add_partial(share, root, signer_id, signature)
            .map_err(|e| DutyError::Consensus(e.to_string()))?;
        Ok(self.state.post_consensus.has_quorum(share, root))
    }

    /// Signs `signing_root` with the configured signer and wraps it as a
    /// partial signature from this operator (spec.md §4.D, §4.F).
    pub fn sign_beacon_object(
        &self,
        signer: &dyn crate::adapters::Signer,
        domain: [u8; 32],
        signing_root: [u8; 32],
    ) -> bls::Signature {
        signer.sign(domain, signing_root)
    }

    /// Attempts to reconstruct the full threshold signature for `root`.
    pub fn reconstruct_beacon_sig(
        &self,
        root: [u8; 32],
        aggregate_pubkey: &bls::AggregatePublicKey,
    ) -> Result<bls::Signature, DutyError> {
        self.state
            .post_consensus
            .reconstruct(root, aggregate_pubkey)
            .map_err(|_| DutyError::InvalidSignatures)
    }

    /// Verifies each collected partial individually to identify the
    /// offending signer(s) after a failed reconstruction (spec.md §4.C,
    /// §7: `fall_back_and_verify_each_signature`).
    pub fn fall_back_and_verify_each_signature(&self, root: [u8; 32], share: &ssv_types::Share) -> Vec<u64> {
        self.state.post_consensus.fallback_verify_each(share, root)
    }

    /// Marks the current duty finished; `Beacon::submit_attestation` must
    /// only ever be called once per decided duty, enforced by checking
    /// this before submitting (spec.md §4.G: "at-most-once per decided
    /// duty via Finished").
    pub fn mark_finished(&mut self) {
        self.state.phase = Phase::Finished;
        self.state.finished = true;
        self.state.timings.finished = Some(now());
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn post_consensus_container(&self) -> &PartialSignatureContainer {
        &self.state.post_consensus
    }

    pub fn current_slot(&self) -> Option<Slot> {
        self.state.duty.as_ref().map(|d| d.slot)
    }
}

fn now() -> std::time::Instant {
    std::time::Instant::now()
}
