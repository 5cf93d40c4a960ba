//! The explicit per-duty state machine (spec.md §3, §4.C, §9: "model
//! {Idle,Consensus,PostConsensus,Finished} as explicit tagged variant, not
//! Go's implicit flags").

use crate::container::PartialSignatureContainer;
use ssv_types::{ConsensusData, Duty, Slot};
use std::time::{Duration, Instant};

/// The phase a single duty's runner state is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle,
    Consensus,
    PostConsensus,
    Finished,
}

/// Timestamps for each phase transition of the current duty, supplementing
/// spec.md's data model (not in the distilled spec, but present in the
/// original SSV runner as per-duty instrumentation used for latency
/// metrics).
#[derive(Debug, Clone, Copy, Default)]
pub struct DutyTimings {
    pub consensus_started: Option<Instant>,
    pub consensus_decided: Option<Instant>,
    pub post_consensus_started: Option<Instant>,
    pub finished: Option<Instant>,
}

impl DutyTimings {
    pub fn consensus_duration(&self) -> Option<Duration> {
        Some(self.consensus_decided?.duration_since(self.consensus_started?))
    }

    pub fn total_duration(&self) -> Option<Duration> {
        Some(self.finished?.duration_since(self.consensus_started?))
    }
}

/// The value a QBFT instance decided on for the current duty, opaque to
/// `BaseRunner` beyond the `ConsensusData` it wraps (spec.md §3).
#[derive(Debug, Clone)]
pub struct DecidedValue {
    pub consensus_data: ConsensusData,
}

/// One runner's state for the duty currently in flight (spec.md §3).
///
/// Owned by `BaseRunner`; serialized to a single task (spec.md §5 — no
/// internal locking of its own is required because exactly one task drives
/// it at a time).
pub struct RunnerState {
    pub phase: Phase,
    pub duty: Option<Duty>,
    pub decided_value: Option<DecidedValue>,
    pub post_consensus: PartialSignatureContainer,
    pub finished: bool,
    /// Monotonically non-decreasing across the lifetime of this runner
    /// (spec.md §3, §8 invariant 2).
    pub highest_decided_slot: Option<Slot>,
    pub timings: DutyTimings,
}

impl Default for RunnerState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            duty: None,
            decided_value: None,
            post_consensus: PartialSignatureContainer::new(),
            finished: false,
            highest_decided_slot: None,
            timings: DutyTimings::default(),
        }
    }
}

impl RunnerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_running_duty(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::Finished)
    }
}
