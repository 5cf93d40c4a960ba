//! `AttesterRunner` (spec.md §4.D): the duty-type-specific logic layered on
//! top of `BaseRunner` for the one role this core handles.

use crate::adapters::{Beacon, Consensus, Network, Signer};
use crate::base_runner::BaseRunner;
use crate::cache::AttestationDataCache;
use crate::config::RunnerConfig;
use crate::error::{CacheError, DutyError};
use bitvec::prelude::{BitVec, Lsb0};
use sha2::{Digest, Sha256};
use ssz::{Decode, Encode};
use ssv_types::{
    new_msg_id, AttestationData, ConsensusData, Duty, PartialSigMsgType, PartialSignatureMessage,
    PartialSignatureMessages, Share, SignedPartialSignatureMessages, SsvMessage,
    SsvMessageType, DOMAIN_ATTESTER_TYPE,
};
use std::sync::Arc;

/// `phase0.Attestation` (spec.md §6): the object submitted to the beacon
/// node once the threshold signature is reconstructed.
#[derive(Debug, Clone)]
pub struct Attestation {
    pub aggregation_bits: BitVec<u8, Lsb0>,
    pub data: AttestationData,
    pub signature: [u8; 96],
}

/// Returned by `ProcessPreConsensus`: the attester role has no
/// pre-consensus phase, so this call is always a no-op (spec.md §4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoPreConsensus;

/// Orchestrates a single attester duty end to end (spec.md §1, §4.D).
pub struct AttesterRunner<C, S, N, B> {
    pub base: BaseRunner,
    cache: Arc<AttestationDataCache>,
    share: Share,
    consensus: C,
    signer: S,
    network: N,
    beacon: B,
    config: RunnerConfig,
}

impl<C, S, N, B> AttesterRunner<C, S, N, B>
where
    C: Consensus,
    S: Signer,
    N: Network,
    B: Beacon,
{
    pub fn new(
        cache: Arc<AttestationDataCache>,
        share: Share,
        consensus: C,
        signer: S,
        network: N,
        beacon: B,
        config: RunnerConfig,
    ) -> Self {
        Self { base: BaseRunner::new(), cache, share, consensus, signer, network, beacon, config }
    }

    /// Step 1 of spec.md §4.D: fetch (or join an in-flight fetch for) this
    /// slot's attestation data, overwrite its committee index for this
    /// duty, marshal it, and hand it to consensus.
    pub async fn execute_duty(&mut self, duty: Duty) -> Result<(), DutyError> {
        self.base.base_start_new_duty(duty.clone())?;

        let committee_index = duty.committee_index;
        let slot = duty.slot;
        let beacon = &self.beacon;

        let cached = match self
            .cache
            .get_or_fetch(slot, || async move {
                beacon
                    .get_attestation_data(slot, committee_index)
                    .await
                    .map_err(|e| CacheError::FetchFailed(e.to_string()))
            })
            .await
        {
            Ok(cached) => cached,
            Err(e) => {
                self.base.abort_duty();
                return Err(DutyError::FetchFailed(e.to_string()));
            }
        };

        // spec.md §9: copy before overwrite, so concurrent duties sharing
        // this cached slot each see their own committee index with no
        // possibility of interleaving with another caller's marshal.
        let data = cached.with_index(committee_index);
        let data_ssz = data.as_ssz_bytes();

        let consensus_data = ConsensusData { duty, version: 1, data_ssz };
        if let Err(e) = self.consensus.decide(consensus_data).await {
            self.base.abort_duty();
            return Err(DutyError::Consensus(e.to_string()));
        }
        Ok(())
    }

    /// Step 2: feed an inbound consensus message to the engine; once
    /// decided, sign the agreed `AttestationData` under `DomainAttester`
    /// and broadcast the partial signature (spec.md §4.D).
    pub async fn process_consensus(&mut self, message: SsvMessage) -> Result<(), DutyError> {
        let (decided, value) = self
            .consensus
            .feed(message)
            .await
            .map_err(|e| DutyError::Consensus(e.to_string()))?;

        self.base.base_consensus_msg_processing(decided, value.clone())?;
        if !decided {
            return Ok(());
        }
        let Some(value) = value else {
            return Ok(());
        };

        let data = AttestationData::from_ssz_bytes(&value.data_ssz)
            .map_err(|_| DutyError::Consensus("malformed decided attestation data".into()))?;
        let signing_root = ssv_types::signing_root(&data, self.share.attester_domain);
        let partial = self.signer.sign(self.share.attester_domain, signing_root);

        let partial_sig_message = PartialSignatureMessages {
            msg_type: PartialSigMsgType::PostConsensusPartialSig,
            slot: data.slot,
            messages: vec![PartialSignatureMessage {
                partial_signature: partial.serialize(),
                signing_root,
                signer: self.share.operator_id,
            }],
        };
        // The outer envelope signature is produced with this operator's
        // RSA key (out of scope, spec.md §1): left zeroed here since that
        // key-management layer is an external collaborator this core does
        // not own.
        let signed = SignedPartialSignatureMessages {
            signature: [0u8; 96],
            signer: self.share.operator_id,
            message: partial_sig_message,
        };

        let msg_id = new_msg_id(DOMAIN_ATTESTER_TYPE, self.share.validator_pubkey, ssv_types::Role::Attester);
        let envelope = SsvMessage {
            msg_type: SsvMessageType::PartialSignature,
            msg_id,
            data: serde_json::to_vec(&signed).unwrap_or_default(),
        };

        // Broadcast is best-effort and bounded by a hard timeout (spec.md
        // §5); failure is surfaced but does not abort the duty, since
        // other operators' gossip may still carry this operator's partial
        // to quorum (spec.md §7: BroadcastFailed).
        match tokio::time::timeout(self.config.broadcast_timeout, self.network.broadcast(envelope)).await {
            Ok(Err(err)) => tracing::warn!(error = %err, "broadcast of post-consensus partial signature failed"),
            Err(_elapsed) => tracing::warn!("broadcast of post-consensus partial signature timed out"),
            Ok(Ok(())) => {}
        }
        Ok(())
    }

    /// Step 3: feed an inbound post-consensus partial signature; once its
    /// signing root reaches quorum, reconstruct, build the `Attestation`,
    /// and submit it exactly once (spec.md §4.D).
    pub async fn process_post_consensus(
        &mut self,
        signed: SignedPartialSignatureMessages,
    ) -> Result<(), DutyError> {
        if self.base.is_finished() {
            // Already submitted for this duty; nothing further to do.
            return Ok(());
        }

        let mut newly_quorate_roots = Vec::new();
        for partial in &signed.message.messages {
            let Ok(signature) = bls::Signature::deserialize(&partial.partial_signature) else {
                continue;
            };
            let has_quorum = self.base.base_post_consensus_msg_processing(
                partial.signing_root,
                partial.signer,
                signature,
                &self.share,
            )?;
            // A batch may carry more entries for a root than exactly
            // `quorum_threshold` (spec.md §6: `messages` is a list), so
            // `has_quorum` stays true for every entry past the quorum-
            // crossing one; only the first observation of a root is a real
            // transition.
            if has_quorum && !newly_quorate_roots.contains(&partial.signing_root) {
                newly_quorate_roots.push(partial.signing_root);
            }
        }

        for root in newly_quorate_roots {
            // `try_finish` may have already reached `Finished` via an
            // earlier root in this same batch (or an earlier call); once
            // that happens `Beacon.submit_attestation` must not run again
            // (spec.md §4.G, §8 invariant 3).
            if self.base.is_finished() {
                break;
            }
            self.try_finish(root).await?;
        }
        Ok(())
    }

    async fn try_finish(&mut self, root: [u8; 32]) -> Result<(), DutyError> {
        let Some(duty) = self.base.state.duty.clone() else {
            return Ok(());
        };
        let Some(decided) = self.base.state.decided_value.clone() else {
            return Ok(());
        };

        match self.base.reconstruct_beacon_sig(root, &self.share.validator_aggregate_pubkey) {
            Ok(signature) => {
                let data = AttestationData::from_ssz_bytes(&decided.consensus_data.data_ssz)
                    .map_err(|_| DutyError::Consensus("malformed decided attestation data".into()))?;

                let mut aggregation_bits: BitVec<u8, Lsb0> = BitVec::repeat(false, duty.committee_length as usize);
                if let Some(mut bit) = aggregation_bits.get_mut(duty.validator_committee_index as usize) {
                    *bit = true;
                }

                let attestation = Attestation { aggregation_bits, data, signature: signature.serialize() };

                self.beacon
                    .submit_attestation(attestation)
                    .await
                    .map_err(|e| DutyError::SubmitFailed(e.to_string()))?;
                self.base.mark_finished();
                Ok(())
            }
            Err(DutyError::InvalidSignatures) => {
                let offenders = self.base.fall_back_and_verify_each_signature(root, &self.share);
                for signer_id in offenders {
                    tracing::warn!(signer_id, "partial signature failed verification");
                }
                // Stays in PostConsensus; no retry within this slot
                // (spec.md §7).
                Err(DutyError::InvalidSignatures)
            }
            Err(other) => Err(other),
        }
    }

    /// Step 0: the attester role never has a pre-consensus phase.
    pub fn process_pre_consensus(&self) -> Result<(), NoPreConsensus> {
        Err(NoPreConsensus)
    }

    /// SHA-256 of the runner's canonical, non-volatile state: the current
    /// duty, phase, and decided value — excluding timestamps and any other
    /// field whose value does not affect protocol behavior (spec.md §4.D).
    pub fn get_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        if let Some(duty) = &self.base.state.duty {
            hasher.update(duty.validator_pubkey);
            hasher.update(duty.committee_index.to_le_bytes());
            hasher.update(duty.committee_length.to_le_bytes());
            hasher.update(duty.validator_committee_index.to_le_bytes());
            hasher.update(duty.slot.as_u64().to_le_bytes());
        }
        hasher.update([self.base.state.phase as u8]);
        if let Some(decided) = &self.base.state.decided_value {
            hasher.update(&decided.consensus_data.data_ssz);
        }
        hasher.finalize().into()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}
