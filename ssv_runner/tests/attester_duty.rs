//! End-to-end scenarios for the attester duty runner (spec.md §8).

use bls::testing::toy_sharing;
use bls::SecretKeyShare;
use parking_lot::Mutex;
use ssv_runner::{AttestationDataCache, AttesterRunner, Beacon, Consensus, DutyError, Network, RunnerConfig, Signer};
use ssv_types::{
    AttestationData, Checkpoint, CommitteeIndex, ConsensusData, Duty, Hash256, Operator, Share,
    Slot, SignedPartialSignatureMessages, PartialSigMsgType, PartialSignatureMessage,
    PartialSignatureMessages, SsvMessage, SsvMessageType,
};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct FakeError(String);
impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct FakeConsensus {
    decided: Mutex<Option<ConsensusData>>,
}
impl FakeConsensus {
    fn new() -> Self {
        Self { decided: Mutex::new(None) }
    }
}
impl Consensus for FakeConsensus {
    type Error = FakeError;

    async fn decide(&self, data: ConsensusData) -> Result<(), Self::Error> {
        *self.decided.lock() = Some(data);
        Ok(())
    }

    async fn feed(&self, _message: SsvMessage) -> Result<(bool, Option<ConsensusData>), Self::Error> {
        Ok((true, self.decided.lock().clone()))
    }

    fn instance_progress(&self) -> (u64, u64) {
        (0, 0)
    }
}

struct FakeSigner(SecretKeyShare);
impl Signer for FakeSigner {
    fn sign(&self, _domain: [u8; 32], signing_root: [u8; 32]) -> bls::Signature {
        self.0.sign(signing_root)
    }
}

struct FakeNetwork {
    broadcasts: Mutex<Vec<SsvMessage>>,
}
impl FakeNetwork {
    fn new() -> Self {
        Self { broadcasts: Mutex::new(Vec::new()) }
    }
}
impl Network for FakeNetwork {
    type Error = FakeError;

    async fn broadcast(&self, message: SsvMessage) -> Result<(), Self::Error> {
        self.broadcasts.lock().push(message);
        Ok(())
    }
}

struct FakeBeacon {
    data: AttestationData,
    fetch_calls: Arc<AtomicUsize>,
    submissions: Arc<Mutex<Vec<ssv_runner::Attestation>>>,
}
impl FakeBeacon {
    fn new(data: AttestationData) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Vec<ssv_runner::Attestation>>>) {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let submissions = Arc::new(Mutex::new(Vec::new()));
        (Self { data, fetch_calls: fetch_calls.clone(), submissions: submissions.clone() }, fetch_calls, submissions)
    }
}
impl Beacon for FakeBeacon {
    type Error = FakeError;

    async fn get_attestation_data(&self, _slot: Slot, _committee_index: u64) -> Result<AttestationData, Self::Error> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.data.clone())
    }

    async fn submit_attestation(&self, attestation: ssv_runner::Attestation) -> Result<(), Self::Error> {
        self.submissions.lock().push(attestation);
        Ok(())
    }
}

fn sample_data(slot: u64) -> AttestationData {
    AttestationData {
        slot: Slot::new(slot),
        index: CommitteeIndex::new(0),
        beacon_block_root: Hash256::repeat_byte(0xaa),
        source: Checkpoint { epoch: 1, root: Hash256::zero() },
        target: Checkpoint { epoch: 2, root: Hash256::zero() },
    }
}

/// A 4-of-4 committee (quorum 3) for operator 1, plus every operator's
/// secret share so the test can play the role of the other three
/// operators broadcasting their own partials.
fn toy_committee() -> (Share, Vec<(u64, SecretKeyShare)>) {
    let (shares, aggregate_pubkey) = toy_sharing(3, 4);
    let operators: Vec<Operator> = shares
        .iter()
        .map(|(id, sk)| Operator { id: *id, public_key_share: sk.public_key() })
        .collect();
    let share = Share {
        threshold: 3,
        operator_id: 1,
        secret_key_share: shares[0].1.clone(),
        operators,
        validator_pubkey: [7u8; 48],
        validator_aggregate_pubkey: aggregate_pubkey,
        attester_domain: [3u8; 32],
    };
    (share, shares)
}

fn quorum_partials(
    shares: &[(u64, SecretKeyShare)],
    share: &Share,
    data: &AttestationData,
) -> SignedPartialSignatureMessages {
    let signing_root = ssv_types::signing_root(data, share.attester_domain);
    let messages: Vec<PartialSignatureMessage> = shares[..share.quorum_threshold()]
        .iter()
        .map(|(id, sk)| PartialSignatureMessage {
            partial_signature: sk.sign(signing_root).serialize(),
            signing_root,
            signer: *id,
        })
        .collect();
    SignedPartialSignatureMessages {
        signature: [0u8; 96],
        signer: 1,
        message: PartialSignatureMessages {
            msg_type: PartialSigMsgType::PostConsensusPartialSig,
            slot: data.slot,
            messages,
        },
    }
}

#[tokio::test]
async fn happy_path_decides_signs_reconstructs_and_submits_once() {
    let (share, shares) = toy_committee();
    let cache = Arc::new(AttestationDataCache::default());
    let (beacon, fetch_calls, submissions) = FakeBeacon::new(sample_data(100));
    let mut runner = AttesterRunner::new(
        cache,
        share.clone(),
        FakeConsensus::new(),
        FakeSigner(shares[0].1.clone()),
        FakeNetwork::new(),
        beacon,
        RunnerConfig::default(),
    );

    let duty = Duty::new([7u8; 48], 2, 4, 1, Slot::new(100));
    runner.execute_duty(duty).await.unwrap();
    assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);

    let dummy_msg = SsvMessage { msg_type: SsvMessageType::Consensus, msg_id: [0u8; 56], data: vec![] };
    runner.process_consensus(dummy_msg).await.unwrap();

    let decided_data = sample_data(100).with_index(2);
    let signed = quorum_partials(&shares, &share, &decided_data);
    runner.process_post_consensus(signed.clone()).await.unwrap();

    assert!(runner.base.is_finished());
    assert_eq!(submissions.lock().len(), 1);

    // A duplicate delivery of the same quorum batch must not resubmit.
    runner.process_post_consensus(signed).await.unwrap();
    assert_eq!(submissions.lock().len(), 1);
}

#[tokio::test]
async fn reconstruction_failure_aborts_without_submitting() {
    let (share, shares) = toy_committee();
    let cache = Arc::new(AttestationDataCache::default());
    let (beacon, _fetch_calls, submissions) = FakeBeacon::new(sample_data(101));
    let mut runner = AttesterRunner::new(
        cache,
        share.clone(),
        FakeConsensus::new(),
        FakeSigner(shares[0].1.clone()),
        FakeNetwork::new(),
        beacon,
        RunnerConfig::default(),
    );

    let duty = Duty::new([7u8; 48], 0, 4, 0, Slot::new(101));
    runner.execute_duty(duty).await.unwrap();
    let dummy_msg = SsvMessage { msg_type: SsvMessageType::Consensus, msg_id: [0u8; 56], data: vec![] };
    runner.process_consensus(dummy_msg).await.unwrap();

    let decided_data = sample_data(101).with_index(0);
    let mut signed = quorum_partials(&shares, &share, &decided_data);
    // Corrupt one partial: sign a different root with the same signer id.
    let wrong_root = [0xffu8; 32];
    signed.message.messages[0].partial_signature = shares[0].1.sign(wrong_root).serialize();

    let err = runner.process_post_consensus(signed).await.unwrap_err();
    assert_eq!(err, DutyError::InvalidSignatures);
    assert!(!runner.base.is_finished());
    assert_eq!(submissions.lock().len(), 0);
}

#[tokio::test]
async fn slot_regression_is_rejected_after_finish() {
    let (share, shares) = toy_committee();
    let cache = Arc::new(AttestationDataCache::default());
    let (beacon, _fetch_calls, submissions) = FakeBeacon::new(sample_data(200));
    let mut runner = AttesterRunner::new(
        cache,
        share.clone(),
        FakeConsensus::new(),
        FakeSigner(shares[0].1.clone()),
        FakeNetwork::new(),
        beacon,
        RunnerConfig::default(),
    );

    let duty = Duty::new([7u8; 48], 0, 4, 0, Slot::new(200));
    runner.execute_duty(duty).await.unwrap();
    let dummy_msg = SsvMessage { msg_type: SsvMessageType::Consensus, msg_id: [0u8; 56], data: vec![] };
    runner.process_consensus(dummy_msg).await.unwrap();
    let decided_data = sample_data(200).with_index(0);
    let signed = quorum_partials(&shares, &share, &decided_data);
    runner.process_post_consensus(signed).await.unwrap();
    assert!(runner.base.is_finished());
    assert_eq!(submissions.lock().len(), 1);

    let regressed_duty = Duty::new([7u8; 48], 0, 4, 0, Slot::new(150));
    let err = runner.execute_duty(regressed_duty).await.unwrap_err();
    match err {
        DutyError::SlotRegressed { requested, highest_decided } => {
            assert_eq!(requested, 150);
            assert_eq!(highest_decided, 200);
        }
        other => panic!("expected SlotRegressed, got {other:?}"),
    }
}

#[tokio::test]
async fn cache_coalesces_concurrent_duty_executions_for_the_same_slot() {
    let (share, shares) = toy_committee();
    let cache = Arc::new(AttestationDataCache::default());
    let (beacon, fetch_calls, _submissions) = FakeBeacon::new(sample_data(300));
    let beacon = Arc::new(beacon);

    // Two different committee members' duties land on the same slot; each
    // must see its own committee index after the shared cache fetch.
    let cache_a = cache.clone();
    let beacon_a = beacon.clone();
    let task_a = tokio::spawn(async move {
        cache_a
            .get_or_fetch(Slot::new(300), || async move {
                beacon_a
                    .get_attestation_data(Slot::new(300), 1)
                    .await
                    .map_err(|e| ssv_runner::CacheError::FetchFailed(e.to_string()))
            })
            .await
            .unwrap()
            .with_index(1)
    });
    let cache_b = cache.clone();
    let beacon_b = beacon.clone();
    let task_b = tokio::spawn(async move {
        cache_b
            .get_or_fetch(Slot::new(300), || async move {
                beacon_b
                    .get_attestation_data(Slot::new(300), 2)
                    .await
                    .map_err(|e| ssv_runner::CacheError::FetchFailed(e.to_string()))
            })
            .await
            .unwrap()
            .with_index(2)
    });

    let (data_a, data_b) = (task_a.await.unwrap(), task_b.await.unwrap());
    assert_eq!(data_a.index, CommitteeIndex::new(1));
    assert_eq!(data_b.index, CommitteeIndex::new(2));
    assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);

    // Silence the unused-field warning for `share`/`shares` in this test.
    let _ = (&share, &shares);
}
