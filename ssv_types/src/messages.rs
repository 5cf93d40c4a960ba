use crate::duty::{Duty, PublicKeyBytes, Role};
use serde::{Deserialize, Serialize};

/// `NewMsgID(domain_type, validator_pubkey, role_type)`: `4 + 48 + 4 = 56`
/// bytes, used to route inbound gossip to the right duty runner.
pub type MsgId = [u8; 56];

pub fn new_msg_id(domain_type: [u8; 4], validator_pubkey: PublicKeyBytes, role: Role) -> MsgId {
    let role_type: [u8; 4] = match role {
        Role::Attester => [0, 0, 0, 1],
    };
    let mut id = [0u8; 56];
    id[0..4].copy_from_slice(&domain_type);
    id[4..52].copy_from_slice(&validator_pubkey);
    id[52..56].copy_from_slice(&role_type);
    id
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SsvMessageType {
    Consensus,
    PartialSignature,
}

/// The outer envelope every gossiped message arrives wrapped in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsvMessage {
    pub msg_type: SsvMessageType,
    pub msg_id: MsgId,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartialSigMsgType {
    RandaoPartialSig,
    SelectionProofPartialSig,
    PostConsensusPartialSig,
    ContributionProofs,
    ValidatorRegistrationPartialSig,
}

/// One operator's partial signature over one signing root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialSignatureMessage {
    pub partial_signature: [u8; 96],
    pub signing_root: [u8; 32],
    pub signer: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialSignatureMessages {
    #[serde(rename = "type")]
    pub msg_type: PartialSigMsgType,
    pub slot: crate::Slot,
    pub messages: Vec<PartialSignatureMessage>,
}

/// The signed wrapper broadcast over gossip: the whole
/// `PartialSignatureMessages` batch, signed once by the sending operator
/// with its RSA/operator key (out of scope — the signature here is
/// opaque to this core; only partial BLS signatures inside `messages` are
/// meaningful to `PartialSignatureContainer`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedPartialSignatureMessages {
    pub signature: [u8; 96],
    pub signer: u64,
    pub message: PartialSignatureMessages,
}

/// The value handed into the consensus engine as the proposed value for a
/// QBFT instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusData {
    pub duty: Duty,
    pub version: u64,
    pub data_ssz: Vec<u8>,
}
