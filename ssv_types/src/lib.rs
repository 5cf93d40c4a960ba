//! Shared data types for the SSV attester-duty core: the wire/domain model
//! that `ssv_runner` operates on, kept dependency-light and free of any
//! runtime/async concerns.

pub mod attestation_data;
pub mod domain;
pub mod duty;
pub mod hash256;
pub mod messages;
pub mod share;
pub mod slot_epoch;

pub use attestation_data::{AttestationData, Checkpoint};
pub use domain::{signing_root, DOMAIN_ATTESTER_TYPE};
pub use duty::{Duty, PublicKeyBytes, Role};
pub use hash256::Hash256;
pub use messages::{
    new_msg_id, ConsensusData, MsgId, PartialSigMsgType, PartialSignatureMessage,
    PartialSignatureMessages, SignedPartialSignatureMessages, SsvMessage, SsvMessageType,
};
pub use share::{Operator, Share};
pub use slot_epoch::{CommitteeIndex, Slot};
