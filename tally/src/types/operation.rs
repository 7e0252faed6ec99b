use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::{chrono_datetime_as_bson_datetime, uuid_1_as_binary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of ledger write a pending operation is tracking.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
pub enum OperationKind {
    /// Registry transaction deploying a new election contract
    CreateElection,
    /// Election transaction adding a candidate
    RegisterCandidate,
    /// Election transaction casting a ballot
    CastVote,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
pub enum OperationState {
    /// The node accepted the transaction, no receipt has been observed yet
    Submitted,
    /// A receipt was observed and the transaction executed successfully
    Mined,
    /// A receipt was observed but the transaction reverted on-chain
    Reverted,
    /// The confirmation window elapsed without a receipt ever appearing
    PendingTimeout,
}

impl OperationState {
    /// Terminal states are never left again, not even by a manual re-check.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Mined | OperationState::Reverted)
    }
}

/// A single submitted ledger transaction and what the service knows about it.
///
/// One row is created per accepted submission and advanced exactly once by the
/// confirmation task, from `Submitted` to one of the other states. Rows are
/// never retried or resubmitted on behalf of the caller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    /// an uuid to identify the operation
    #[serde(with = "uuid_1_as_binary")]
    pub id: Uuid,
    /// transaction hash the node returned at submission, `0x` prefixed
    pub tx_handle: String,
    /// the kind of write being tracked
    pub kind: OperationKind,
    /// what the write concerns: an election address, or the organiser email
    /// for registry deployments
    pub subject_key: String,
    /// current confirmation state
    pub state: OperationState,
    /// helps to keep track of the version of the item for optimistic locking
    pub version: i32,
    /// timestamp when the operation was created
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// timestamp when the operation was last updated
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl PendingOperation {
    pub fn new(kind: OperationKind, subject_key: String, tx_handle: String) -> Self {
        let now = Utc::now().round_subsecs(0);
        Self {
            id: Uuid::new_v4(),
            tx_handle,
            kind,
            subject_key,
            state: OperationState::Submitted,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
