use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::types::operation::OperationState;

/// Lifecycle of a mirrored write as stored on its off-chain row.
///
/// These are the wire values historic rows already use, so the variants
/// serialize lowercase. `Pending` covers both a confirmation that timed out
/// and a sync wait that gave up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum MirrorState {
    Submitted,
    Pending,
    Mined,
    Reverted,
}

impl From<OperationState> for MirrorState {
    fn from(state: OperationState) -> Self {
        match state {
            OperationState::Submitted => MirrorState::Submitted,
            OperationState::Mined => MirrorState::Mined,
            OperationState::Reverted => MirrorState::Reverted,
            OperationState::PendingTimeout => MirrorState::Pending,
        }
    }
}

/// Off-chain copy of a candidate registration, written at submission time and
/// advanced as the transaction confirms. Field names match the historic
/// document layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub name: String,
    pub email: String,
    pub description: String,
    pub image_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifesto_url: Option<String>,
    pub election_name: String,
    pub election_address: String,
    #[serde(rename = "txHash")]
    pub tx_handle: String,
    #[serde(rename = "status")]
    pub state: MirrorState,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl CandidateRecord {
    /// Row written the moment the registration transaction is accepted,
    /// before any receipt exists.
    #[allow(clippy::too_many_arguments)]
    pub fn submitted(
        name: String,
        email: String,
        description: String,
        image_hash: String,
        manifesto_url: Option<String>,
        election_name: String,
        election_address: String,
        tx_handle: String,
    ) -> Self {
        let now = Utc::now().round_subsecs(0);
        Self {
            name,
            email,
            description,
            image_hash,
            manifesto_url,
            election_name,
            election_address,
            tx_handle,
            state: MirrorState::Submitted,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Scheduling phase of an election. Stored uppercase, as historic rows are.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElectionPhase {
    Upcoming,
    Ongoing,
    Ended,
    Scheduled,
}

/// Off-chain schedule and naming for one election contract.
///
/// An election with no metadata row is treated as always open. Rows are
/// seeded when a deployment confirms and reshaped by the schedule endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ElectionMetadata {
    pub election_address: String,
    pub election_name: String,
    pub election_desc: String,
    pub status: ElectionPhase,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_date: DateTime<Utc>,
}

impl ElectionMetadata {
    /// Row seeded for a freshly deployed election: opened an hour in the past
    /// and closing a week out, so the election is immediately votable until
    /// an admin sets real dates.
    pub fn open_defaults(election_address: String, election_name: String, election_desc: String) -> Self {
        let now = Utc::now().round_subsecs(0);
        Self {
            election_address,
            election_name,
            election_desc,
            status: ElectionPhase::Ongoing,
            start_date: now - chrono::Duration::hours(1),
            end_date: now + chrono::Duration::days(7),
        }
    }
}

/// Review state of an enrolled voter. Stored capitalized, as historic rows are.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum VoterStatus {
    Pending,
    Verified,
    Rejected,
}

/// One voter enrollment for one election. Only `Verified` voters pass the
/// ballot gate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoterRecord {
    pub name: String,
    pub email: String,
    pub election_address: String,
    pub status: VoterStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl VoterRecord {
    pub fn new(name: String, email: String, election_address: String, status: VoterStatus) -> Self {
        let now = Utc::now().round_subsecs(0);
        Self { name, email, election_address, status, created_at: now, updated_at: now }
    }
}

/// Administrative actions recorded in the audit trail.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    ElectionCreated,
    CandidateRegistered,
    VoteCast,
    ScheduleUpdate,
    ElectionEnded,
    VoterEnrolled,
    VoterReviewed,
}

/// One immutable line of the per-election audit trail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub election_address: String,
    pub action: AuditAction,
    pub actor: String,
    pub details: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(election_address: String, action: AuditAction, actor: String, details: String) -> Self {
        Self { election_address, action, actor, details, timestamp: Utc::now().round_subsecs(0) }
    }
}
