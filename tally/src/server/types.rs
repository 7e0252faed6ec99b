use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reader::{ElectionSummary, Provenance};
use crate::types::operation::{OperationState, PendingOperation};
use crate::types::projection::{AuditEntry, ElectionMetadata, ElectionPhase, VoterRecord, VoterStatus};

/// Top-level verdict carried by every response body.
///
/// `Pending` is only produced by write endpoints that held the response open
/// for a confirmation that did not arrive in time. The transaction is still
/// being tracked in the background when a caller sees it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Pending,
    Error,
}

/// Body returned by every write endpoint.
///
/// `confirmed` is only true when the handler saw the transaction mine inside
/// its synchronous wait window. A plain submission answers `success` with
/// `confirmed: false` and leaves confirmation to the background tracker.
#[derive(Serialize, Debug, Clone)]
pub struct WriteReceipt {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(rename = "txHash")]
    pub tx_handle: String,
    pub confirmed: bool,
    /// Deployments answer before the new contract address is knowable, so
    /// the field is present but empty on election creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub election_address: Option<String>,
}

impl WriteReceipt {
    pub fn submitted(message: impl Into<String>, tx_handle: String) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            tx_handle,
            confirmed: false,
            election_address: None,
        }
    }

    /// Verdict receipt for a transaction seen mining inside the sync window.
    pub fn confirmed(message: impl Into<String>, tx_handle: String) -> Self {
        Self { confirmed: true, ..Self::submitted(message, tx_handle) }
    }

    /// Verdict receipt for a transaction still unconfirmed when the sync
    /// window closed.
    pub fn pending(message: impl Into<String>, tx_handle: String) -> Self {
        Self { status: ResponseStatus::Pending, ..Self::submitted(message, tx_handle) }
    }

    /// Verdict receipt for a transaction that mined but reverted.
    pub fn failed(message: impl Into<String>, tx_handle: String) -> Self {
        Self { status: ResponseStatus::Error, ..Self::submitted(message, tx_handle) }
    }

    pub fn with_election_address(mut self, election_address: String) -> Self {
        self.election_address = Some(election_address);
        self
    }
}

/// Error body shared by every failing route.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
    /// Causal chain when a read exhausted both the ledger and the mirror.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// How many stored elections matched an ambiguous truncated identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<u64>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Error, message: message.into(), detail: None, matches: None }
    }

    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_matches(mut self, matches: u64) -> Self {
        self.matches = Some(matches);
        self
    }
}

/// Candidate list with its provenance tag. `detail` explains why the mirror
/// had to answer and is absent on a live read.
#[derive(Serialize, Debug)]
pub struct CandidatesResponse<T: Serialize> {
    pub status: ResponseStatus,
    pub source: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub candidates: Vec<T>,
}

impl<T: Serialize> CandidatesResponse<T> {
    pub fn onchain(candidates: Vec<T>) -> Self {
        Self { status: ResponseStatus::Success, source: Provenance::Onchain, detail: None, candidates }
    }

    pub fn fallback(detail: String, candidates: Vec<T>) -> Self {
        Self { status: ResponseStatus::Success, source: Provenance::DbFallback, detail: Some(detail), candidates }
    }
}

/// Election summary with its provenance tag, same shape rules as
/// [`CandidatesResponse`].
#[derive(Serialize, Debug)]
pub struct SummaryResponse {
    pub status: ResponseStatus,
    pub source: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub data: ElectionSummary,
}

impl SummaryResponse {
    pub fn onchain(data: ElectionSummary) -> Self {
        Self { status: ResponseStatus::Success, source: Provenance::Onchain, detail: None, data }
    }

    pub fn fallback(detail: String, data: ElectionSummary) -> Self {
        Self { status: ResponseStatus::Success, source: Provenance::DbFallback, detail: Some(detail), data }
    }
}

/// Envelope for a single off-chain record.
#[derive(Serialize, Debug)]
pub struct DataResponse<T: Serialize> {
    pub status: ResponseStatus,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { status: ResponseStatus::Success, data }
    }
}

/// Envelope for off-chain listings.
#[derive(Serialize, Debug)]
pub struct ListResponse<T: Serialize> {
    pub status: ResponseStatus,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        let count = data.len();
        Self { status: ResponseStatus::Success, data, count }
    }
}

/// Plain acknowledgement for administrative writes.
#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Success, message: message.into() }
    }
}

/// Metadata row as served over HTTP. The stored row keeps BSON datetimes,
/// this view serializes them as RFC 3339 strings.
#[derive(Serialize, Debug, Clone)]
pub struct MetadataView {
    pub election_address: String,
    pub election_name: String,
    pub election_desc: String,
    pub status: ElectionPhase,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<ElectionMetadata> for MetadataView {
    fn from(meta: ElectionMetadata) -> Self {
        Self {
            election_address: meta.election_address,
            election_name: meta.election_name,
            election_desc: meta.election_desc,
            status: meta.status,
            start_date: meta.start_date,
            end_date: meta.end_date,
        }
    }
}

/// Voter enrollment as served over HTTP.
#[derive(Serialize, Debug, Clone)]
pub struct VoterView {
    pub name: String,
    pub email: String,
    pub election_address: String,
    pub status: VoterStatus,
    pub created_at: DateTime<Utc>,
}

impl From<VoterRecord> for VoterView {
    fn from(voter: VoterRecord) -> Self {
        Self {
            name: voter.name,
            email: voter.email,
            election_address: voter.election_address,
            status: voter.status,
            created_at: voter.created_at,
        }
    }
}

/// Audit line as served over HTTP.
#[derive(Serialize, Debug, Clone)]
pub struct AuditView {
    pub election_address: String,
    pub action: String,
    pub actor: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl From<AuditEntry> for AuditView {
    fn from(entry: AuditEntry) -> Self {
        Self {
            election_address: entry.election_address,
            action: entry.action.to_string(),
            actor: entry.actor,
            details: entry.details,
            timestamp: entry.timestamp,
        }
    }
}

/// Pending operation as served over HTTP.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OperationView {
    pub id: String,
    #[serde(rename = "txHash")]
    pub tx_handle: String,
    pub kind: String,
    pub subject_key: String,
    pub state: String,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PendingOperation> for OperationView {
    fn from(operation: PendingOperation) -> Self {
        Self {
            id: operation.id.to_string(),
            tx_handle: operation.tx_handle,
            kind: operation.kind.to_string(),
            subject_key: operation.subject_key,
            state: operation.state.to_string(),
            confirmed: operation.state == OperationState::Mined,
            created_at: operation.created_at,
            updated_at: operation.updated_at,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateElectionRequest {
    #[serde(default)]
    pub company_email: String,
    #[serde(default)]
    pub election_name: String,
    #[serde(default)]
    pub election_description: String,
}

#[derive(Deserialize, Debug)]
pub struct RegisterCandidateRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "imageHash")]
    pub image_hash: String,
    /// Display name mirrored alongside the candidate row.
    #[serde(default)]
    pub election_name: String,
    /// Off-chain only, merged into live reads.
    #[serde(default)]
    pub manifesto_url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct VoteRequest {
    #[serde(default)]
    pub candidate_id: u64,
    #[serde(default)]
    pub voter_email: String,
}

#[derive(Deserialize, Debug)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

#[derive(Deserialize, Debug)]
pub struct EnrollVoterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct ReviewVoterRequest {
    /// `Verified` or `Rejected`. Absent means approve.
    #[serde(default)]
    pub status: Option<String>,
}

/// Election identifier extracted from the URL path. Kept raw here, the
/// resolver decides what it is.
#[derive(Deserialize)]
pub struct ElectionIdentifier {
    pub identifier: String,
}

/// Election identifier and voter email extracted from the URL path.
#[derive(Deserialize)]
pub struct VoterPath {
    pub identifier: String,
    pub email: String,
}

/// Transaction handle extracted from the URL path.
#[derive(Deserialize)]
pub struct OperationHandle {
    pub handle: String,
}
