use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::types::operation::{OperationState, PendingOperation};
use crate::types::projection::{
    AuditEntry, CandidateRecord, ElectionMetadata, MirrorState, VoterRecord, VoterStatus,
};

pub mod mongodb;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] ::mongodb::bson::ser::Error),

    #[error("Failed to deserialize document: {0}")]
    Deserialize(#[from] ::mongodb::bson::de::Error),

    #[error("Database driver error: {0}")]
    Driver(#[from] ::mongodb::error::Error),

    #[error("Item already exists: {0}")]
    ItemAlreadyExists(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Failed to update document: {0}")]
    UpdateFailed(String),
}

/// Off-chain mirror store.
///
/// The mirror is authoritative for nothing the ledger stores; it exists so
/// reads can be answered when the ledger cannot be reached and so
/// confirmation state survives a response cycle. All methods are async and
/// safe to call concurrently.
#[automock]
#[async_trait]
pub trait Database: Send + Sync {
    /// Insert a fresh pending operation row. Fails with `ItemAlreadyExists`
    /// when a row for the same transaction handle is already present.
    async fn create_operation(&self, operation: PendingOperation) -> Result<PendingOperation, DatabaseError>;

    async fn get_operation_by_handle(&self, tx_handle: &str) -> Result<Option<PendingOperation>, DatabaseError>;

    /// Advance a pending operation to `state` using optimistic locking.
    ///
    /// The update matches on handle and the version carried by `operation`.
    /// If two confirmations race, the second sees no matching document and
    /// gets `UpdateFailed` instead of silently overwriting, which keeps state
    /// transitions monotonic. Terminal states are additionally guarded by the
    /// caller never re-submitting a finished operation.
    async fn update_operation_state(
        &self,
        operation: &PendingOperation,
        state: OperationState,
    ) -> Result<PendingOperation, DatabaseError>;

    /// Insert the mirror row for a submitted candidate registration.
    async fn create_candidate(&self, candidate: CandidateRecord) -> Result<CandidateRecord, DatabaseError>;

    /// All mirrored candidates for an election address, matched exactly but
    /// case-insensitively.
    async fn get_candidates_by_election(&self, election_address: &str) -> Result<Vec<CandidateRecord>, DatabaseError>;

    async fn get_candidate_by_email(
        &self,
        election_address: &str,
        email: &str,
    ) -> Result<Option<CandidateRecord>, DatabaseError>;

    /// Flip the mirror state of the candidate row keyed by transaction handle.
    async fn set_candidate_mirror_state(&self, tx_handle: &str, state: MirrorState) -> Result<(), DatabaseError>;

    async fn count_candidates(&self, election_address: &str) -> Result<u64, DatabaseError>;

    /// Seed metadata for a deployed election if absent; backfill the name and
    /// description when an earlier row was created without them.
    async fn ensure_metadata(
        &self,
        election_address: &str,
        election_name: &str,
        election_desc: &str,
    ) -> Result<(), DatabaseError>;

    async fn get_metadata(&self, election_address: &str) -> Result<Option<ElectionMetadata>, DatabaseError>;

    /// All metadata rows, newest start date first.
    async fn list_metadata(&self) -> Result<Vec<ElectionMetadata>, DatabaseError>;

    /// Upsert the voting window for an election and mark it `SCHEDULED`.
    async fn set_schedule(
        &self,
        election_address: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    /// Mark an election `ENDED` and close its window now.
    async fn end_election(&self, election_address: &str) -> Result<(), DatabaseError>;

    /// Known election addresses starting with `prefix`, case-insensitive,
    /// capped at `limit`.
    async fn find_addresses_with_prefix(&self, prefix: &str, limit: i64) -> Result<Vec<String>, DatabaseError>;

    /// Insert a voter enrollment. Fails with `ItemAlreadyExists` when the
    /// email is already enrolled for the election.
    async fn enroll_voter(&self, voter: VoterRecord) -> Result<VoterRecord, DatabaseError>;

    async fn get_voter(&self, election_address: &str, email: &str) -> Result<Option<VoterRecord>, DatabaseError>;

    /// Set the review status of an enrolled voter. Fails with `NotFound` when
    /// no enrollment exists.
    async fn set_voter_status(
        &self,
        election_address: &str,
        email: &str,
        status: VoterStatus,
    ) -> Result<VoterRecord, DatabaseError>;

    async fn list_voters(&self, election_address: &str) -> Result<Vec<VoterRecord>, DatabaseError>;

    async fn count_voters(&self, election_address: &str) -> Result<u64, DatabaseError>;

    /// Append one audit line. The trail is append-only.
    async fn append_audit(&self, entry: AuditEntry) -> Result<(), DatabaseError>;

    /// Audit lines for an election, oldest first, so callers get a timeline.
    async fn list_audit(&self, election_address: &str) -> Result<Vec<AuditEntry>, DatabaseError>;
}
