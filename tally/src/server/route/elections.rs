use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tally_ledger_client::types::CandidateSubmission;
use tally_ledger_client::LedgerClientError;
use tracing::{error, info, instrument, warn};

use super::super::error::{ElectionRouteError, ElectionRouteResult};
use super::super::types::{
    AuditView, CandidatesResponse, CreateElectionRequest, DataResponse, ElectionIdentifier, EnrollVoterRequest,
    ListResponse, MessageResponse, MetadataView, RegisterCandidateRequest, ReviewVoterRequest, ScheduleRequest,
    SummaryResponse, VoteRequest, VoterPath, VoterView, WriteReceipt,
};
use crate::config::Config;
use crate::database::DatabaseError;
use crate::reader::{fallback_candidates, fallback_summary, read_candidates, read_summary, CandidatesRead, SummaryRead};
use crate::resolver::{normalize_address, resolve_election, trim_identifier};
use crate::tracker::{await_verdict, track_operation, OperationSideEffect};
use crate::types::identifier::ResolveError;
use crate::types::operation::{OperationKind, OperationState};
use crate::types::projection::{AuditAction, AuditEntry, CandidateRecord, ElectionPhase, VoterRecord, VoterStatus};

/// Handles requests to deploy a new election contract.
///
/// The registry contract is inspected before anything is signed, so an
/// unreachable node or a misconfigured registry address fails the call
/// without submitting. A successful submission answers immediately with the
/// transaction handle; the deployed address is looked up by the background
/// tracker once the transaction mines.
///
/// # Errors
/// * `BadRequest` - required fields missing
/// * `LedgerUnavailable` - the node could not be reached
/// * `Internal` - registry inspection or submission failed
#[instrument(skip(config, payload), fields(organizer = %payload.company_email))]
async fn handle_create_election_request(
    State(config): State<Arc<Config>>,
    Json(payload): Json<CreateElectionRequest>,
) -> ElectionRouteResult {
    if payload.company_email.is_empty() || payload.election_name.is_empty() || payload.election_description.is_empty()
    {
        return Err(ElectionRouteError::BadRequest(
            "company_email, election_name and election_description are required".to_string(),
        ));
    }

    let registry = config.ledger().registry_address();
    match config.ledger().code_at(registry).await {
        Err(e) if e.is_recoverable() => {
            error!(error = %e, "Ethereum node unreachable, nothing was submitted");
            return Err(ElectionRouteError::LedgerUnavailable("failed to connect to ethereum node".to_string()));
        }
        Err(e) => {
            error!(error = %e, "Registry code inspection failed");
            return Err(ElectionRouteError::Internal("failed to inspect factory contract".to_string()));
        }
        Ok(code) if code.is_empty() => {
            return Err(ElectionRouteError::Internal(
                "no contract code at configured registry contract address".to_string(),
            ));
        }
        Ok(_) => {}
    }

    let tx_handle = config
        .ledger()
        .create_election(&payload.company_email, &payload.election_name, &payload.election_description)
        .await
        .map_err(|e| {
            error!(error = %e, "Election deployment rejected by the node");
            ledger_write_error(&e, format!("failed to create election on blockchain: {e}"))
        })?;

    info!(tx_handle = %tx_handle, "Election deployment submitted");

    let side_effect = OperationSideEffect::SeedElection {
        email: payload.company_email.clone(),
        name: payload.election_name,
        description: payload.election_description,
    };
    if let Err(e) =
        track_operation(config.clone(), OperationKind::CreateElection, payload.company_email, tx_handle, side_effect)
            .await
    {
        error!(tx_handle = %tx_handle, error = %e, "Submitted deployment could not be tracked");
    }

    let receipt = WriteReceipt::submitted("createElection transaction submitted", tx_handle.to_string())
        .with_election_address(String::new());
    Ok(Json(receipt).into_response())
}

/// Handles requests to register a candidate on an election contract.
///
/// The mirror row is written as soon as the node accepts the transaction, so
/// candidate data survives even if confirmation never comes. When a
/// synchronous wait window is configured the response carries the
/// confirmation verdict; submission-side failures after the transaction is
/// out are reported inside a 200 body to not lose the handle.
#[instrument(skip(config, payload), fields(election = %identifier))]
async fn handle_register_candidate_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
    Json(payload): Json<RegisterCandidateRequest>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    if payload.email.is_empty() || payload.name.is_empty() {
        return Err(ElectionRouteError::BadRequest("email and name are required".to_string()));
    }

    let submission = CandidateSubmission {
        name: payload.name.clone(),
        description: payload.description.clone(),
        image_hash: payload.image_hash.clone(),
        email: payload.email.clone(),
    };
    let tx_handle = config.ledger().register_candidate(address, submission).await.map_err(|e| {
        error!(error = %e, "Candidate registration rejected by the node");
        if e.is_recoverable() {
            ElectionRouteError::LedgerUnavailable(format!("Failed to connect to Ethereum node: {e}"))
        } else {
            ElectionRouteError::Internal(format!("Failed to register candidate on blockchain: {e}"))
        }
    })?;

    let canonical = address.to_string();
    info!(tx_handle = %tx_handle, candidate = %payload.email, "Candidate registration submitted");

    let mirror = CandidateRecord::submitted(
        payload.name,
        payload.email.clone(),
        payload.description,
        payload.image_hash,
        payload.manifesto_url,
        payload.election_name,
        canonical.clone(),
        tx_handle.to_string(),
    );
    if let Err(e) = config.database().create_candidate(mirror).await {
        warn!(tx_handle = %tx_handle, error = %e, "Failed to mirror candidate registration, continuing");
    }

    let side_effect = OperationSideEffect::MirrorCandidate { candidate_email: payload.email };
    let mut submitted = match track_operation(
        config.clone(),
        OperationKind::RegisterCandidate,
        canonical,
        tx_handle,
        side_effect,
    )
    .await
    {
        Ok(submitted) => submitted,
        Err(e) => {
            error!(tx_handle = %tx_handle, error = %e, "Submitted registration could not be tracked");
            let receipt =
                WriteReceipt::submitted("Candidate registration transaction submitted", tx_handle.to_string());
            return Ok(Json(receipt).into_response());
        }
    };

    let wait = config.tracker_params().sync_wait();
    if wait.is_zero() {
        let receipt = WriteReceipt::submitted("Candidate registration transaction submitted", tx_handle.to_string());
        return Ok(Json(receipt).into_response());
    }

    let receipt = match await_verdict(&mut submitted, wait).await {
        Ok(OperationState::Mined) => {
            info!(tx_handle = %tx_handle, "Candidate registration confirmed within the sync window");
            WriteReceipt::confirmed("Candidate registered and transaction mined", tx_handle.to_string())
        }
        Ok(OperationState::Reverted) => {
            WriteReceipt::failed("Transaction mined but reverted on-chain", tx_handle.to_string())
        }
        Ok(OperationState::Submitted | OperationState::PendingTimeout) => WriteReceipt::pending(
            "Transaction submitted but mining confirmation failed: no receipt within the confirmation window",
            tx_handle.to_string(),
        ),
        Err(reason) => WriteReceipt::pending(
            format!("Transaction submitted but mining confirmation failed: {reason}"),
            tx_handle.to_string(),
        ),
    };
    Ok(Json(receipt).into_response())
}

/// Handles requests to cast a ballot on an election contract.
///
/// Gated on the stored voting window and on the voter holding a `Verified`
/// enrollment. The election contract is inspected before submission so a
/// stale address reports "no contract code" instead of a revert.
#[instrument(skip(config, payload), fields(election = %identifier))]
async fn handle_cast_vote_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
    Json(payload): Json<VoteRequest>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    if payload.voter_email.is_empty() {
        return Err(ElectionRouteError::BadRequest("voter_email is required".to_string()));
    }

    let canonical = address.to_string();
    if let Some(reason) = voting_window_reason(&config, &canonical).await {
        return Err(ElectionRouteError::BadRequest(format!("Voting not allowed: {reason}")));
    }
    if !is_voter_verified(&config, &canonical, &payload.voter_email).await {
        return Err(ElectionRouteError::VoterNotVerified);
    }

    match config.ledger().code_at(address).await {
        Err(e) if e.is_recoverable() => {
            error!(error = %e, "Ethereum node unreachable, nothing was submitted");
            return Err(ElectionRouteError::LedgerUnavailable("failed to connect to ethereum node".to_string()));
        }
        Err(e) => {
            error!(error = %e, "Election code inspection failed");
            return Err(ElectionRouteError::Internal("failed to inspect contract code".to_string()));
        }
        Ok(code) if code.is_empty() => {
            return Err(ElectionRouteError::BadRequest("no contract code at given election address".to_string()));
        }
        Ok(_) => {}
    }

    let tx_handle =
        config.ledger().cast_vote(address, payload.candidate_id, &payload.voter_email).await.map_err(|e| {
            error!(error = %e, "Vote rejected by the node");
            ledger_write_error(&e, format!("failed to submit vote transaction: {e}"))
        })?;

    info!(tx_handle = %tx_handle, voter = %payload.voter_email, "Vote submitted");

    let side_effect = OperationSideEffect::RecordVote { voter_email: payload.voter_email };
    if let Err(e) = track_operation(config.clone(), OperationKind::CastVote, canonical, tx_handle, side_effect).await {
        error!(tx_handle = %tx_handle, error = %e, "Submitted vote could not be tracked");
    }

    let receipt = WriteReceipt::submitted("vote transaction submitted to the blockchain", tx_handle.to_string());
    Ok(Json(receipt).into_response())
}

/// Handles requests for the candidate list of an election.
///
/// The identifier goes through the full resolution ladder. A resolved
/// address is read live with mirror fallback; an identifier that never
/// resolves is still answered from the mirror, keyed by the trimmed
/// identifier, with the resolution failure as `detail`. Only ambiguity is a
/// hard error, the caller has to disambiguate.
#[instrument(skip(config), fields(election = %identifier))]
async fn handle_election_candidates_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
) -> ElectionRouteResult {
    match resolve_election(&config, &identifier).await {
        Ok(resolved) => match read_candidates(&config, resolved.address).await? {
            CandidatesRead::Onchain { candidates } => Ok(Json(CandidatesResponse::onchain(candidates)).into_response()),
            CandidatesRead::Fallback { detail, candidates } => {
                Ok(Json(CandidatesResponse::fallback(detail, candidates)).into_response())
            }
        },
        Err(ResolveError::Ambiguous { matches }) => {
            info!(matches, "Truncated identifier is ambiguous");
            Err(ElectionRouteError::AmbiguousIdentifier { matches })
        }
        Err(ResolveError::Empty) => {
            mirrored_candidates(&config, trim_identifier(&identifier), "invalid or truncated election address".into())
                .await
        }
        Err(ResolveError::Unresolved(detail)) => {
            mirrored_candidates(&config, trim_identifier(&identifier), detail).await
        }
        Err(e) => Err(ElectionRouteError::BadRequest(e.to_string())),
    }
}

/// Handles requests for the headline numbers of an election, with the same
/// resolution and fallback ladder as the candidate list.
#[instrument(skip(config), fields(election = %identifier))]
async fn handle_election_summary_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
) -> ElectionRouteResult {
    match resolve_election(&config, &identifier).await {
        Ok(resolved) => match read_summary(&config, resolved.address).await? {
            SummaryRead::Onchain { summary } => Ok(Json(SummaryResponse::onchain(summary)).into_response()),
            SummaryRead::Fallback { detail, summary } => {
                Ok(Json(SummaryResponse::fallback(detail, summary)).into_response())
            }
        },
        Err(ResolveError::Ambiguous { matches }) => {
            info!(matches, "Truncated identifier is ambiguous");
            Err(ElectionRouteError::AmbiguousIdentifier { matches })
        }
        Err(ResolveError::Empty) => {
            mirrored_summary(&config, trim_identifier(&identifier), "invalid or truncated election address".into())
                .await
        }
        Err(ResolveError::Unresolved(detail)) => mirrored_summary(&config, trim_identifier(&identifier), detail).await,
        Err(e) => Err(ElectionRouteError::BadRequest(e.to_string())),
    }
}

/// Handles requests for the stored schedule and naming of an election.
#[instrument(skip(config), fields(election = %identifier))]
async fn handle_election_metadata_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    match config.database().get_metadata(&address.to_string()).await {
        Ok(Some(meta)) => Ok(Json(DataResponse::new(MetadataView::from(meta))).into_response()),
        Ok(None) => {
            Err(ElectionRouteError::NotFound("Metadata not found (election might use default open dates)".to_string()))
        }
        Err(e) => {
            error!(error = %e, "Metadata lookup failed");
            Err(ElectionRouteError::Internal("Failed to fetch metadata".to_string()))
        }
    }
}

/// Handles requests to set the voting window of an election.
///
/// Dates are accepted as RFC 3339 or the bare `YYYY-MM-DDTHH:MM` layout
/// older clients send. The row is upserted, so a window can be set before
/// the deployment has been mirrored.
#[instrument(skip(config, payload), fields(election = %identifier))]
async fn handle_set_schedule_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
    Json(payload): Json<ScheduleRequest>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    let start = parse_schedule_stamp(&payload.start_date).ok_or_else(|| {
        ElectionRouteError::BadRequest("Invalid start_date format (use RFC3339 or YYYY-MM-DDTHH:MM)".to_string())
    })?;
    let end = parse_schedule_stamp(&payload.end_date)
        .ok_or_else(|| ElectionRouteError::BadRequest("Invalid end_date format".to_string()))?;
    if end < start {
        return Err(ElectionRouteError::BadRequest("End date cannot be before start date".to_string()));
    }

    let canonical = address.to_string();
    if let Err(e) = config.database().set_schedule(&canonical, start, end).await {
        error!(error = %e, "Schedule update failed");
        return Err(ElectionRouteError::Internal("Failed to update dates".to_string()));
    }

    info!(start = %start, end = %end, "Voting window updated");
    record_audit(
        &config,
        AuditEntry::new(
            canonical,
            AuditAction::ScheduleUpdate,
            "Admin".to_string(),
            format!("Dates updated: {start} to {end}"),
        ),
    )
    .await;

    Ok(Json(MessageResponse::new("Election dates updated")).into_response())
}

/// Handles requests to end an election immediately.
#[instrument(skip(config), fields(election = %identifier))]
async fn handle_end_election_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    let canonical = address.to_string();
    if let Err(e) = config.database().end_election(&canonical).await {
        error!(error = %e, "End election update failed");
        return Err(ElectionRouteError::Internal("Failed to end election".to_string()));
    }

    info!("Election ended");
    // The winner read is best-effort colour for the audit trail; an
    // unreachable node must not keep the election open.
    let details = match config.ledger().winner_candidate(address).await {
        Ok(winner) => format!("Manually ended election via API; leading candidate id {winner}"),
        Err(e) => {
            warn!(error = %e, "Winner read failed while ending election");
            "Manually ended election via API".to_string()
        }
    };
    record_audit(&config, AuditEntry::new(canonical, AuditAction::ElectionEnded, "Admin".to_string(), details))
        .await;

    Ok(Json(MessageResponse::new("Election ended")).into_response())
}

/// Handles requests for all known elections, newest voting window first.
#[instrument(skip(config))]
async fn handle_list_elections_request(State(config): State<Arc<Config>>) -> ElectionRouteResult {
    match config.database().list_metadata().await {
        Ok(rows) => {
            let views: Vec<MetadataView> = rows.into_iter().map(Into::into).collect();
            Ok(Json(ListResponse::new(views)).into_response())
        }
        Err(e) => {
            error!(error = %e, "Election listing failed");
            Err(ElectionRouteError::Internal("Failed to fetch elections".to_string()))
        }
    }
}

/// Handles requests for the audit trail of an election, oldest entry first.
#[instrument(skip(config), fields(election = %identifier))]
async fn handle_election_audit_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    match config.database().list_audit(&address.to_string()).await {
        Ok(entries) => {
            let views: Vec<AuditView> = entries.into_iter().map(Into::into).collect();
            Ok(Json(ListResponse::new(views)).into_response())
        }
        Err(e) => {
            error!(error = %e, "Audit listing failed");
            Err(ElectionRouteError::Internal("Failed to fetch audit log".to_string()))
        }
    }
}

/// Handles voter self-enrollment for an election. Enrollments land as
/// `Pending` and only pass the ballot gate once an admin approves them.
#[instrument(skip(config, payload), fields(election = %identifier))]
async fn handle_enroll_voter_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
    Json(payload): Json<EnrollVoterRequest>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    if payload.name.is_empty() || payload.email.is_empty() {
        return Err(ElectionRouteError::BadRequest("name and email are required".to_string()));
    }

    let canonical = address.to_string();
    let voter = VoterRecord::new(payload.name, payload.email.clone(), canonical.clone(), VoterStatus::Pending);
    match config.database().enroll_voter(voter).await {
        Ok(_) => {
            info!(voter = %payload.email, "Voter enrolled");
            record_audit(
                &config,
                AuditEntry::new(
                    canonical,
                    AuditAction::VoterEnrolled,
                    payload.email,
                    "Requested enrollment (pending review)".to_string(),
                ),
            )
            .await;
            Ok(Json(MessageResponse::new("Voter enrolled, pending review")).into_response())
        }
        Err(DatabaseError::ItemAlreadyExists(msg)) => Err(ElectionRouteError::AlreadyExists(msg)),
        Err(e) => {
            error!(error = %e, "Voter enrollment failed");
            Err(ElectionRouteError::Internal("Failed to enroll voter".to_string()))
        }
    }
}

/// Handles requests for the voter roll of an election.
#[instrument(skip(config), fields(election = %identifier))]
async fn handle_list_voters_request(
    Path(ElectionIdentifier { identifier }): Path<ElectionIdentifier>,
    State(config): State<Arc<Config>>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    match config.database().list_voters(&address.to_string()).await {
        Ok(voters) => {
            let views: Vec<VoterView> = voters.into_iter().map(Into::into).collect();
            Ok(Json(ListResponse::new(views)).into_response())
        }
        Err(e) => {
            error!(error = %e, "Voter listing failed");
            Err(ElectionRouteError::Internal("Failed to fetch voters".to_string()))
        }
    }
}

/// Handles admin review of an enrolled voter. An absent or empty `status`
/// approves; anything other than `Verified` or `Rejected` is rejected.
#[instrument(skip(config, payload), fields(election = %identifier, voter = %email))]
async fn handle_review_voter_request(
    Path(VoterPath { identifier, email }): Path<VoterPath>,
    State(config): State<Arc<Config>>,
    Json(payload): Json<ReviewVoterRequest>,
) -> ElectionRouteResult {
    let address = normalize_address(&identifier)
        .map_err(|e| ElectionRouteError::BadRequest(format!("invalid election address: {e}")))?;

    let status = match payload.status.as_deref() {
        None | Some("") | Some("Verified") => VoterStatus::Verified,
        Some("Rejected") => VoterStatus::Rejected,
        Some(_) => return Err(ElectionRouteError::BadRequest("status must be Verified or Rejected".to_string())),
    };

    let canonical = address.to_string();
    match config.database().set_voter_status(&canonical, &email, status).await {
        Ok(_) => {
            info!(status = %status, "Voter reviewed");
            record_audit(
                &config,
                AuditEntry::new(
                    canonical,
                    AuditAction::VoterReviewed,
                    "Admin".to_string(),
                    format!("Marked {email} as {status}"),
                ),
            )
            .await;
            Ok(Json(MessageResponse::new(format!("Voter status updated to {status}"))).into_response())
        }
        Err(DatabaseError::NotFound(msg)) => Err(ElectionRouteError::NotFound(msg)),
        Err(e) => {
            error!(error = %e, "Voter review failed");
            Err(ElectionRouteError::Internal("Failed to update status".to_string()))
        }
    }
}

/// Serve the mirror for an identifier that never became an address.
async fn mirrored_candidates(config: &Config, key: &str, detail: String) -> ElectionRouteResult {
    let candidates = fallback_candidates(config, key, &detail).await?;
    Ok(Json(CandidatesResponse::fallback(detail, candidates)).into_response())
}

async fn mirrored_summary(config: &Config, key: &str, detail: String) -> ElectionRouteResult {
    let summary = fallback_summary(config, key, &detail).await?;
    Ok(Json(SummaryResponse::fallback(detail, summary)).into_response())
}

/// Why voting is closed right now, or `None` when it is allowed. An election
/// without a metadata row is always open; so is one the mirror cannot
/// currently answer for.
async fn voting_window_reason(config: &Config, election_address: &str) -> Option<String> {
    let meta = match config.database().get_metadata(election_address).await {
        Ok(Some(meta)) => meta,
        _ => return None,
    };

    let now = Utc::now();
    if now < meta.start_date {
        return Some(format!(
            "Election has not started yet. Starts at {} UTC",
            meta.start_date.format("%Y-%m-%d %H:%M")
        ));
    }
    if now > meta.end_date || meta.status == ElectionPhase::Ended {
        return Some("Election has ended.".to_string());
    }
    None
}

/// Only a `Verified` enrollment passes. Missing rows and mirror errors both
/// fail closed.
async fn is_voter_verified(config: &Config, election_address: &str, email: &str) -> bool {
    matches!(
        config.database().get_voter(election_address, email).await,
        Ok(Some(voter)) if voter.status == VoterStatus::Verified
    )
}

fn parse_schedule_stamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok().map(|naive| Utc.from_utc_datetime(&naive))
}

/// Submission failures where nothing reached the chain: transient node
/// trouble gets its own status so callers can retry safely.
fn ledger_write_error(e: &LedgerClientError, message: String) -> ElectionRouteError {
    if e.is_recoverable() {
        ElectionRouteError::LedgerUnavailable(message)
    } else {
        ElectionRouteError::Internal(message)
    }
}

/// Audit appends never fail a request that already did its real work.
async fn record_audit(config: &Config, entry: AuditEntry) {
    if let Err(e) = config.database().append_audit(entry).await {
        warn!(error = %e, "Failed to append audit entry");
    }
}

/// Creates the router for election, candidate and voter endpoints.
pub fn election_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/api/elections", get(handle_list_elections_request).post(handle_create_election_request))
        .route("/api/elections/:identifier/summary", get(handle_election_summary_request))
        .route(
            "/api/elections/:identifier/candidates",
            get(handle_election_candidates_request).post(handle_register_candidate_request),
        )
        .route("/api/elections/:identifier/votes", post(handle_cast_vote_request))
        .route("/api/elections/:identifier/metadata", get(handle_election_metadata_request))
        .route("/api/elections/:identifier/schedule", patch(handle_set_schedule_request))
        .route("/api/elections/:identifier/end", post(handle_end_election_request))
        .route("/api/elections/:identifier/audit", get(handle_election_audit_request))
        .route(
            "/api/elections/:identifier/voters",
            get(handle_list_voters_request).post(handle_enroll_voter_request),
        )
        .route("/api/elections/:identifier/voters/:email", patch(handle_review_voter_request))
        .with_state(config)
}
