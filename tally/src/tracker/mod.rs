use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tally_ledger_client::types::{ReceiptStatus, TxHandle};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::config::Config;
use crate::error::TallyError;
use crate::types::operation::{OperationKind, OperationState, PendingOperation};
use crate::types::projection::{AuditAction, AuditEntry, MirrorState};

/// Mirror work tied to a confirmation verdict.
///
/// Each tracked transaction carries one of these. The tracker applies it once
/// the verdict is known so the off-chain copy follows the chain instead of
/// the submission.
#[derive(Debug, Clone)]
pub enum OperationSideEffect {
    /// A deployment confirmed. Look the new address up in the registry, seed
    /// its metadata row and record the creation.
    SeedElection { email: String, name: String, description: String },
    /// The registration verdict flows into the mirrored candidate row.
    MirrorCandidate { candidate_email: String },
    /// A mined ballot lands in the audit trail.
    RecordVote { voter_email: String },
}

/// A transaction handed off to the background tracker.
///
/// The `confirmation` handle resolves to the final verdict. Waiting on it is
/// optional, the tracking task runs to completion either way.
#[derive(Debug)]
pub struct SubmittedOperation {
    pub operation: PendingOperation,
    pub confirmation: JoinHandle<OperationState>,
}

/// Record a freshly submitted transaction and spawn its confirmation task.
///
/// The pending row is written before this returns, so a caller that answers
/// immediately still leaves a queryable trace. The spawned task is the only
/// writer that ever advances the row.
pub async fn track_operation(
    config: Arc<Config>,
    kind: OperationKind,
    subject_key: String,
    tx_handle: TxHandle,
    side_effect: OperationSideEffect,
) -> Result<SubmittedOperation, TallyError> {
    let operation = PendingOperation::new(kind, subject_key, tx_handle.to_string());
    let operation = config.database().create_operation(operation).await?;

    tracing::info!(
        tx_handle = %operation.tx_handle,
        kind = %operation.kind,
        "Tracking submitted transaction"
    );

    let confirmation = tokio::spawn(confirm_operation(Arc::clone(&config), operation.clone(), tx_handle, side_effect));

    Ok(SubmittedOperation { operation, confirmation })
}

/// Wait up to `wait` for the confirmation verdict without cancelling the
/// tracking task. On timeout the task keeps polling in the background and
/// the reason is returned for the response message.
pub async fn await_verdict(submitted: &mut SubmittedOperation, wait: Duration) -> Result<OperationState, String> {
    match tokio::time::timeout(wait, &mut submitted.confirmation).await {
        Ok(Ok(verdict)) => Ok(verdict),
        Ok(Err(e)) => Err(format!("confirmation task failed: {e}")),
        Err(elapsed) => Err(elapsed.to_string()),
    }
}

/// Poll the ledger for a receipt until the transaction settles or the
/// confirmation window runs out.
///
/// The receipt is polled at least once before the deadline is consulted, so
/// an instantly mined transaction confirms even with a zero window. Poll
/// errors are retried, the chain may simply be catching up. A transaction is
/// never re-submitted from here.
async fn confirm_operation(
    config: Arc<Config>,
    operation: PendingOperation,
    tx_handle: TxHandle,
    side_effect: OperationSideEffect,
) -> OperationState {
    let params = config.tracker_params();
    let deadline = Instant::now() + Duration::from_secs(params.confirmation_wait_in_secs);
    let poll_interval = Duration::from_secs(params.receipt_poll_in_secs);

    let verdict = loop {
        match config.ledger().receipt_status(tx_handle).await {
            Ok(ReceiptStatus::Mined { block_number }) => {
                tracing::info!(tx_handle = %operation.tx_handle, block_number, "Transaction mined");
                break OperationState::Mined;
            }
            Ok(ReceiptStatus::Reverted) => {
                tracing::warn!(tx_handle = %operation.tx_handle, "Transaction mined but reverted on-chain");
                break OperationState::Reverted;
            }
            Ok(ReceiptStatus::Absent) => {}
            Err(e) => {
                tracing::warn!(tx_handle = %operation.tx_handle, error = %e, "Receipt poll failed, will retry");
            }
        }

        if Instant::now() >= deadline {
            tracing::warn!(
                tx_handle = %operation.tx_handle,
                waited_secs = params.confirmation_wait_in_secs,
                "No confirmation within the tracking window, leaving operation pending"
            );
            break OperationState::PendingTimeout;
        }

        sleep(poll_interval).await;
    };

    if let Err(e) = config.database().update_operation_state(&operation, verdict).await {
        tracing::error!(tx_handle = %operation.tx_handle, error = %e, "Failed to persist operation verdict");
    }

    apply_side_effect(&config, &operation, verdict, side_effect).await;

    verdict
}

async fn apply_side_effect(
    config: &Config,
    operation: &PendingOperation,
    verdict: OperationState,
    side_effect: OperationSideEffect,
) {
    match side_effect {
        OperationSideEffect::SeedElection { email, name, description } => {
            if verdict != OperationState::Mined {
                return;
            }
            // The deployed address is only knowable through the registry.
            match config.ledger().registry_lookup(&email).await {
                Ok(address) if address != Address::ZERO => {
                    let canonical = address.to_string();
                    if let Err(e) = config.database().ensure_metadata(&canonical, &name, &description).await {
                        tracing::error!(election_address = %canonical, error = %e, "Failed to seed election metadata");
                    }
                    let entry = AuditEntry::new(
                        canonical,
                        AuditAction::ElectionCreated,
                        email,
                        format!("Created election '{name}'"),
                    );
                    if let Err(e) = config.database().append_audit(entry).await {
                        tracing::error!(tx_handle = %operation.tx_handle, error = %e, "Failed to record election creation");
                    }
                }
                Ok(_) => {
                    tracing::warn!(
                        tx_handle = %operation.tx_handle,
                        "Deployment mined but the registry has no address for the organizer yet"
                    );
                }
                Err(e) => {
                    tracing::warn!(tx_handle = %operation.tx_handle, error = %e, "Registry lookup after deployment failed");
                }
            }
        }
        OperationSideEffect::MirrorCandidate { candidate_email } => {
            let state = MirrorState::from(verdict);
            if let Err(e) = config.database().set_candidate_mirror_state(&operation.tx_handle, state).await {
                tracing::error!(tx_handle = %operation.tx_handle, error = %e, "Failed to update mirrored candidate state");
            }
            if verdict == OperationState::Mined {
                let entry = AuditEntry::new(
                    operation.subject_key.clone(),
                    AuditAction::CandidateRegistered,
                    "Admin".to_string(),
                    format!("Registered candidate '{candidate_email}'"),
                );
                if let Err(e) = config.database().append_audit(entry).await {
                    tracing::error!(tx_handle = %operation.tx_handle, error = %e, "Failed to record candidate registration");
                }
            }
        }
        OperationSideEffect::RecordVote { voter_email } => {
            if verdict != OperationState::Mined {
                return;
            }
            let entry = AuditEntry::new(
                operation.subject_key.clone(),
                AuditAction::VoteCast,
                voter_email,
                "Voted successfully (mined)".to_string(),
            );
            if let Err(e) = config.database().append_audit(entry).await {
                tracing::error!(tx_handle = %operation.tx_handle, error = %e, "Failed to record mined vote");
            }
        }
    }
}
