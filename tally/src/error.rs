use tally_ledger_client::LedgerClientError;

use crate::database::DatabaseError;

/// Service-level error type. Route handlers translate these into HTTP
/// responses; everything below the routes propagates them with `?`.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    /// Invalid or missing startup parameters
    #[error("Setup command error: {0}")]
    SetupCommandError(String),

    /// Failure in the off-chain mirror
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Failure talking to the ledger
    #[error("Ledger client error: {0}")]
    LedgerClient(#[from] LedgerClientError),
}

pub type TallyResult<T> = Result<T, TallyError>;
