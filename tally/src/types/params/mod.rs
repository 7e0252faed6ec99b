use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

use crate::cli::RunCmd;
use crate::error::TallyError;

/// Validated HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
}

/// Validated database connection parameters.
#[derive(Debug, Clone)]
pub struct DatabaseArgs {
    pub connection_uri: String,
    pub database_name: String,
}

/// Validated parameters for the ledger connection and signing identity.
#[derive(Debug, Clone)]
pub struct LedgerParams {
    pub rpc_url: Url,
    pub private_key: String,
    pub chain_id: u64,
    pub registry_contract_address: Address,
}

/// Validated confirmation tracking windows, all in seconds.
#[derive(Debug, Clone, Copy)]
pub struct TrackerParams {
    /// How long the background task polls for a receipt before giving up.
    pub confirmation_wait_in_secs: u64,
    /// Pause between receipt polls.
    pub receipt_poll_in_secs: u64,
    /// When set, write endpoints hold the response open up to this long to
    /// report the confirmation outcome inline.
    pub sync_confirm_wait_in_secs: Option<u64>,
}

impl TrackerParams {
    /// Window a write endpoint holds its response open for. Zero when no
    /// synchronous wait is configured, writes then answer at submission.
    pub fn sync_wait(&self) -> Duration {
        Duration::from_secs(self.sync_confirm_wait_in_secs.unwrap_or(0))
    }
}

impl TryFrom<&RunCmd> for ServerParams {
    type Error = TallyError;

    fn try_from(run_cmd: &RunCmd) -> Result<Self, Self::Error> {
        Ok(Self { host: run_cmd.server_args.host.clone(), port: run_cmd.server_args.port })
    }
}

impl TryFrom<&RunCmd> for DatabaseArgs {
    type Error = TallyError;

    fn try_from(run_cmd: &RunCmd) -> Result<Self, Self::Error> {
        Ok(Self {
            connection_uri: run_cmd.database_args.database_connection_url.clone(),
            database_name: run_cmd.database_args.database_name.clone(),
        })
    }
}

impl TryFrom<&RunCmd> for LedgerParams {
    type Error = TallyError;

    fn try_from(run_cmd: &RunCmd) -> Result<Self, Self::Error> {
        let rpc_url = Url::parse(&run_cmd.ledger_args.ledger_rpc_url)
            .map_err(|e| TallyError::SetupCommandError(format!("Invalid ledger RPC URL: {e}")))?;

        let private_key = run_cmd
            .ledger_args
            .ledger_private_key
            .clone()
            .ok_or(TallyError::SetupCommandError("Ledger private key is required".to_string()))?;

        let registry_contract_address = run_cmd
            .ledger_args
            .registry_contract_address
            .as_deref()
            .ok_or(TallyError::SetupCommandError("Registry contract address is required".to_string()))?
            .parse::<Address>()
            .map_err(|e| TallyError::SetupCommandError(format!("Invalid registry contract address: {e}")))?;

        Ok(Self {
            rpc_url,
            private_key,
            chain_id: run_cmd.ledger_args.ledger_chain_id,
            registry_contract_address,
        })
    }
}

impl TryFrom<&RunCmd> for TrackerParams {
    type Error = TallyError;

    fn try_from(run_cmd: &RunCmd) -> Result<Self, Self::Error> {
        if run_cmd.tracker_args.receipt_poll_in_secs == 0 {
            return Err(TallyError::SetupCommandError("Receipt poll interval must be at least one second".to_string()));
        }
        Ok(Self {
            confirmation_wait_in_secs: run_cmd.tracker_args.confirmation_wait_in_secs,
            receipt_poll_in_secs: run_cmd.tracker_args.receipt_poll_in_secs,
            sync_confirm_wait_in_secs: run_cmd.tracker_args.sync_confirm_wait_in_secs,
        })
    }
}
