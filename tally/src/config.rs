use std::sync::Arc;

use tally_ledger_client::eth::{EthereumLedgerClient, EthereumLedgerValidatedArgs};
use tally_ledger_client::LedgerClient;

use crate::cli::RunCmd;
use crate::database::mongodb::MongoDbClient;
use crate::database::Database;
use crate::types::params::{DatabaseArgs, LedgerParams, ServerParams, TrackerParams};

/// Shared service state handed to every handler and background task.
///
/// The ledger and the mirror sit behind trait objects so tests can swap in
/// mocks without a node or a database.
pub struct Config {
    server_params: ServerParams,
    tracker_params: TrackerParams,
    ledger: Box<dyn LedgerClient>,
    database: Box<dyn Database>,
}

impl Config {
    pub fn new(
        server_params: ServerParams,
        tracker_params: TrackerParams,
        ledger: Box<dyn LedgerClient>,
        database: Box<dyn Database>,
    ) -> Self {
        Self { server_params, tracker_params, ledger, database }
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.server_params
    }

    pub fn tracker_params(&self) -> TrackerParams {
        self.tracker_params
    }

    pub fn ledger(&self) -> &dyn LedgerClient {
        self.ledger.as_ref()
    }

    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }
}

/// Build the full service configuration from a validated run command.
///
/// Fails fast on malformed parameters or an unreachable database. The ledger
/// connection is lazy, a node that is down at boot only surfaces when the
/// first call goes out.
pub async fn init_config(run_cmd: &RunCmd) -> color_eyre::Result<Arc<Config>> {
    let server_params = ServerParams::try_from(run_cmd)?;
    let tracker_params = TrackerParams::try_from(run_cmd)?;
    let database_args = DatabaseArgs::try_from(run_cmd)?;
    let ledger_params = LedgerParams::try_from(run_cmd)?;

    tracing::info!(database_name = %database_args.database_name, "Connecting to the mirror database");
    let database = MongoDbClient::new(&database_args).await?;

    let ledger_args = EthereumLedgerValidatedArgs {
        ledger_rpc_url: ledger_params.rpc_url,
        ledger_private_key: ledger_params.private_key,
        ledger_chain_id: ledger_params.chain_id,
        registry_contract_address: ledger_params.registry_contract_address,
    };
    let ledger = EthereumLedgerClient::new_with_args(&ledger_args)?;
    tracing::info!(registry = %ledger_args.registry_contract_address, "Ledger client ready");

    Ok(Arc::new(Config::new(server_params, tracker_params, Box::new(ledger), Box::new(database))))
}
