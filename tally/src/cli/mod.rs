use clap::{Parser, Subcommand};

pub mod database;
pub mod ledger;
pub mod server;
pub mod tracker;

/// Tally - Election service over an EVM ledger
#[derive(Parser, Debug)]
#[command(name = "tally", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the service
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
}

/// Arguments supplied to `tally run`, grouped by concern. Every argument can
/// also come from the environment with the `TALLY_` prefix.
#[derive(Parser, Debug, Clone)]
pub struct RunCmd {
    #[clap(flatten)]
    pub server_args: server::ServerCliArgs,

    #[clap(flatten)]
    pub database_args: database::DatabaseCliArgs,

    #[clap(flatten)]
    pub ledger_args: ledger::LedgerCliArgs,

    #[clap(flatten)]
    pub tracker_args: tracker::TrackerCliArgs,
}
