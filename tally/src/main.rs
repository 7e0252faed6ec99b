use clap::Parser as _;
use dotenvy::dotenv;
use tally::cli::{Cli, Commands, RunCmd};
use tally::config::init_config;
use tally::server::setup_server;
use tally::utils::logging::init_logging;
use tracing::{error, info};

/// Start the server
#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    info!("Starting tally");
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { run_command } => match run_tally(run_command).await {
            Ok(_) => {
                info!("Tally service stopped");
            }
            Err(e) => {
                error!(
                    error = %e,
                    error_chain = ?e,
                    "Failed to start tally service"
                );
                panic!("Failed to start tally service: {}", e);
            }
        },
    }
}

async fn run_tally(run_cmd: &RunCmd) -> color_eyre::Result<()> {
    let config = init_config(run_cmd).await?;

    // Run the server in a separate tokio spawn task
    let address = setup_server(config).await?;
    info!(%address, "Tally service started successfully");

    tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
    info!("Shutdown signal received");

    Ok(())
}
