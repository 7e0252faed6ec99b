use clap::Args;

/// Parameters used to config MongoDB.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct DatabaseCliArgs {
    /// The connection string to the MongoDB server.
    #[arg(env = "TALLY_DATABASE_CONNECTION_URL", long, default_value = "mongodb://localhost:27017")]
    pub database_connection_url: String,

    /// The name of the database.
    #[arg(env = "TALLY_DATABASE_NAME", long, default_value = "tally")]
    pub database_name: String,
}
