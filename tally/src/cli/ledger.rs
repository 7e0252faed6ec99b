use clap::Args;

/// Parameters used to config the ledger connection.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct LedgerCliArgs {
    /// The RPC URL of the EVM node.
    #[arg(env = "TALLY_LEDGER_RPC_URL", long, default_value = "http://localhost:8545")]
    pub ledger_rpc_url: String,

    /// The private key signing ledger transactions. Never defaulted.
    #[arg(env = "TALLY_LEDGER_PRIVATE_KEY", long)]
    pub ledger_private_key: Option<String>,

    /// The chain id of the ledger network.
    #[arg(env = "TALLY_LEDGER_CHAIN_ID", long, default_value = "80002")]
    pub ledger_chain_id: u64,

    /// The address of the deployed election registry contract.
    #[arg(env = "TALLY_REGISTRY_CONTRACT_ADDRESS", long)]
    pub registry_contract_address: Option<String>,
}
