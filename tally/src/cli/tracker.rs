use clap::Args;

/// Parameters used to config confirmation tracking.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct TrackerCliArgs {
    /// How many seconds the background task polls for a receipt before
    /// recording a timeout.
    #[arg(env = "TALLY_CONFIRMATION_WAIT_IN_SECS", long, default_value = "120")]
    pub confirmation_wait_in_secs: u64,

    /// Seconds between receipt polls.
    #[arg(env = "TALLY_RECEIPT_POLL_IN_SECS", long, default_value = "3")]
    pub receipt_poll_in_secs: u64,

    /// When set, write endpoints wait up to this many seconds for the
    /// confirmation outcome before responding. Unset means respond
    /// immediately after submission.
    #[arg(env = "TALLY_SYNC_CONFIRM_WAIT_IN_SECS", long)]
    pub sync_confirm_wait_in_secs: Option<u64>,
}
