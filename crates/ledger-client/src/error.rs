use thiserror::Error;

use crate::eth::error::EthereumClientError;

#[derive(Debug, Error)]
pub enum LedgerClientError {
    #[error("Ethereum client error: {0}")]
    Ethereum(#[from] EthereumClientError),
}

impl LedgerClientError {
    /// Returns true if the error is transient (network or RPC level) and the
    /// same request may succeed on a later attempt. Contract-level failures
    /// and conversion failures are terminal.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LedgerClientError::Ethereum(e) => e.is_recoverable(),
        }
    }
}
