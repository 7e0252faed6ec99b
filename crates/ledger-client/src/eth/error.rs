use alloy::transports::RpcError;
use alloy::{contract, sol_types};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EthereumClientError {
    #[error("Ethereum RPC error: {0}")]
    Rpc(String),

    #[error("Contract interaction failed: {0}")]
    Contract(String),

    #[error("Value conversion error: {0}")]
    Conversion(String),

    #[error("Network connection error: {message}")]
    NetworkConnection { message: String },
}

impl From<sol_types::Error> for EthereumClientError {
    fn from(e: sol_types::Error) -> Self {
        EthereumClientError::Contract(e.to_string())
    }
}

// A transport failure means the node never answered. An RPC error response
// (a revert during gas estimation, bad calldata) did reach the node and
// stays non-recoverable.
impl From<contract::Error> for EthereumClientError {
    fn from(e: contract::Error) -> Self {
        match e {
            contract::Error::TransportError(RpcError::Transport(kind)) => {
                EthereumClientError::NetworkConnection { message: kind.to_string() }
            }
            other => EthereumClientError::Contract(other.to_string()),
        }
    }
}

impl EthereumClientError {
    /// Returns true if the error is recoverable (network/connection issues).
    /// These are transient errors where a later receipt poll may still succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::NetworkConnection { .. })
    }
}
