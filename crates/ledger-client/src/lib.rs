//! Client abstraction over the election ledger.
//!
//! The [`LedgerClient`] trait is the only surface the rest of the service
//! talks to. The single implementation, [`eth::EthereumLedgerClient`], speaks
//! JSON-RPC to an EVM node and binds the election and registry contracts
//! through generated ABIs. Everything returned here is typed; turning results
//! into HTTP responses is the caller's concern.

pub mod client;
pub mod error;
pub mod eth;
pub mod types;

pub use client::{LedgerClient, MockLedgerClient};
pub use error::LedgerClientError;
