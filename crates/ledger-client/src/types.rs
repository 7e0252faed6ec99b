use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::B256;
use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
};
use alloy::providers::{Identity, RootProvider};
use alloy::transports::http::{Client, Http};

/// HTTP provider with the recommended fillers and a local wallet attached.
/// Write paths go through this one; plain reads use [`alloy::providers::ReqwestProvider`].
pub type WalletHttpProvider = FillProvider<
    JoinFill<
        JoinFill<Identity, JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>>,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Http<Client>>,
    Http<Client>,
    Ethereum,
>;

/// Hash of a submitted ledger transaction, as returned by the node at submission time.
pub type TxHandle = B256;

/// Outcome of a receipt lookup for a submitted transaction.
///
/// `Absent` means the node has no receipt yet, which is the normal state
/// while a transaction sits in the mempool. It is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// No receipt is available for the transaction yet.
    Absent,
    /// The transaction was included in a block and executed successfully.
    Mined { block_number: Option<u64> },
    /// The transaction was included in a block but its execution reverted.
    Reverted,
}

/// Payload for registering a candidate on an election contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateSubmission {
    pub name: String,
    pub description: String,
    pub image_hash: String,
    pub email: String,
}

/// A single candidate row as stored on an election contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnChainCandidate {
    pub name: String,
    pub description: String,
    pub image_hash: String,
    pub vote_count: u64,
    pub email: String,
}

/// Name and description pair stored on an election contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElectionDetails {
    pub name: String,
    pub description: String,
}
