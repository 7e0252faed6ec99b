use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder, ReqwestProvider};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::client::LedgerClient;
use crate::error::LedgerClientError;
use crate::eth::error::EthereumClientError;
use crate::types::{
    CandidateSubmission, ElectionDetails, OnChainCandidate, ReceiptStatus, TxHandle, WalletHttpProvider,
};

pub mod error;

// ABI of the deployed election contracts. Function names and argument types
// must stay exactly as deployed, argument names are local.
sol! {
    #[sol(rpc)]
    contract Election {
        function addCandidate(string name, string description, string imageHash, string email) external;
        function vote(uint256 candidateId, string voterEmail) external;
        function getNumOfCandidates() external view returns (uint256 count);
        function getCandidate(uint256 candidateId) external view returns (string name, string description, string imageHash, uint256 voteCount, string email);
        function getNumOfVoters() external view returns (uint256 count);
        function getElectionDetails() external view returns (string name, string description);
        function winnerCandidate() external view returns (uint256 candidateId);
    }

    #[sol(rpc)]
    contract ElectionRegistry {
        function createElection(string email, string electionName, string electionDescription) external;
        function getDeployedElection(string email) external view returns (address deployedAt, string electionName, string electionDescription);
    }
}

#[derive(Clone, Debug)]
pub struct EthereumLedgerValidatedArgs {
    pub ledger_rpc_url: Url,

    pub ledger_private_key: String,

    pub ledger_chain_id: u64,

    pub registry_contract_address: Address,
}

/// Ledger client backed by an EVM node over HTTP.
///
/// Construction is purely local. No connection is attempted until the first
/// call, so the service can boot while the node is down and requests fail
/// individually instead.
pub struct EthereumLedgerClient {
    registry: ElectionRegistry::ElectionRegistryInstance<Http<Client>, WalletHttpProvider>,
    provider: Arc<ReqwestProvider>,
    wallet_provider: WalletHttpProvider,
    wallet_address: Address,
}

impl EthereumLedgerClient {
    pub fn new_with_args(args: &EthereumLedgerValidatedArgs) -> Result<Self, LedgerClientError> {
        let signer: PrivateKeySigner = args
            .ledger_private_key
            .parse::<PrivateKeySigner>()
            .map_err(|e| EthereumClientError::Conversion(format!("invalid ledger private key: {e}")))?
            .with_chain_id(Some(args.ledger_chain_id));
        let wallet_address = signer.address();
        let wallet = EthereumWallet::from(signer);

        // provider without wallet
        let provider = Arc::new(ProviderBuilder::new().on_http(args.ledger_rpc_url.clone()));

        // provider with wallet
        let wallet_provider =
            ProviderBuilder::new().with_recommended_fillers().wallet(wallet).on_http(args.ledger_rpc_url.clone());

        let registry = ElectionRegistry::new(args.registry_contract_address, wallet_provider.clone());

        Ok(Self { registry, provider, wallet_provider, wallet_address })
    }

    /// Address the client signs and submits transactions from.
    pub fn wallet_address(&self) -> Address {
        self.wallet_address
    }

    fn election_reader(&self, election: Address) -> Election::ElectionInstance<Http<Client>, ReqwestProvider> {
        Election::new(election, self.provider.as_ref().clone())
    }

    fn election_writer(&self, election: Address) -> Election::ElectionInstance<Http<Client>, WalletHttpProvider> {
        Election::new(election, self.wallet_provider.clone())
    }
}

#[async_trait]
impl LedgerClient for EthereumLedgerClient {
    fn registry_address(&self) -> Address {
        *self.registry.address()
    }

    async fn create_election(
        &self,
        email: &str,
        name: &str,
        description: &str,
    ) -> Result<TxHandle, LedgerClientError> {
        let pending = self
            .registry
            .createElection(email.to_string(), name.to_string(), description.to_string())
            .send()
            .await
            .map_err(EthereumClientError::from)?;
        let handle = *pending.tx_hash();
        debug!(%handle, email, "Submitted createElection transaction");
        Ok(handle)
    }

    async fn register_candidate(
        &self,
        election: Address,
        submission: CandidateSubmission,
    ) -> Result<TxHandle, LedgerClientError> {
        let pending = self
            .election_writer(election)
            .addCandidate(submission.name, submission.description, submission.image_hash, submission.email)
            .send()
            .await
            .map_err(EthereumClientError::from)?;
        let handle = *pending.tx_hash();
        debug!(%handle, %election, "Submitted addCandidate transaction");
        Ok(handle)
    }

    async fn cast_vote(
        &self,
        election: Address,
        candidate_id: u64,
        voter_email: &str,
    ) -> Result<TxHandle, LedgerClientError> {
        let pending = self
            .election_writer(election)
            .vote(U256::from(candidate_id), voter_email.to_string())
            .send()
            .await
            .map_err(EthereumClientError::from)?;
        let handle = *pending.tx_hash();
        debug!(%handle, %election, candidate_id, "Submitted vote transaction");
        Ok(handle)
    }

    async fn registry_lookup(&self, email: &str) -> Result<Address, LedgerClientError> {
        let deployed = self
            .registry
            .getDeployedElection(email.to_string())
            .call()
            .await
            .map_err(EthereumClientError::from)?;
        Ok(deployed.deployedAt)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, LedgerClientError> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(|e| EthereumClientError::Rpc(e.to_string()))?;
        Ok(code)
    }

    async fn candidate_count(&self, election: Address) -> Result<u64, LedgerClientError> {
        let count = self
            .election_reader(election)
            .getNumOfCandidates()
            .call()
            .await
            .map_err(EthereumClientError::from)?
            .count;
        Ok(u64::try_from(count).map_err(|e| EthereumClientError::Conversion(format!("candidate count: {e}")))?)
    }

    async fn candidate_at(&self, election: Address, index: u64) -> Result<OnChainCandidate, LedgerClientError> {
        let row = self
            .election_reader(election)
            .getCandidate(U256::from(index))
            .call()
            .await
            .map_err(EthereumClientError::from)?;
        let vote_count = u64::try_from(row.voteCount)
            .map_err(|e| EthereumClientError::Conversion(format!("candidate vote count: {e}")))?;
        Ok(OnChainCandidate {
            name: row.name,
            description: row.description,
            image_hash: row.imageHash,
            vote_count,
            email: row.email,
        })
    }

    async fn voter_count(&self, election: Address) -> Result<u64, LedgerClientError> {
        let count = self
            .election_reader(election)
            .getNumOfVoters()
            .call()
            .await
            .map_err(EthereumClientError::from)?
            .count;
        Ok(u64::try_from(count).map_err(|e| EthereumClientError::Conversion(format!("voter count: {e}")))?)
    }

    async fn election_details(&self, election: Address) -> Result<ElectionDetails, LedgerClientError> {
        let details = self
            .election_reader(election)
            .getElectionDetails()
            .call()
            .await
            .map_err(EthereumClientError::from)?;
        Ok(ElectionDetails { name: details.name, description: details.description })
    }

    async fn winner_candidate(&self, election: Address) -> Result<u64, LedgerClientError> {
        let winner = self
            .election_reader(election)
            .winnerCandidate()
            .call()
            .await
            .map_err(EthereumClientError::from)?
            .candidateId;
        Ok(u64::try_from(winner).map_err(|e| EthereumClientError::Conversion(format!("winner index: {e}")))?)
    }

    async fn receipt_status(&self, handle: TxHandle) -> Result<ReceiptStatus, LedgerClientError> {
        let receipt = self
            .provider
            .get_transaction_receipt(handle)
            .await
            .map_err(|e| EthereumClientError::Rpc(e.to_string()))?;
        Ok(match receipt {
            Some(receipt) if receipt.status() => ReceiptStatus::Mined { block_number: receipt.block_number },
            Some(_) => ReceiptStatus::Reverted,
            None => ReceiptStatus::Absent,
        })
    }
}
