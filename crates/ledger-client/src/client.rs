use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use mockall::automock;
use mockall::predicate::*;

use crate::error::LedgerClientError;
use crate::types::{CandidateSubmission, ElectionDetails, OnChainCandidate, ReceiptStatus, TxHandle};

/// Trait for every ledger backend to implement.
///
/// Submission methods return as soon as the node has accepted the transaction
/// into its mempool; they never wait for inclusion. Confirmation is a separate
/// concern driven through [`LedgerClient::receipt_status`].
#[automock]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Address of the registry contract this client was configured with.
    fn registry_address(&self) -> Address;

    /// Should submit a registry transaction deploying a new election for the
    /// given organiser email and return the transaction handle.
    async fn create_election(
        &self,
        email: &str,
        name: &str,
        description: &str,
    ) -> Result<TxHandle, LedgerClientError>;

    /// Should submit a candidate registration on the given election contract.
    async fn register_candidate(
        &self,
        election: Address,
        submission: CandidateSubmission,
    ) -> Result<TxHandle, LedgerClientError>;

    /// Should submit a ballot for the given candidate index on the election contract.
    async fn cast_vote(
        &self,
        election: Address,
        candidate_id: u64,
        voter_email: &str,
    ) -> Result<TxHandle, LedgerClientError>;

    /// Should resolve an organiser email to its deployed election address
    /// through the registry. Returns the zero address when the registry has
    /// no entry for the email.
    async fn registry_lookup(&self, email: &str) -> Result<Address, LedgerClientError>;

    /// Should return the code stored at the given address. An empty result
    /// means no contract is deployed there.
    async fn code_at(&self, address: Address) -> Result<Bytes, LedgerClientError>;

    /// Should return the number of candidates registered on the election contract.
    async fn candidate_count(&self, election: Address) -> Result<u64, LedgerClientError>;

    /// Should return the candidate stored at the given index.
    async fn candidate_at(&self, election: Address, index: u64) -> Result<OnChainCandidate, LedgerClientError>;

    /// Should return the number of voters enrolled on the election contract.
    async fn voter_count(&self, election: Address) -> Result<u64, LedgerClientError>;

    /// Should return the election's name and description.
    async fn election_details(&self, election: Address) -> Result<ElectionDetails, LedgerClientError>;

    /// Should return the index of the candidate currently holding the most votes.
    async fn winner_candidate(&self, election: Address) -> Result<u64, LedgerClientError>;

    /// Should look up the receipt for a previously submitted transaction.
    async fn receipt_status(&self, handle: TxHandle) -> Result<ReceiptStatus, LedgerClientError>;
}
