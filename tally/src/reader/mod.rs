use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::database::DatabaseError;
use crate::types::projection::{CandidateRecord, ElectionMetadata};

/// Where a read was answered from. Serialized verbatim into responses so
/// clients can tell fresh chain state from the mirrored copy.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    Onchain,
    DbFallback,
}

/// Candidate row read straight from the contract, with the manifesto link
/// merged in from the mirror when one was stored.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LiveCandidate {
    pub name: String,
    pub description: String,
    pub image_hash: String,
    pub vote_count: u64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifesto_url: Option<String>,
}

/// Candidate row served from the mirror. Carries the submission handle so a
/// client can check what the stale copy is based on.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MirroredCandidate {
    pub name: String,
    pub description: String,
    pub image_hash: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifesto_url: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_handle: String,
    pub created_at: DateTime<Utc>,
}

impl From<CandidateRecord> for MirroredCandidate {
    fn from(record: CandidateRecord) -> Self {
        Self {
            name: record.name,
            description: record.description,
            image_hash: record.image_hash,
            email: record.email,
            manifesto_url: record.manifesto_url,
            tx_handle: record.tx_handle,
            created_at: record.created_at,
        }
    }
}

/// Aggregate numbers shown on an election dashboard.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ElectionSummary {
    pub voters_count: u64,
    pub candidates_count: u64,
    pub election_name: String,
    pub election_desc: String,
    pub election_addr: String,
}

#[derive(Debug)]
pub enum CandidatesRead {
    Onchain { candidates: Vec<LiveCandidate> },
    Fallback { detail: String, candidates: Vec<MirroredCandidate> },
}

#[derive(Debug)]
pub enum SummaryRead {
    Onchain { summary: ElectionSummary },
    Fallback { detail: String, summary: ElectionSummary },
}

/// The live read failed and the mirror could not answer either, because the
/// query failed or because it has never seen the election. `message` is the
/// short verdict, `detail` keeps the full causal chain for the response body.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FallbackError {
    pub message: String,
    pub detail: String,
}

fn fallback_error(detail: String, e: DatabaseError) -> FallbackError {
    let (message, suffix) = match &e {
        DatabaseError::Deserialize(_) => ("db decode failed", "db decode error"),
        _ => ("db lookup failed", "db find error"),
    };
    FallbackError { message: message.to_string(), detail: format!("{detail} | {suffix}: {e}") }
}

fn unknown_election_error(detail: &str) -> FallbackError {
    FallbackError {
        message: "no off-chain fallback data for this election".to_string(),
        detail: format!("{detail} | mirror has no record of this election"),
    }
}

/// Candidate list for a resolved election, live first, mirror second.
pub async fn read_candidates(config: &Config, address: Address) -> Result<CandidatesRead, FallbackError> {
    match live_candidates(config, address).await {
        Ok(candidates) => Ok(CandidatesRead::Onchain { candidates }),
        Err(detail) => {
            tracing::warn!(election_address = %address, detail = %detail, "Live candidate read failed, using mirror");
            let candidates = fallback_candidates(config, &address.to_string(), &detail).await?;
            Ok(CandidatesRead::Fallback { detail, candidates })
        }
    }
}

/// Mirrored candidate rows under `key`, an address string or, when the
/// identifier never resolved, the trimmed identifier itself.
///
/// An election the mirror has never heard of is an error, not an empty list.
/// A metadata row marks the election as known, so a genuinely empty ballot
/// still reads as empty.
pub async fn fallback_candidates(
    config: &Config,
    key: &str,
    detail: &str,
) -> Result<Vec<MirroredCandidate>, FallbackError> {
    let records = match config.database().get_candidates_by_election(key).await {
        Ok(records) => records,
        Err(e) => return Err(fallback_error(detail.to_string(), e)),
    };

    if records.is_empty() {
        match config.database().get_metadata(key).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(unknown_election_error(detail)),
            Err(e) => return Err(fallback_error(detail.to_string(), e)),
        }
    }

    Ok(records.into_iter().map(Into::into).collect())
}

/// Election headline numbers, live first, mirror second.
pub async fn read_summary(config: &Config, address: Address) -> Result<SummaryRead, FallbackError> {
    match live_summary(config, address).await {
        Ok(summary) => Ok(SummaryRead::Onchain { summary }),
        Err(detail) => {
            tracing::warn!(election_address = %address, detail = %detail, "Live summary read failed, using mirror");
            let summary = fallback_summary(config, &address.to_string(), &detail).await?;
            Ok(SummaryRead::Fallback { detail, summary })
        }
    }
}

/// Contract reads gated behind a code check, so a wrong or stale address
/// reports "no contract code" instead of a decoding error.
async fn live_candidates(config: &Config, address: Address) -> Result<Vec<LiveCandidate>, String> {
    inspect_contract(config, address).await?;

    let count = config
        .ledger()
        .candidate_count(address)
        .await
        .map_err(|e| format!("failed to fetch candidate count from chain: {e}"))?;

    let canonical = address.to_string();
    let mut candidates = Vec::with_capacity(count as usize);
    for index in 0..count {
        let on_chain = config
            .ledger()
            .candidate_at(address, index)
            .await
            .map_err(|e| format!("failed to fetch candidate {index} from chain: {e}"))?;

        // The manifesto link never goes on-chain. Merge it from the mirror,
        // absence is not an error.
        let manifesto_url = match config.database().get_candidate_by_email(&canonical, &on_chain.email).await {
            Ok(record) => record.and_then(|record| record.manifesto_url),
            Err(_) => None,
        };

        candidates.push(LiveCandidate {
            name: on_chain.name,
            description: on_chain.description,
            image_hash: on_chain.image_hash,
            vote_count: on_chain.vote_count,
            email: on_chain.email,
            manifesto_url,
        });
    }

    Ok(candidates)
}

async fn live_summary(config: &Config, address: Address) -> Result<ElectionSummary, String> {
    inspect_contract(config, address).await?;

    let details = config
        .ledger()
        .election_details(address)
        .await
        .map_err(|e| format!("failed to fetch election details from chain: {e}"))?;
    let candidates_count = config
        .ledger()
        .candidate_count(address)
        .await
        .map_err(|e| format!("failed to fetch candidate count from chain: {e}"))?;
    let voters_count = config
        .ledger()
        .voter_count(address)
        .await
        .map_err(|e| format!("failed to fetch voter count from chain: {e}"))?;

    Ok(ElectionSummary {
        voters_count,
        candidates_count,
        election_name: details.name,
        election_desc: details.description,
        election_addr: address.to_string(),
    })
}

/// Summary assembled from mirror counts alone, under `key` as for
/// [`fallback_candidates`]. Same rule on unknown elections: no metadata and
/// nothing counted means there is nothing to serve.
pub async fn fallback_summary(config: &Config, key: &str, detail: &str) -> Result<ElectionSummary, FallbackError> {
    let counts: Result<(u64, u64, Option<ElectionMetadata>), DatabaseError> = async {
        let candidates_count = config.database().count_candidates(key).await?;
        let voters_count = config.database().count_voters(key).await?;
        let metadata = config.database().get_metadata(key).await?;
        Ok((candidates_count, voters_count, metadata))
    }
    .await;
    let (candidates_count, voters_count, metadata) = counts.map_err(|e| fallback_error(detail.to_string(), e))?;

    if metadata.is_none() && candidates_count == 0 && voters_count == 0 {
        return Err(unknown_election_error(detail));
    }

    let (election_name, election_desc) =
        metadata.map(|m| (m.election_name, m.election_desc)).unwrap_or_default();
    Ok(ElectionSummary {
        voters_count,
        candidates_count,
        election_name,
        election_desc,
        election_addr: key.to_string(),
    })
}

async fn inspect_contract(config: &Config, address: Address) -> Result<(), String> {
    match config.ledger().code_at(address).await {
        Err(e) if e.is_recoverable() => Err(format!("failed to connect to ethereum node: {e}")),
        Err(e) => Err(format!("failed to inspect contract code: {e}")),
        Ok(code) if code.is_empty() => Err("no contract code at given address".to_string()),
        Ok(_) => Ok(()),
    }
}
