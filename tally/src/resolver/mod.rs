use alloy::primitives::Address;
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Config;
use crate::types::identifier::{NormalizedIdentifier, ResolutionPath, ResolveError, ResolvedElection};

lazy_static! {
    static ref FULL_HEX_RE: Regex = Regex::new("^[0-9a-fA-F]{40}$").expect("full hex regex is valid");
}

/// A truncated identifier must match exactly one stored address. The limit
/// caps how many rows the ambiguity error counts.
const PREFIX_MATCH_LIMIT: i64 = 5;

/// Cleanup applied to every caller-supplied identifier before it is
/// classified. Strips whitespace and the stray quote characters front-ends
/// leak into path segments. Also the mirror key used when an identifier
/// never resolves to an address.
pub fn trim_identifier(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}

/// Classify a raw election identifier.
///
/// Bare 40-hex gets its `0x` prefix restored. A short `0x`-string is kept as
/// a prefix for the mirror to match, anything else is treated as an opaque
/// registry token, usually the organizer email.
pub fn normalize_identifier(raw: &str) -> Result<NormalizedIdentifier, ResolveError> {
    let trimmed = trim_identifier(raw);

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed.eq_ignore_ascii_case("undefined") {
        return Err(ResolveError::Empty);
    }

    if FULL_HEX_RE.is_match(trimmed) {
        let address =
            format!("0x{trimmed}").parse::<Address>().map_err(|_| ResolveError::InvalidHex)?;
        return Ok(NormalizedIdentifier::FullAddress(address));
    }

    if trimmed.len() == 42 {
        if let Ok(address) = trimmed.parse::<Address>() {
            return Ok(NormalizedIdentifier::FullAddress(address));
        }
    }

    if trimmed.starts_with("0x") && trimmed.len() < 42 {
        return Ok(NormalizedIdentifier::Prefix(trimmed.to_string()));
    }

    Ok(NormalizedIdentifier::OpaqueToken(trimmed.to_string()))
}

/// Strict form used by write paths, where a transaction is about to be sent
/// and guessing is not acceptable. Only a full address passes.
pub fn normalize_address(raw: &str) -> Result<Address, ResolveError> {
    match normalize_identifier(raw)? {
        NormalizedIdentifier::FullAddress(address) => Ok(address),
        NormalizedIdentifier::Prefix(prefix) => {
            if prefix.len() < 10 {
                Err(ResolveError::TooShort)
            } else {
                Err(ResolveError::InvalidHex)
            }
        }
        NormalizedIdentifier::OpaqueToken(_) => Err(ResolveError::InvalidHex),
    }
}

/// Resolve a raw identifier to a concrete election address.
///
/// Full addresses pass through untouched. Prefixes are matched against the
/// mirrored metadata and must select exactly one election; several matches
/// are reported as ambiguous rather than guessed at. Opaque tokens go to the
/// on-chain registry, which is only consulted after its contract code has
/// been confirmed to exist.
pub async fn resolve_election(config: &Config, raw: &str) -> Result<ResolvedElection, ResolveError> {
    match normalize_identifier(raw)? {
        NormalizedIdentifier::FullAddress(address) => {
            Ok(ResolvedElection { address, path: ResolutionPath::DirectHex })
        }
        NormalizedIdentifier::Prefix(prefix) => {
            let matches = match config.database().find_addresses_with_prefix(&prefix, PREFIX_MATCH_LIMIT).await {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::warn!(prefix = %prefix, error = %e, "Prefix search against mirror failed");
                    return Err(ResolveError::Unresolved(
                        "db lookup failed while resolving truncated address".to_string(),
                    ));
                }
            };
            match matches.as_slice() {
                [] => Err(ResolveError::Unresolved("invalid or truncated election address".to_string())),
                [stored] => {
                    let address = stored.parse::<Address>().map_err(|_| {
                        ResolveError::Unresolved("invalid or truncated election address".to_string())
                    })?;
                    tracing::debug!(prefix = %prefix, address = %address, "Prefix resolved against mirror");
                    Ok(ResolvedElection { address, path: ResolutionPath::PrefixMatch })
                }
                many => Err(ResolveError::Ambiguous { matches: many.len() as u64 }),
            }
        }
        NormalizedIdentifier::OpaqueToken(token) => {
            let registry = config.ledger().registry_address();
            match config.ledger().code_at(registry).await {
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "Ethereum node unreachable while resolving identifier");
                    return Err(ResolveError::Unresolved(
                        "failed to connect to ethereum node while resolving email".to_string(),
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Registry code inspection failed while resolving identifier");
                    return Err(ResolveError::Unresolved(
                        "failed to inspect factory contract while resolving email".to_string(),
                    ));
                }
                Ok(code) if code.is_empty() => {
                    return Err(ResolveError::Unresolved(
                        "no factory contract code at configured address".to_string(),
                    ));
                }
                Ok(_) => {}
            }

            match config.ledger().registry_lookup(&token).await {
                Err(e) => {
                    tracing::warn!(error = %e, "Registry lookup failed");
                    Err(ResolveError::Unresolved("factory lookup failed for provided identifier".to_string()))
                }
                Ok(address) if address == Address::ZERO => {
                    Err(ResolveError::Unresolved("no deployed election found for provided identifier".to_string()))
                }
                Ok(address) => {
                    tracing::debug!(address = %address, "Identifier resolved through registry");
                    Ok(ResolvedElection { address, path: ResolutionPath::RegistryLookup })
                }
            }
        }
    }
}
