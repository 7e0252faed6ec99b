use alloy::primitives::Address;

/// Classification of a caller-supplied election identifier after cleanup.
///
/// Cleanup strips surrounding whitespace and stray quote characters that
/// clients routinely leak into path segments. Forty bare hex characters are
/// treated as an address missing its `0x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedIdentifier {
    /// A complete, parseable contract address.
    FullAddress(Address),
    /// `0x`-prefixed but shorter than a full address; resolved against known
    /// election addresses by prefix.
    Prefix(String),
    /// Anything else. Treated as an organiser email and resolved through the
    /// registry contract.
    OpaqueToken(String),
}

/// How a resolved election address was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ResolutionPath {
    /// The identifier already was a full address.
    DirectHex,
    /// A truncated identifier matched exactly one known election.
    PrefixMatch,
    /// The registry contract mapped an organiser email to its deployment.
    RegistryLookup,
}

/// A successfully resolved election contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedElection {
    pub address: Address,
    pub path: ResolutionPath,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Nothing left after cleanup, or a textual null leaked by a client.
    #[error("empty address")]
    Empty,

    /// Write paths reject `0x` identifiers below the useful prefix length.
    #[error("address too short / truncated")]
    TooShort,

    /// Write paths reject anything that is not a complete address.
    #[error("invalid hex address")]
    InvalidHex,

    /// A truncated identifier matched more than one known election. This is
    /// never answered from the mirror; the caller has to disambiguate.
    #[error("ambiguous truncated election identifier; multiple elections match this prefix - please provide the full address")]
    Ambiguous { matches: u64 },

    /// The identifier is well formed but no source could produce an address.
    /// The message is the human-readable detail surfaced to callers.
    #[error("{0}")]
    Unresolved(String),
}
