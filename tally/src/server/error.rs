use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ErrorResponse;
use crate::reader::FallbackError;

pub type ElectionRouteResult = Result<Response, ElectionRouteError>;

/// Errors surfaced by the election routes.
///
/// Every variant maps to one HTTP status code in [`IntoResponse`]; the
/// Display string becomes the `message` of the JSON error body. Failures
/// after a transaction has already been accepted by the node never land
/// here, those are reported inside a 200 body so the handle is not lost.
#[derive(Debug, thiserror::Error)]
pub enum ElectionRouteError {
    /// Malformed input: bad address, missing required fields, closed voting
    /// window, or a vote aimed at an address without contract code
    #[error("{0}")]
    BadRequest(String),

    /// A truncated identifier matched more than one stored election
    #[error("ambiguous truncated election identifier; multiple elections match this prefix - please provide the full address")]
    AmbiguousIdentifier { matches: u64 },

    /// The voter has no `Verified` enrollment for the election
    #[error("Voter not verified. Please contact election admin.")]
    VoterNotVerified,

    /// The requested off-chain record does not exist
    #[error("{0}")]
    NotFound(String),

    /// An insert collided with an existing record
    #[error("{0}")]
    AlreadyExists(String),

    /// The ledger node could not be reached before anything was submitted
    #[error("{0}")]
    LedgerUnavailable(String),

    /// Mirror or ledger failure with no fallback left
    #[error("{0}")]
    Internal(String),

    /// A read exhausted the ledger and then the mirror too. `detail` keeps
    /// the full causal chain
    #[error("{message}")]
    FallbackFailed { message: String, detail: String },
}

impl From<FallbackError> for ElectionRouteError {
    fn from(e: FallbackError) -> Self {
        ElectionRouteError::FallbackFailed { message: e.message, detail: e.detail }
    }
}

impl IntoResponse for ElectionRouteError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            ElectionRouteError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorResponse::new(message)),
            ElectionRouteError::AmbiguousIdentifier { matches } => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message).with_matches(matches))
            }
            ElectionRouteError::VoterNotVerified => (StatusCode::FORBIDDEN, ErrorResponse::new(message)),
            ElectionRouteError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorResponse::new(message)),
            ElectionRouteError::AlreadyExists(_) => (StatusCode::CONFLICT, ErrorResponse::new(message)),
            ElectionRouteError::LedgerUnavailable(_) => (StatusCode::BAD_GATEWAY, ErrorResponse::new(message)),
            ElectionRouteError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(message)),
            ElectionRouteError::FallbackFailed { detail, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(message).with_detail(detail))
            }
        };

        (status, Json(body)).into_response()
    }
}
