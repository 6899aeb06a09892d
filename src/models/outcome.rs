//! Outcome and error types for the search flows.

use thiserror::Error;

use super::place::Facility;

/// Network or decode failure from one of the external services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("unexpected {context} response: {message}")]
    Decode {
        context: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub(crate) fn decode(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            context,
            message: err.to_string(),
        }
    }
}

/// Failure reported by the device location capability.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("device location unavailable: {0}")]
    Unavailable(String),
}

/// Everything a search flow can fail with. The `Display` text doubles as
/// the user-facing message.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("enter a city, address, or ZIP code to search")]
    EmptyQuery,

    #[error("location not found; try a different address or ZIP")]
    LocationNotFound,

    #[error("location permission denied; search by address or ZIP instead")]
    PermissionDenied,

    #[error("current location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("search failed: {0}")]
    Service(#[from] ServiceError),
}

/// Tagged result of one search flow. Exactly one variant holds for the
/// current session.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Ranked facilities, nearest first
    Results {
        origin_label: String,
        facilities: Vec<Facility>,
    },
    /// The search ran but found nothing within the radius
    NoResults { origin_label: String },
    /// The search could not be performed
    Failed(SearchError),
}
