//! Search flow orchestration.
//!
//! Sequences geocode → facility search → label resolution into a single
//! `SearchOutcome` per user action. Every error is converted to outcome
//! state here; nothing propagates past this module.

mod session;

pub use session::{SearchSession, SearchToken, SessionState};

use tracing::{info, warn};

use crate::models::{GeoPoint, LocationError, SearchError, SearchOutcome};
use crate::nominatim::NominatimClient;
use crate::overpass::OverpassClient;

/// Capability that yields the device's current coordinate.
///
/// The platform half (permission prompt, GPS read) lives outside this
/// crate; callers hand in whatever implementation their surface provides.
#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    async fn current_location(&self) -> Result<GeoPoint, LocationError>;
}

/// Runs the two search entry flows against the external services.
pub struct SearchService {
    geocoder: NominatimClient,
    facilities: OverpassClient,
}

impl SearchService {
    pub fn new(geocoder: NominatimClient, facilities: OverpassClient) -> Self {
        Self {
            geocoder,
            facilities,
        }
    }

    /// Typed-query flow: validate, geocode, then search from the match.
    ///
    /// An empty (post-trim) query fails validation before any network
    /// call. The geocoder's display label becomes the origin label, so no
    /// reverse-geocode call is needed.
    pub async fn search_by_query(&self, raw_query: &str) -> SearchOutcome {
        let query = raw_query.trim();
        if query.is_empty() {
            return SearchOutcome::Failed(SearchError::EmptyQuery);
        }

        let place = match self.geocoder.geocode(query).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                info!("No geocode match for '{}'", query);
                return SearchOutcome::Failed(SearchError::LocationNotFound);
            }
            Err(e) => {
                warn!("Geocode failed for '{}': {}", query, e);
                return SearchOutcome::Failed(e.into());
            }
        };

        self.facilities_near(place.location, place.display_name)
            .await
    }

    /// Device-location flow: read the coordinate from the capability, then
    /// reverse-geocode a label (best-effort) and search.
    ///
    /// Permission denial surfaces as its own condition so the caller can
    /// steer the user toward the typed-query flow.
    pub async fn search_near_device<P: LocationProvider>(&self, provider: &P) -> SearchOutcome {
        let origin = match provider.current_location().await {
            Ok(point) => point,
            Err(LocationError::PermissionDenied) => {
                return SearchOutcome::Failed(SearchError::PermissionDenied);
            }
            Err(LocationError::Unavailable(reason)) => {
                return SearchOutcome::Failed(SearchError::LocationUnavailable(reason));
            }
        };

        let label = self.geocoder.reverse_label(origin).await;
        self.facilities_near(origin, label).await
    }

    async fn facilities_near(&self, origin: GeoPoint, origin_label: String) -> SearchOutcome {
        match self.facilities.find_facilities(origin).await {
            Ok(found) if found.is_empty() => SearchOutcome::NoResults { origin_label },
            Ok(found) => {
                info!("Found {} facilities near {}", found.len(), origin_label);
                SearchOutcome::Results {
                    origin_label,
                    facilities: found,
                }
            }
            Err(e) => {
                warn!("Facility search failed: {}", e);
                SearchOutcome::Failed(e.into())
            }
        }
    }
}
