//! Nominatim client for forward and reverse geocoding.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::models::{GeoPoint, ServiceError};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

const USER_AGENT: &str = "Carefinder/0.1 (wound-care demo; nearby facility search)";

/// Label substituted when reverse geocoding cannot produce one.
const FALLBACK_LABEL: &str = "Current location";

/// A forward-geocode match: where the query resolved and what to call it.
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub location: GeoPoint,
    pub display_name: String,
}

/// Client for a Nominatim-compatible geocoding service
pub struct NominatimClient {
    client: Client,
    base_url: Url,
}

// Nominatim serializes coordinates as JSON strings.
#[derive(Debug, Deserialize)]
struct SearchEntry {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: String,
}

impl NominatimClient {
    /// Create a client pointed at the public Nominatim instance.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (self-hosted instance, or a
    /// mock server in tests).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Resolve a free-text query to at most one match.
    ///
    /// Returns `Ok(None)` when the service has no match for the query,
    /// which is a distinct condition from the lookup failing. A single
    /// attempt, no retry.
    pub async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, ServiceError> {
        let url = self.endpoint(
            "search",
            &[("q", query), ("format", "json"), ("limit", "1")],
        );

        debug!("Geocoding '{}'", query);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let entries: Vec<SearchEntry> =
            serde_json::from_str(&body).map_err(|e| ServiceError::decode("geocode", e))?;

        let entry = match entries.into_iter().next() {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let lat = entry
            .lat
            .parse::<f64>()
            .map_err(|e| ServiceError::decode("geocode", e))?;
        let lon = entry
            .lon
            .parse::<f64>()
            .map_err(|e| ServiceError::decode("geocode", e))?;

        Ok(Some(GeocodedPlace {
            location: GeoPoint { lat, lon },
            display_name: entry.display_name,
        }))
    }

    /// Resolve a coordinate to a human-readable label.
    ///
    /// Best-effort: any failure falls back to a fixed label so this call
    /// can never block or fail the overall search.
    pub async fn reverse_label(&self, point: GeoPoint) -> String {
        match self.reverse(point).await {
            Ok(label) => label,
            Err(e) => {
                warn!("Reverse geocode failed, using fallback label: {}", e);
                FALLBACK_LABEL.to_string()
            }
        }
    }

    async fn reverse(&self, point: GeoPoint) -> Result<String, ServiceError> {
        let lat = point.lat.to_string();
        let lon = point.lon.to_string();
        let url = self.endpoint("reverse", &[("lat", &lat), ("lon", &lon), ("format", "json")]);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| ServiceError::decode("reverse geocode", e))?;

        Ok(parsed.display_name)
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_query_parameters() {
        let client = NominatimClient::with_base_url("http://localhost:8080").unwrap();
        let url = client.endpoint("search", &[("q", "19104 Philadelphia"), ("limit", "1")]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/search?q=19104+Philadelphia&limit=1"
        );
    }
}
