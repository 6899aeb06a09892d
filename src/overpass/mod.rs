//! Overpass client for the facility query and result normalization.

use anyhow::Result;
use geo::Centroid;
use geo_types::{Coord, LineString, Polygon};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::geodesy::{distance_meters, meters_to_miles};
use crate::models::{Facility, FacilityKind, GeoPoint, OsmType, ServiceError};

const DEFAULT_BASE_URL: &str = "https://overpass-api.de";

const USER_AGENT: &str = "Carefinder/0.1 (wound-care demo; nearby facility search)";

/// Fixed search radius around the origin, in meters.
const SEARCH_RADIUS_METERS: u32 = 10_000;

/// Raw element cap requested from the service.
const RAW_ELEMENT_LIMIT: u32 = 25;

/// Ranked results returned to the caller.
const MAX_RESULTS: usize = 8;

/// Sort key for entries with no computed distance, not a real distance.
const UNKNOWN_DISTANCE_SORT_KEY: f64 = 999.0;

/// Client for an Overpass-compatible point-of-interest service
pub struct OverpassClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    element_type: OsmType,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<RawPoint>,
    #[serde(default)]
    geometry: Vec<RawPoint>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

impl OverpassClient {
    /// Create a client pointed at the public Overpass instance.
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

    /// Find hospitals and clinics around the origin, nearest first.
    ///
    /// An empty result means no facilities inside the radius, which is a
    /// distinct condition from the query failing.
    pub async fn find_facilities(&self, origin: GeoPoint) -> Result<Vec<Facility>, ServiceError> {
        let query = build_query(origin);
        let mut url = self.base_url.clone();
        url.set_path("api/interpreter");

        debug!("Overpass query: {}", query);

        let response = self
            .client
            .post(url)
            .body(query)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: OverpassResponse = serde_json::from_str(&body)
            .map_err(|e| ServiceError::decode("facility search", e))?;

        let facilities = parsed
            .elements
            .into_iter()
            .filter_map(|element| normalize_element(element, origin))
            .collect();

        Ok(rank(facilities))
    }
}

fn build_query(origin: GeoPoint) -> String {
    let around = format!(
        "around:{},{},{}",
        SEARCH_RADIUS_METERS, origin.lat, origin.lon
    );
    format!(
        r#"[out:json][timeout:25];(nwr["amenity"="hospital"]({around});nwr["amenity"="clinic"]({around});nwr["healthcare"="clinic"]({around}););out center {RAW_ELEMENT_LIMIT};"#
    )
}

/// Normalize one raw element into a `Facility`, or drop it when it has no
/// recognizable category or no usable coordinate.
fn normalize_element(element: RawElement, origin: GeoPoint) -> Option<Facility> {
    let kind = classify(&element.tags)?;
    let location = representative_point(&element)?;

    let mut facility = Facility::new(element.element_type, element.id, kind, location);

    if let Some(name) = element
        .tags
        .get("name")
        .or_else(|| element.tags.get("name:en"))
    {
        facility.name = name.clone();
    }
    facility.address = assemble_address(&element.tags);
    facility.distance_miles = Some(meters_to_miles(distance_meters(origin, location)));

    Some(facility)
}

fn classify(tags: &HashMap<String, String>) -> Option<FacilityKind> {
    match tags.get("amenity").map(String::as_str) {
        Some("hospital") => return Some(FacilityKind::Hospital),
        Some("clinic") => return Some(FacilityKind::Clinic),
        _ => {}
    }
    if tags.get("healthcare").map(String::as_str) == Some("clinic") {
        return Some(FacilityKind::Clinic);
    }
    None
}

/// A feature's own point, the service-provided center, or the centroid of
/// its geometry ring.
fn representative_point(element: &RawElement) -> Option<GeoPoint> {
    if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
        return Some(GeoPoint { lat, lon });
    }
    if let Some(center) = element.center {
        return Some(GeoPoint {
            lat: center.lat,
            lon: center.lon,
        });
    }
    geometry_centroid(&element.geometry)
}

/// Centroid of an area feature's outline, closing the ring if the source
/// left it open.
fn geometry_centroid(points: &[RawPoint]) -> Option<GeoPoint> {
    if points.len() < 3 {
        return None;
    }

    let mut ring: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect();
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }

    let polygon = Polygon::new(LineString::new(ring), vec![]);
    polygon.centroid().map(|p| GeoPoint {
        lat: p.y(),
        lon: p.x(),
    })
}

/// Join the structured address tags with spaces; `None` when the element
/// carries none of them.
fn assemble_address(tags: &HashMap<String, String>) -> Option<String> {
    const ADDRESS_TAGS: [&str; 4] = [
        "addr:housenumber",
        "addr:street",
        "addr:city",
        "addr:postcode",
    ];

    let parts: Vec<&str> = ADDRESS_TAGS
        .iter()
        .filter_map(|key| tags.get(*key).map(String::as_str))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Rank ascending by distance and cap the list. Unknown distances sort
/// after all known ones.
fn rank(mut facilities: Vec<Facility>) -> Vec<Facility> {
    facilities.sort_by(|a, b| sort_key(a).total_cmp(&sort_key(b)));
    facilities.truncate(MAX_RESULTS);
    facilities
}

fn sort_key(facility: &Facility) -> f64 {
    facility.distance_miles.unwrap_or(UNKNOWN_DISTANCE_SORT_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn node(id: i64, lat: f64, lon: f64, tag_pairs: &[(&str, &str)]) -> RawElement {
        RawElement {
            element_type: OsmType::Node,
            id,
            lat: Some(lat),
            lon: Some(lon),
            center: None,
            geometry: Vec::new(),
            tags: tags(tag_pairs),
        }
    }

    #[test]
    fn unnamed_hospital_falls_back_to_kind_name() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let element = node(1, 40.01, -75.0, &[("amenity", "hospital")]);

        let facility = normalize_element(element, origin).unwrap();
        assert_eq!(facility.name, "Hospital");
        assert_eq!(facility.source_id, "node/1");
        assert!(facility.address.is_none());

        let miles = facility.distance_miles.unwrap();
        assert!((miles - 0.69).abs() < 0.01, "got {} miles", miles);
    }

    #[test]
    fn name_tag_preferred_over_english_name() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let element = node(
            2,
            40.0,
            -75.0,
            &[
                ("amenity", "clinic"),
                ("name", "Klinik am Park"),
                ("name:en", "Park Clinic"),
            ],
        );

        let facility = normalize_element(element, origin).unwrap();
        assert_eq!(facility.name, "Klinik am Park");
        assert_eq!(facility.kind, FacilityKind::Clinic);
    }

    #[test]
    fn english_name_used_when_primary_missing() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let element = node(
            3,
            40.0,
            -75.0,
            &[("healthcare", "clinic"), ("name:en", "Riverside Clinic")],
        );

        let facility = normalize_element(element, origin).unwrap();
        assert_eq!(facility.name, "Riverside Clinic");
    }

    #[test]
    fn address_joined_from_structured_parts() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let element = node(
            4,
            40.0,
            -75.0,
            &[
                ("amenity", "hospital"),
                ("addr:housenumber", "3400"),
                ("addr:street", "Spruce St"),
                ("addr:city", "Philadelphia"),
                ("addr:postcode", "19104"),
            ],
        );

        let facility = normalize_element(element, origin).unwrap();
        assert_eq!(
            facility.address.as_deref(),
            Some("3400 Spruce St Philadelphia 19104")
        );
    }

    #[test]
    fn untagged_element_is_dropped() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let element = node(5, 40.0, -75.0, &[("amenity", "pharmacy")]);
        assert!(normalize_element(element, origin).is_none());
    }

    #[test]
    fn element_without_any_coordinate_is_dropped() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let element = RawElement {
            element_type: OsmType::Way,
            id: 6,
            lat: None,
            lon: None,
            center: None,
            geometry: Vec::new(),
            tags: tags(&[("amenity", "hospital")]),
        };
        assert!(normalize_element(element, origin).is_none());
    }

    #[test]
    fn way_without_center_uses_geometry_centroid() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        // Open square ring around (40.05, -75.05); the ring gets closed
        // before the centroid is taken.
        let element = RawElement {
            element_type: OsmType::Way,
            id: 7,
            lat: None,
            lon: None,
            center: None,
            geometry: vec![
                RawPoint { lat: 40.04, lon: -75.06 },
                RawPoint { lat: 40.04, lon: -75.04 },
                RawPoint { lat: 40.06, lon: -75.04 },
                RawPoint { lat: 40.06, lon: -75.06 },
            ],
            tags: tags(&[("amenity", "hospital")]),
        };

        let facility = normalize_element(element, origin).unwrap();
        assert!((facility.location.lat - 40.05).abs() < 1e-6);
        assert!((facility.location.lon - -75.05).abs() < 1e-6);
        assert_eq!(facility.source_id, "way/7");
    }

    #[test]
    fn rank_sorts_ascending_and_caps_at_eight() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let mut facilities = Vec::new();
        // Ten nodes at increasing latitude offsets, inserted farthest first.
        for i in (1..=10).rev() {
            let element = node(
                i,
                40.0 + 0.001 * i as f64,
                -75.0,
                &[("amenity", "hospital")],
            );
            facilities.push(normalize_element(element, origin).unwrap());
        }

        let ranked = rank(facilities);
        assert_eq!(ranked.len(), 8);
        for pair in ranked.windows(2) {
            assert!(pair[0].distance_miles.unwrap() <= pair[1].distance_miles.unwrap());
        }
        assert_eq!(ranked[0].source_id, "node/1");
        assert_eq!(ranked[7].source_id, "node/8");
    }

    #[test]
    fn unknown_distance_sorts_last() {
        let origin = GeoPoint { lat: 40.0, lon: -75.0 };
        let known = normalize_element(node(1, 40.05, -75.0, &[("amenity", "hospital")]), origin)
            .unwrap();

        let mut unknown = known.clone();
        unknown.source_id = "node/2".to_string();
        unknown.distance_miles = None;

        let ranked = rank(vec![unknown, known]);
        assert_eq!(ranked[0].source_id, "node/1");
        assert!(ranked[1].distance_miles.is_none());
    }

    #[test]
    fn query_targets_all_three_categories_within_radius() {
        let query = build_query(GeoPoint { lat: 40.0, lon: -75.0 });
        assert!(query.contains(r#"nwr["amenity"="hospital"](around:10000,40,-75)"#));
        assert!(query.contains(r#"nwr["amenity"="clinic"](around:10000,40,-75)"#));
        assert!(query.contains(r#"nwr["healthcare"="clinic"](around:10000,40,-75)"#));
        assert!(query.contains("out center 25"));
    }
}
