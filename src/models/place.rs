//! Facility record and coordinate types shared across the search pipeline.

use serde::{Deserialize, Serialize};

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Node => write!(f, "node"),
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Kind of care facility matched by the point-of-interest query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    Hospital,
    Clinic,
}

impl FacilityKind {
    /// Display name used when the matched element carries no name tag
    pub fn fallback_name(self) -> &'static str {
        match self {
            FacilityKind::Hospital => "Hospital",
            FacilityKind::Clinic => "Clinic",
        }
    }
}

/// A hospital or clinic found by one search.
///
/// Built fresh per search and discarded when the next search begins;
/// nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Unique source identifier: "{osm_type}/{osm_id}"
    pub source_id: String,

    pub kind: FacilityKind,

    pub name: String,

    /// Structured address parts joined with spaces, absent when the
    /// element has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub location: GeoPoint,

    /// Distance from the search origin in miles, when computable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl Facility {
    /// Create a facility with the minimal required fields. The name starts
    /// as the kind fallback until a name tag overrides it.
    pub fn new(osm_type: OsmType, osm_id: i64, kind: FacilityKind, location: GeoPoint) -> Self {
        Self {
            source_id: format!("{}/{}", osm_type, osm_id),
            kind,
            name: kind.fallback_name().to_string(),
            address: None,
            location,
            distance_miles: None,
        }
    }
}
