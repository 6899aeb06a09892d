//! Carefinder - nearby-care search core for a wound-care education demo
//!
//! This library provides the geocoding, facility search, stage guidance,
//! and directions modules shared by the CLI binary.

pub mod directions;
pub mod geodesy;
pub mod models;
pub mod nominatim;
pub mod overpass;
pub mod search;
pub mod stages;

pub use models::{Facility, FacilityKind, GeoPoint, OsmType, SearchError, SearchOutcome};
