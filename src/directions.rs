//! Maps handoff URLs.
//!
//! The core only builds the URL for turn-by-turn directions; launching the
//! platform maps application belongs to the surface that consumes it.

use url::Url;

use crate::models::GeoPoint;

/// Native maps application to hand off to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapsApp {
    Apple,
    Google,
}

/// Build a directions URL for the destination.
pub fn directions_url(app: MapsApp, destination: GeoPoint, label: &str) -> Url {
    let coords = format!("{},{}", destination.lat, destination.lon);
    match app {
        MapsApp::Apple => {
            let mut url = Url::parse("https://maps.apple.com/").expect("static URL");
            url.query_pairs_mut()
                .append_pair("daddr", &coords)
                .append_pair("q", label);
            url
        }
        MapsApp::Google => {
            let mut url = Url::parse("https://www.google.com/maps/dir/").expect("static URL");
            url.query_pairs_mut()
                .append_pair("api", "1")
                .append_pair("destination", &coords);
            url
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apple_url_carries_destination_and_label() {
        let url = directions_url(
            MapsApp::Apple,
            GeoPoint { lat: 40.01, lon: -75.0 },
            "General Hospital",
        );
        assert_eq!(
            url.as_str(),
            "https://maps.apple.com/?daddr=40.01%2C-75&q=General+Hospital"
        );
    }

    #[test]
    fn google_url_carries_destination() {
        let url = directions_url(
            MapsApp::Google,
            GeoPoint { lat: 40.01, lon: -75.0 },
            "General Hospital",
        );
        assert_eq!(
            url.as_str(),
            "https://www.google.com/maps/dir/?api=1&destination=40.01%2C-75"
        );
    }
}
