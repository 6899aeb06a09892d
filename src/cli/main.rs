//! Command-line surface for the nearby-care search core.
//!
//! Stands in for the mobile presentation layer: each command runs one
//! flow and renders its single outcome.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use carefinder::directions::{directions_url, MapsApp};
use carefinder::models::{GeoPoint, LocationError, SearchOutcome};
use carefinder::nominatim::NominatimClient;
use carefinder::overpass::OverpassClient;
use carefinder::search::{LocationProvider, SearchService};
use carefinder::stages::StageGuide;

#[derive(Parser, Debug)]
#[command(name = "carefinder")]
#[command(about = "Nearby-care search for the wound-care demo")]
struct Args {
    /// Nominatim base URL
    #[arg(long, default_value = "https://nominatim.openstreetmap.org")]
    nominatim_url: String,

    /// Overpass base URL
    #[arg(long, default_value = "https://overpass-api.de")]
    overpass_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find care facilities near a typed location
    Search {
        /// Address, ZIP, or place name
        query: String,
    },
    /// Find care facilities near a coordinate (stands in for the device
    /// location reading)
    Near {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
    },
    /// Print the demo stage distribution and guidance
    Assess {
        /// Stage table override file
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Print a maps handoff URL for a destination
    Directions {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
        /// Destination label
        #[arg(long, default_value = "Care facility")]
        name: String,
        /// Maps app: apple or google
        #[arg(long, default_value = "apple")]
        app: String,
    },
}

/// Coordinate handed in on the command line, standing in for the device
/// location capability.
struct CliLocation {
    point: GeoPoint,
}

impl LocationProvider for CliLocation {
    async fn current_location(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.point)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    match args.command {
        Command::Search { query } => {
            let service = build_service(&args.nominatim_url, &args.overpass_url)?;
            let outcome = service.search_by_query(&query).await;
            render_outcome(&outcome);
        }
        Command::Near { lat, lon } => {
            let service = build_service(&args.nominatim_url, &args.overpass_url)?;
            let provider = CliLocation {
                point: GeoPoint { lat, lon },
            };
            let outcome = service.search_near_device(&provider).await;
            render_outcome(&outcome);
        }
        Command::Assess { table } => {
            let guide = match table {
                Some(path) => StageGuide::load_from_file(path)?,
                None => StageGuide::builtin()?,
            };
            render_guide(&guide);
        }
        Command::Directions {
            lat,
            lon,
            name,
            app,
        } => {
            let app = match app.as_str() {
                "apple" => MapsApp::Apple,
                "google" => MapsApp::Google,
                other => anyhow::bail!("unknown maps app '{}'", other),
            };
            println!("{}", directions_url(app, GeoPoint { lat, lon }, &name));
        }
    }

    Ok(())
}

fn build_service(nominatim_url: &str, overpass_url: &str) -> Result<SearchService> {
    let geocoder = NominatimClient::with_base_url(nominatim_url)?;
    let facilities = OverpassClient::with_base_url(overpass_url)?;
    Ok(SearchService::new(geocoder, facilities))
}

fn render_outcome(outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Results {
            origin_label,
            facilities,
        } => {
            println!("Care facilities near {}:", origin_label);
            for (i, facility) in facilities.iter().enumerate() {
                let distance = facility
                    .distance_miles
                    .map(|miles| format!("{:.1} mi", miles))
                    .unwrap_or_else(|| "distance unknown".to_string());
                println!("{:>2}. {} ({})", i + 1, facility.name, distance);
                if let Some(address) = &facility.address {
                    println!("      {}", address);
                }
                println!(
                    "      {},{}  [{}]",
                    facility.location.lat, facility.location.lon, facility.source_id
                );
            }
        }
        SearchOutcome::NoResults { origin_label } => {
            println!(
                "No hospitals or clinics found within 10 km of {}.",
                origin_label
            );
        }
        SearchOutcome::Failed(error) => {
            println!("{}", error);
        }
    }
}

fn render_guide(guide: &StageGuide) {
    println!("Demo stage assessment (fixed distribution):");
    for stage in &guide.stages {
        println!("  {:<22} {:>5.1}%", stage.name, stage.probability * 100.0);
    }
    if let Some(top) = guide.top() {
        println!();
        println!("{}: {}", top.name, top.guidance);
    }
}
