#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the fire monitor.
//!
//! Uses `indicatif-log-bridge` (via [`fire_monitor_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the geocoding progress bar never fight for the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fire_monitor_cli_utils::IndicatifProgress;
use fire_monitor_geocoder::nominatim::NominatimClient;
use fire_monitor_pipeline::FireService;
use fire_monitor_region::paths;

#[derive(Parser)]
#[command(name = "fire_monitor", about = "Satellite fire detection monitor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and write the snapshot
    Run {
        /// Look-back window in days (1-10). Defaults to the region config.
        #[arg(long)]
        days: Option<u32>,
        /// Output path. Defaults to `data/generated/active_fires.json`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Download the region boundary polygon from Nominatim
    FetchBoundary {
        /// Output path. Defaults to `data/boundary/{region}_boundary.geojson`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Start the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = fire_monitor_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { days, out } => {
            let service = FireService::from_env()?;
            let days = days.unwrap_or(service.region().feed.default_days);
            let progress = IndicatifProgress::detections_bar(&multi, "Fetching detections");
            let mut service = service.with_progress(progress);

            let snapshot = service.run(days).await;
            let out = out.unwrap_or_else(paths::snapshot_path);
            fire_monitor_pipeline::write_snapshot(&out, &snapshot)?;

            println!(
                "{} fires: {} high, {} medium, {} low -> {}",
                snapshot.total,
                snapshot.high.len(),
                snapshot.medium.len(),
                snapshot.low.len(),
                out.display()
            );
        }
        Commands::FetchBoundary { out } => fetch_boundary(out).await?,
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(fire_monitor_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

/// Searches Nominatim for the region's polygon and saves it as a
/// one-feature `GeoJSON` collection.
async fn fetch_boundary(out: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let region = fire_monitor_region::region();
    let client = NominatimClient::new(&region.geocoder)?;

    let query = format!("{}, {}", region.name, region.country);
    log::info!("Searching Nominatim for {query:?}");

    let Some(geometry) = client.search_polygon(&query).await? else {
        return Err(format!("No polygon found for {query:?}").into());
    };

    let document =
        fire_monitor_spatial::boundary_document(geometry, &format!("{} (OSM)", region.name))?;

    let out = out.unwrap_or_else(|| paths::boundary_path(&region.id));
    paths::ensure_parent(&out)?;
    std::fs::write(&out, serde_json::to_string_pretty(&document)?)?;

    println!("Saved boundary to {}", out.display());
    Ok(())
}
