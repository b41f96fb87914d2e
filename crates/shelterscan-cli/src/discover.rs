//! `shelterscan discover`: one discovery cycle on an in-memory map.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use shelterscan_core::{load_filters, AppConfig, Coordinate, RadiusFilters, ShelterWithDistance};
use shelterscan_discovery::{
    build_http_client, DiscoveryOrchestrator, DiscoveryPhase, FixedGeolocator, Geolocator,
    InteractionController, IpGeolocator, PlaceSearchClient, RecordingMapSurface,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct DiscoverArgs {
    /// Latitude of the search center; skips IP geolocation
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the search center
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Radius filters to activate, in miles (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub filters: Option<Vec<f64>>,

    /// Write every map marker to this file as GeoJSON
    #[arg(long)]
    pub geojson: Option<PathBuf>,

    /// Print the full report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Runs one discovery cycle and prints the result.
///
/// # Errors
///
/// Returns an error if the filters cannot be loaded, the HTTP client cannot
/// be built, the cycle fails, or the GeoJSON file cannot be written.
pub(crate) async fn run_discover(config: &AppConfig, args: &DiscoverArgs) -> anyhow::Result<()> {
    let filters = resolve_filters(config, args.filters.as_deref())?;
    let http = build_http_client(config.request_timeout_secs, &config.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

    let orchestrator = DiscoveryOrchestrator::from_config(&http, config);
    let place_search = PlaceSearchClient::from_config(http.clone(), config);

    match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            let center = Coordinate::from_lat_lon(lat, lon)?;
            let controller = InteractionController::new(
                orchestrator,
                place_search,
                RecordingMapSurface::new(),
                FixedGeolocator(center),
                filters,
            );
            drive(controller, config, args).await
        }
        _ => {
            let controller = InteractionController::new(
                orchestrator,
                place_search,
                RecordingMapSurface::new(),
                IpGeolocator::from_config(http, config),
                filters,
            );
            drive(controller, config, args).await
        }
    }
}

async fn drive<G: Geolocator>(
    controller: InteractionController<RecordingMapSurface, G>,
    config: &AppConfig,
    args: &DiscoverArgs,
) -> anyhow::Result<()> {
    let mut controller = controller
        .with_tile_source(&config.tile_source)
        .with_geolocation_timeout(Duration::from_secs(config.geolocation_timeout_secs));
    controller.mount();
    let report = controller.on_map_loaded().await;
    let snapshot = controller.orchestrator().snapshot();

    if snapshot.phase == DiscoveryPhase::Failed {
        anyhow::bail!("{}", snapshot.status);
    }
    let Some(report) = report else {
        anyhow::bail!("discovery did not complete");
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("center: {}", report.center);
        for entry in &report.results {
            println!("{}", format_row(entry));
        }
        println!("{}", report.status);
    }

    if let Some(path) = &args.geojson {
        let geojson = serde_json::to_string_pretty(&controller.surface().to_geojson())?;
        std::fs::write(path, geojson)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote marker GeoJSON");
    }

    Ok(())
}

/// Filters from the configured file (or the built-in set), narrowed to
/// `requested` radii when given.
pub(crate) fn resolve_filters(
    config: &AppConfig,
    requested: Option<&[f64]>,
) -> anyhow::Result<RadiusFilters> {
    let mut filters = match &config.filters_path {
        Some(path) => load_filters(path)?,
        None => RadiusFilters::default(),
    };

    if let Some(miles) = requested {
        filters.activate_only(miles);
        if filters.max_active_radius().is_none() {
            let known: Vec<String> = filters.iter().map(|f| f.miles.to_string()).collect();
            anyhow::bail!(
                "none of the requested radii match a filter (available: {})",
                known.join(", ")
            );
        }
    }
    Ok(filters)
}

pub(crate) fn format_row(entry: &ShelterWithDistance) -> String {
    let tier = entry.tier.as_ref().map_or("-", |t| t.label.as_str());
    let sample = if entry.shelter.is_synthetic {
        " [sample]"
    } else {
        ""
    };
    format!(
        "{:>6.1} mi  {:<9} {}{} | {} | {}",
        entry.distance, tier, entry.shelter.name, sample, entry.shelter.address, entry.shelter.phone
    )
}
