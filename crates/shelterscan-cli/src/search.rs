//! `shelterscan search`: geocode a place name.

use shelterscan_core::AppConfig;
use shelterscan_discovery::{build_http_client, PlaceSearchClient};

/// Prints the first geocoding match for `query`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the geocoding
/// request fails.
pub(crate) async fn run_search(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let http = build_http_client(config.request_timeout_secs, &config.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    let client = PlaceSearchClient::from_config(http, config);

    match client.resolve(query).await? {
        Some(place) => println!(
            "{:.6}, {:.6}  {}",
            place.coordinate.latitude, place.coordinate.longitude, place.display_name
        ),
        None => println!("no place matched \"{query}\""),
    }
    Ok(())
}
