use clap::Parser;
use shelterscan_core::{placeholder, AppConfig, Coordinate, RadiusFilters, Shelter, ShelterWithDistance};

use super::*;
use crate::discover::{format_row, resolve_filters};

fn config() -> AppConfig {
    AppConfig {
        log_level: "info".to_string(),
        user_agent: "shelterscan-test/0.1".to_string(),
        text_search_url: "http://127.0.0.1:9".to_string(),
        graph_query_url: "http://127.0.0.1:9".to_string(),
        geocode_url: "http://127.0.0.1:9".to_string(),
        geolocation_url: "http://127.0.0.1:9".to_string(),
        tile_source: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
        request_timeout_secs: 1,
        geolocation_timeout_secs: 1,
        inter_request_delay_ms: 0,
        result_limit: 50,
        max_retries: 0,
        retry_backoff_base_ms: 0,
        parallel_providers: false,
        filters_path: None,
    }
}

fn entry(synthetic: bool, distance: f64) -> ShelterWithDistance {
    ShelterWithDistance {
        shelter: Shelter {
            id: "overpass-node-1".to_string(),
            name: "Hilltop Rescue".to_string(),
            address: "7 Mill Road".to_string(),
            city: placeholder::CITY.to_string(),
            state: placeholder::STATE.to_string(),
            zip: placeholder::ZIP.to_string(),
            phone: placeholder::PHONE.to_string(),
            email: placeholder::EMAIL.to_string(),
            website: placeholder::WEBSITE.to_string(),
            coordinates: Coordinate::from_lat_lon(40.0, -75.0).unwrap(),
            description: placeholder::DESCRIPTION.to_string(),
            services: vec![placeholder::SERVICES.to_string()],
            hours: placeholder::HOURS.to_string(),
            image_url: None,
            is_synthetic: synthetic,
        },
        distance,
        tier: RadiusFilters::default().tier_for(distance),
    }
}

#[test]
fn parses_discover_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "shelterscan",
        "discover",
        "--lat",
        "40.0",
        "--lon",
        "-75.0",
        "--filters",
        "5,10",
    ])
    .expect("expected valid cli args");

    let Commands::Discover(args) = cli.command else {
        panic!("expected discover command");
    };
    assert_eq!(args.lat, Some(40.0));
    assert_eq!(args.lon, Some(-75.0));
    assert_eq!(args.filters, Some(vec![5.0, 10.0]));
    assert!(args.geojson.is_none());
    assert!(!args.json);
}

#[test]
fn discover_without_location_flags_is_valid() {
    let cli = Cli::try_parse_from(["shelterscan", "discover"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Discover(DiscoverArgs {
            lat: None,
            lon: None,
            ..
        })
    ));
}

#[test]
fn lat_without_lon_is_rejected() {
    assert!(Cli::try_parse_from(["shelterscan", "discover", "--lat", "40.0"]).is_err());
}

#[test]
fn search_collects_all_words() {
    let cli = Cli::try_parse_from(["shelterscan", "search", "Trenton,", "NJ"])
        .expect("expected valid cli args");
    let Commands::Search { text } = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(text.join(" "), "Trenton, NJ");
}

#[test]
fn search_requires_text() {
    assert!(Cli::try_parse_from(["shelterscan", "search"]).is_err());
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["shelterscan"]).is_err());
}

#[test]
fn resolve_filters_defaults_to_builtin_set() {
    let filters = resolve_filters(&config(), None).unwrap();
    assert_eq!(filters, RadiusFilters::default());
}

#[test]
fn resolve_filters_narrows_to_requested_radii() {
    let filters = resolve_filters(&config(), Some(&[5.0, 25.0])).unwrap();
    let active: Vec<f64> = filters.iter().filter(|f| f.active).map(|f| f.miles).collect();
    assert_eq!(active, vec![5.0, 25.0]);
}

#[test]
fn resolve_filters_rejects_unknown_radii() {
    let err = resolve_filters(&config(), Some(&[7.0])).unwrap_err();
    assert!(err.to_string().contains("available"));
}

#[test]
fn format_row_shows_distance_tier_and_sample_flag() {
    let row = format_row(&entry(false, 3.25));
    assert!(row.starts_with("   3.2 mi") || row.starts_with("   3.3 mi"), "{row}");
    assert!(row.contains("5 miles"));
    assert!(row.contains("Hilltop Rescue"));
    assert!(!row.contains("[sample]"));

    assert!(format_row(&entry(true, 3.0)).contains("[sample]"));
}

#[test]
fn format_row_marks_shelters_past_every_band() {
    let row = format_row(&entry(false, 80.0));
    assert!(row.contains("  -  "), "{row}");
}
