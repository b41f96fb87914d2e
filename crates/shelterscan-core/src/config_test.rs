use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.user_agent, "shelterscan/0.1 (animal-shelter-finder)");
    assert_eq!(cfg.text_search_url, "https://nominatim.openstreetmap.org");
    assert_eq!(cfg.graph_query_url, "https://overpass-api.de");
    assert_eq!(cfg.geocode_url, "https://nominatim.openstreetmap.org");
    assert_eq!(cfg.geolocation_url, "https://ipapi.co/json/");
    assert_eq!(cfg.request_timeout_secs, 10);
    assert_eq!(cfg.geolocation_timeout_secs, 10);
    assert_eq!(cfg.inter_request_delay_ms, 200);
    assert_eq!(cfg.result_limit, 50);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert!(!cfg.parallel_providers);
    assert!(cfg.filters_path.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_TEXT_SEARCH_URL", "http://127.0.0.1:9000");
    map.insert("SHELTERSCAN_INTER_REQUEST_DELAY_MS", "1000");
    map.insert("SHELTERSCAN_PARALLEL_PROVIDERS", "yes");
    map.insert("SHELTERSCAN_FILTERS_PATH", "./config/filters.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.text_search_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.inter_request_delay_ms, 1000);
    assert!(cfg.parallel_providers);
    assert_eq!(
        cfg.filters_path.as_deref(),
        Some(std::path::Path::new("./config/filters.yaml"))
    );
}

#[test]
fn build_app_config_rejects_invalid_number() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_REQUEST_TIMEOUT_SECS", "ten");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELTERSCAN_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(SHELTERSCAN_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn build_app_config_rejects_zero_result_limit() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_RESULT_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELTERSCAN_RESULT_LIMIT")
    );
}

#[test]
fn build_app_config_rejects_bad_bool() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_PARALLEL_PROVIDERS", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELTERSCAN_PARALLEL_PROVIDERS")
    );
}

#[test]
fn build_app_config_rejects_non_http_url() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_GRAPH_QUERY_URL", "ftp://overpass.example");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELTERSCAN_GRAPH_QUERY_URL")
    );
}

#[test]
fn build_app_config_rejects_blank_user_agent() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_USER_AGENT", "  ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn blank_filters_path_is_ignored() {
    let mut map = HashMap::new();
    map.insert("SHELTERSCAN_FILTERS_PATH", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.filters_path.is_none());
}

#[test]
fn parse_flag_accepts_common_spellings() {
    assert_eq!(parse_flag("TRUE"), Some(true));
    assert_eq!(parse_flag(" off "), Some(false));
    assert_eq!(parse_flag("maybe"), None);
}
