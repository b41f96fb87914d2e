use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true/false/1/0/yes/no".to_string(),
            )
        })
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw)
        } else {
            Err(invalid(var, format!("\"{raw}\" is not an http(s) URL")))
        }
    };

    let log_level = or_default("SHELTERSCAN_LOG_LEVEL", "info");
    let user_agent = or_default(
        "SHELTERSCAN_USER_AGENT",
        "shelterscan/0.1 (animal-shelter-finder)",
    );
    if user_agent.trim().is_empty() {
        return Err(invalid(
            "SHELTERSCAN_USER_AGENT",
            "must be a non-empty client identifier".to_string(),
        ));
    }

    let text_search_url = parse_url(
        "SHELTERSCAN_TEXT_SEARCH_URL",
        "https://nominatim.openstreetmap.org",
    )?;
    let graph_query_url = parse_url("SHELTERSCAN_GRAPH_QUERY_URL", "https://overpass-api.de")?;
    let geocode_url = parse_url(
        "SHELTERSCAN_GEOCODE_URL",
        "https://nominatim.openstreetmap.org",
    )?;
    let geolocation_url = parse_url("SHELTERSCAN_GEOLOCATION_URL", "https://ipapi.co/json/")?;
    let tile_source = or_default(
        "SHELTERSCAN_TILE_SOURCE",
        "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
    );

    let request_timeout_secs = parse_u64("SHELTERSCAN_REQUEST_TIMEOUT_SECS", "10")?;
    let geolocation_timeout_secs = parse_u64("SHELTERSCAN_GEOLOCATION_TIMEOUT_SECS", "10")?;
    let inter_request_delay_ms = parse_u64("SHELTERSCAN_INTER_REQUEST_DELAY_MS", "200")?;
    let result_limit = parse_u32("SHELTERSCAN_RESULT_LIMIT", "50")?;
    let max_retries = parse_u32("SHELTERSCAN_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("SHELTERSCAN_RETRY_BACKOFF_BASE_MS", "500")?;
    let parallel_providers = parse_bool("SHELTERSCAN_PARALLEL_PROVIDERS", "false")?;
    let filters_path = lookup("SHELTERSCAN_FILTERS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    if request_timeout_secs == 0 {
        return Err(invalid(
            "SHELTERSCAN_REQUEST_TIMEOUT_SECS",
            "timeout must be at least 1 second".to_string(),
        ));
    }
    if result_limit == 0 {
        return Err(invalid(
            "SHELTERSCAN_RESULT_LIMIT",
            "limit must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        log_level,
        user_agent,
        text_search_url,
        graph_query_url,
        geocode_url,
        geolocation_url,
        tile_source,
        request_timeout_secs,
        geolocation_timeout_secs,
        inter_request_delay_ms,
        result_limit,
        max_retries,
        retry_backoff_base_ms,
        parallel_providers,
        filters_path,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
