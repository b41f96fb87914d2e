use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Sent on every outbound request; public OSM services reject anonymous clients.
    pub user_agent: String,
    pub text_search_url: String,
    pub graph_query_url: String,
    pub geocode_url: String,
    pub geolocation_url: String,
    pub tile_source: String,
    pub request_timeout_secs: u64,
    pub geolocation_timeout_secs: u64,
    /// Pause between consecutive text-search synonym queries.
    pub inter_request_delay_ms: u64,
    pub result_limit: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Run the two providers concurrently instead of back to back.
    pub parallel_providers: bool,
    pub filters_path: Option<PathBuf>,
}
