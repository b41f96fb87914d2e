use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed response from {provider}: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] shelterscan_core::CoreError),
}

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    Denied,

    #[error("location request timed out after {0}s")]
    Timeout(u64),

    #[error("location unavailable: {0}")]
    Unavailable(String),
}
