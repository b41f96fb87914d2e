//! Free-text place lookup used to recenter the map.

use reqwest::Client;
use serde_json::Value;
use shelterscan_core::{AppConfig, Coordinate};

use crate::error::DiscoveryError;
use crate::fetch::{endpoint, get_json};
use crate::providers::value_as_f64;
use crate::rate_limit::retry_with_backoff;

/// The first geocoding hit for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceMatch {
    pub coordinate: Coordinate,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct PlaceSearchClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlaceSearchClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(client: Client, config: &AppConfig) -> Self {
        Self::new(client, &config.geocode_url)
            .with_retry(config.max_retries, config.retry_backoff_base_ms)
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Resolves `query` to its best match. Blank queries resolve to `None`
    /// without a request.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and parse failures, and
    /// [`DiscoveryError::MalformedResponse`] for a non-array body.
    pub async fn resolve(&self, query: &str) -> Result<Option<PlaceMatch>, DiscoveryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let url = endpoint(&self.base_url, "search");
        let params = [
            ("format", "json".to_string()),
            ("q", query.to_string()),
            ("limit", "1".to_string()),
        ];
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            get_json(&self.client, &url, &params)
        })
        .await?;

        let Value::Array(results) = body else {
            return Err(DiscoveryError::MalformedResponse {
                provider: "geocode",
                reason: "expected a JSON array".to_string(),
            });
        };

        let Some(first) = results.first() else {
            tracing::debug!(query, "place search returned no results");
            return Ok(None);
        };

        let lat = first.get("lat").and_then(value_as_f64);
        let lon = first.get("lon").and_then(value_as_f64);
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(DiscoveryError::MalformedResponse {
                provider: "geocode",
                reason: "first result has no usable lat/lon".to_string(),
            });
        };

        let coordinate = Coordinate::from_lat_lon(lat, lon)?;
        let display_name = first
            .get("display_name")
            .and_then(Value::as_str)
            .map_or_else(|| query.to_string(), str::to_string);

        Ok(Some(PlaceMatch {
            coordinate,
            display_name,
        }))
    }
}
