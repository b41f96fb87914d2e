//! Device location acquisition.
//!
//! A [`Geolocator`] either yields a coordinate or a [`GeolocationError`].
//! [`resolve_location`] wraps any geolocator with a timeout and substitutes
//! [`DEFAULT_CENTER`] on failure, so callers always get a usable center.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use shelterscan_core::{AppConfig, Coordinate, DEFAULT_CENTER};

use crate::error::GeolocationError;
use crate::fetch::get_json;
use crate::providers::value_as_f64;
use crate::rate_limit::retry_with_backoff;

pub trait Geolocator {
    fn locate(&self) -> impl Future<Output = Result<Coordinate, GeolocationError>> + Send;
}

/// Where a resolved center came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub source: LocationSource,
}

/// Asks `geolocator` for a position, giving up after `timeout`.
///
/// Denial, failure and timeout all resolve to [`DEFAULT_CENTER`].
pub async fn resolve_location<G: Geolocator + ?Sized>(
    geolocator: &G,
    timeout: Duration,
) -> ResolvedLocation {
    let outcome = match tokio::time::timeout(timeout, geolocator.locate()).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout(timeout.as_secs())),
    };

    match outcome {
        Ok(coordinate) => ResolvedLocation {
            coordinate,
            source: LocationSource::Device,
        },
        Err(err) => {
            tracing::warn!(error = %err, center = %DEFAULT_CENTER, "geolocation failed, using default center");
            ResolvedLocation {
                coordinate: DEFAULT_CENTER,
                source: LocationSource::Default,
            }
        }
    }
}

/// Always reports the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinate);

impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinate, GeolocationError> {
        Ok(self.0)
    }
}

/// Always reports that permission was refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocator;

impl Geolocator for DeniedGeolocator {
    async fn locate(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Denied)
    }
}

/// Approximate location from an IP geolocation service.
///
/// Accepts `latitude`/`longitude` or `lat`/`lon` at the top level of the
/// JSON response.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl IpGeolocator {
    #[must_use]
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_owned(),
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(client: Client, config: &AppConfig) -> Self {
        Self::new(client, &config.geolocation_url)
            .with_retry(config.max_retries, config.retry_backoff_base_ms)
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }
}

impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinate, GeolocationError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            get_json(&self.client, &self.url, &[])
        })
        .await
        .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        coordinate_from_body(&body)
    }
}

fn coordinate_from_body(body: &Value) -> Result<Coordinate, GeolocationError> {
    let field = |names: [&str; 2]| names.iter().find_map(|n| body.get(*n).and_then(value_as_f64));
    let (Some(lat), Some(lon)) = (field(["latitude", "lat"]), field(["longitude", "lon"])) else {
        return Err(GeolocationError::Unavailable(
            "response has no latitude/longitude".to_string(),
        ));
    };
    Coordinate::from_lat_lon(lat, lon).map_err(|e| GeolocationError::Unavailable(e.to_string()))
}
