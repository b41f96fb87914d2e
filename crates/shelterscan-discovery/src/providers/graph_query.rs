//! Graph query client for an Overpass-compatible `/api/interpreter` endpoint.

use reqwest::Client;
use serde_json::Value;
use shelterscan_core::{AppConfig, Coordinate};

use crate::error::DiscoveryError;
use crate::fetch::{endpoint, post_form_json};
use crate::providers::{ProviderTag, RawCandidate};

const METERS_PER_MILE: f64 = 1609.344;
const DEFAULT_TIMEOUT_HINT_SECS: u32 = 25;

const SHELTER_NAME_PATTERN: &str = "shelter|rescue|humane|spca|adoption";
const ANIMAL_NAME_PATTERN: &str = "animal|pet|dog|cat";

/// Builds the Overpass QL query for shelters within `radius_miles` of `center`.
///
/// Matches, on nodes, ways and relations alike:
/// - `amenity=animal_shelter`
/// - NGO/charity/association offices whose name looks shelter-related
/// - veterinary and clinic amenities whose name looks shelter-related
/// - social facilities whose name mentions animals
///
/// `out center tags` makes ways and relations report a `center` point.
#[must_use]
pub fn build_overpass_query(center: Coordinate, radius_miles: f64, timeout_hint_secs: u32) -> String {
    let around = format!(
        "(around:{:.0},{:.6},{:.6})",
        (radius_miles * METERS_PER_MILE).max(1.0),
        center.latitude,
        center.longitude
    );
    format!(
        "[out:json][timeout:{timeout_hint_secs}];\n\
         (\n  \
           nwr[\"amenity\"=\"animal_shelter\"]{around};\n  \
           nwr[\"office\"~\"^(ngo|charity|association)$\"][\"name\"~\"{SHELTER_NAME_PATTERN}\",i]{around};\n  \
           nwr[\"amenity\"~\"^(veterinary|clinic)$\"][\"name\"~\"{SHELTER_NAME_PATTERN}\",i]{around};\n  \
           nwr[\"amenity\"=\"social_facility\"][\"name\"~\"{ANIMAL_NAME_PATTERN}\",i]{around};\n\
         );\n\
         out center tags;"
    )
}

fn timeout_hint_for(request_timeout_secs: u64) -> u32 {
    u32::try_from(request_timeout_secs)
        .unwrap_or(u32::MAX)
        .max(1)
}

/// Client for the graph query provider. Issues exactly one request per
/// discovery run.
#[derive(Debug, Clone)]
pub struct GraphQueryClient {
    client: Client,
    base_url: String,
    timeout_hint_secs: u32,
}

impl GraphQueryClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
            timeout_hint_secs: DEFAULT_TIMEOUT_HINT_SECS,
        }
    }

    /// The server-side timeout hint follows `request_timeout_secs`, so the
    /// server gives up no later than the HTTP client does.
    #[must_use]
    pub fn from_config(client: Client, config: &AppConfig) -> Self {
        Self::new(client, &config.graph_query_url)
            .with_timeout_hint(timeout_hint_for(config.request_timeout_secs))
    }

    /// Server-side timeout hint embedded in the query.
    #[must_use]
    pub fn with_timeout_hint(mut self, secs: u32) -> Self {
        self.timeout_hint_secs = secs;
        self
    }

    /// Fetches candidate elements around `center`.
    ///
    /// The query is a POST and is not retried.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::MalformedResponse`] when the response is JSON
    /// without an `elements` array. Transport and status failures yield an
    /// empty result instead.
    pub async fn search(
        &self,
        center: Coordinate,
        radius_miles: f64,
    ) -> Result<Vec<RawCandidate>, DiscoveryError> {
        let url = endpoint(&self.base_url, "api/interpreter");
        let query = build_overpass_query(center, radius_miles, self.timeout_hint_secs);

        let body = match post_form_json(&self.client, &url, &[("data", query.as_str())]).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "graph query failed, continuing without it");
                return Ok(Vec::new());
            }
        };

        let Some(elements) = body.get("elements").and_then(Value::as_array) else {
            return Err(DiscoveryError::MalformedResponse {
                provider: "graph-query",
                reason: "missing `elements` array".to_string(),
            });
        };

        let candidates: Vec<RawCandidate> = elements
            .iter()
            .filter(|el| el.is_object())
            .map(|el| RawCandidate::new(ProviderTag::GraphQuery, el.clone()))
            .collect();
        tracing::debug!(hits = candidates.len(), "graph query completed");
        Ok(candidates)
    }
}
