//! Text/tag search client for a Nominatim-compatible `/search` endpoint.
//!
//! One discovery run issues, strictly in order:
//! 1. an `amenity=animal_shelter` tag query,
//! 2. one free-text query per entry in [`SYNONYM_TERMS`], paced by a
//!    [`RateLimitedQueue`],
//! 3. an `amenity=veterinary` tag query whose hits are kept only when the
//!    name mentions one of [`SHELTER_NAME_KEYWORDS`].
//!
//! Every query is bounded to the box around the search circle. A sub-query
//! that fails at the transport or status level is logged and skipped.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use shelterscan_core::{AppConfig, Coordinate};

use crate::error::DiscoveryError;
use crate::fetch::{endpoint, get_json};
use crate::providers::{BoundingBox, ProviderTag, RawCandidate};
use crate::rate_limit::{retry_with_backoff, RateLimitedQueue};

pub const SHELTER_AMENITY: &str = "animal_shelter";
pub const VETERINARY_AMENITY: &str = "veterinary";

/// Free-text phrasings people and mappers use for shelters.
pub const SYNONYM_TERMS: &[&str] = &[
    "animal shelter",
    "humane society",
    "spca",
    "animal rescue",
    "pet adoption",
    "dog rescue",
    "cat rescue",
    "animal control",
    "pet shelter",
    "animal welfare",
    "rescue shelter",
    "animal sanctuary",
    "pet rescue",
];

/// Name fragments that mark a veterinary hit as shelter-related.
pub const SHELTER_NAME_KEYWORDS: &[&str] = &["shelter", "rescue", "humane", "spca", "adoption"];

const DEFAULT_LIMIT: u32 = 50;
const DEFAULT_INTER_REQUEST_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
enum SubQuery {
    Amenity(&'static str),
    Text(&'static str),
}

impl std::fmt::Display for SubQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubQuery::Amenity(tag) => write!(f, "amenity={tag}"),
            SubQuery::Text(term) => write!(f, "q={term}"),
        }
    }
}

/// Client for the text/tag search provider.
#[derive(Debug, Clone)]
pub struct TextSearchClient {
    client: Client,
    base_url: String,
    limit: u32,
    queue: RateLimitedQueue,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl TextSearchClient {
    /// Creates a client with the default limit (50), a 200 ms pause between
    /// synonym queries, and retries disabled.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
            limit: DEFAULT_LIMIT,
            queue: RateLimitedQueue::new(DEFAULT_INTER_REQUEST_DELAY),
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(client: Client, config: &AppConfig) -> Self {
        Self::new(client, &config.text_search_url)
            .with_limit(config.result_limit)
            .with_inter_request_delay(Duration::from_millis(config.inter_request_delay_ms))
            .with_retry(config.max_retries, config.retry_backoff_base_ms)
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_inter_request_delay(mut self, delay: Duration) -> Self {
        self.queue = RateLimitedQueue::new(delay);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs the full sub-query sequence around `center`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::MalformedResponse`] when a response parses as
    /// JSON but is not an array. Transport and status failures are skipped.
    pub async fn search(
        &self,
        center: Coordinate,
        radius_miles: f64,
    ) -> Result<Vec<RawCandidate>, DiscoveryError> {
        let bbox = BoundingBox::around(center, radius_miles);
        let mut candidates = self
            .run_sub_query(SubQuery::Amenity(SHELTER_AMENITY), &bbox)
            .await?;

        let this = self;
        let bbox_ref = &bbox;
        let synonym_batches = self
            .queue
            .run(SYNONYM_TERMS.iter().copied(), move |term| {
                this.run_sub_query(SubQuery::Text(term), bbox_ref)
            })
            .await;
        for batch in synonym_batches {
            candidates.extend(batch?);
        }

        let vets = self
            .run_sub_query(SubQuery::Amenity(VETERINARY_AMENITY), &bbox)
            .await?;
        let vet_total = vets.len();
        let shelter_vets: Vec<RawCandidate> = vets
            .into_iter()
            .filter(|c| c.name_matches_any(SHELTER_NAME_KEYWORDS))
            .collect();
        tracing::debug!(
            vet_total,
            kept = shelter_vets.len(),
            "filtered veterinary hits by shelter keywords"
        );
        candidates.extend(shelter_vets);

        tracing::debug!(
            total = candidates.len(),
            "text search collected raw candidates"
        );
        Ok(candidates)
    }

    async fn run_sub_query(
        &self,
        sub_query: SubQuery,
        bbox: &BoundingBox,
    ) -> Result<Vec<RawCandidate>, DiscoveryError> {
        let url = endpoint(&self.base_url, "search");
        let params = self.query_params(sub_query, bbox);

        let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            get_json(&self.client, &url, &params)
        })
        .await;

        let body = match result {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%sub_query, error = %err, "text search sub-query failed, skipping");
                return Ok(Vec::new());
            }
        };

        let Value::Array(records) = body else {
            return Err(DiscoveryError::MalformedResponse {
                provider: "text-search",
                reason: format!("expected a JSON array for {sub_query}"),
            });
        };

        tracing::debug!(%sub_query, hits = records.len(), "text search sub-query completed");
        Ok(records
            .into_iter()
            .filter(Value::is_object)
            .map(|record| RawCandidate::new(ProviderTag::TextSearch, record))
            .collect())
    }

    fn query_params(&self, sub_query: SubQuery, bbox: &BoundingBox) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "json".to_string()),
            ("viewbox", bbox.to_viewbox()),
            ("bounded", "1".to_string()),
            ("limit", self.limit.to_string()),
            ("addressdetails", "1".to_string()),
            ("extratags", "1".to_string()),
            ("namedetails", "1".to_string()),
        ];
        match sub_query {
            SubQuery::Amenity(tag) => params.push(("amenity", tag.to_string())),
            SubQuery::Text(term) => params.push(("q", term.to_string())),
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> TextSearchClient {
        TextSearchClient::new(Client::new(), "https://nominatim.example")
    }

    #[test]
    fn synonym_list_has_thirteen_distinct_terms() {
        let mut terms: Vec<&str> = SYNONYM_TERMS.to_vec();
        terms.sort_unstable();
        terms.dedup();
        assert_eq!(terms.len(), 13);
    }

    #[test]
    fn amenity_params_use_tag_filter() {
        let bbox = BoundingBox::around(Coordinate::from_lat_lon(40.0, -75.0).unwrap(), 5.0);
        let params = test_client().query_params(SubQuery::Amenity(SHELTER_AMENITY), &bbox);
        assert!(params.contains(&("amenity", "animal_shelter".to_string())));
        assert!(params.contains(&("bounded", "1".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "q"));
    }

    #[test]
    fn text_params_use_free_text_query() {
        let bbox = BoundingBox::around(Coordinate::from_lat_lon(40.0, -75.0).unwrap(), 5.0);
        let params = test_client()
            .with_limit(7)
            .query_params(SubQuery::Text("humane society"), &bbox);
        assert!(params.contains(&("q", "humane society".to_string())));
        assert!(params.contains(&("limit", "7".to_string())));
        assert!(params.contains(&("viewbox", bbox.to_viewbox())));
    }

    #[test]
    fn limit_is_at_least_one() {
        let bbox = BoundingBox::around(Coordinate::from_lat_lon(0.0, 0.0).unwrap(), 1.0);
        let params = test_client()
            .with_limit(0)
            .query_params(SubQuery::Text("spca"), &bbox);
        assert!(params.contains(&("limit", "1".to_string())));
    }
}
