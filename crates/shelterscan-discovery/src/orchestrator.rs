//! Discovery cycle state machine.
//!
//! One cycle runs `Idle → Querying → Classifying → Ready`, or ends in
//! `Failed` when a provider returns a response of the wrong shape or the
//! center is invalid. State lives behind a short-held mutex that is never
//! held across an `.await`; every write is guarded by a generation number so
//! a slow cycle that finishes after a newer one started cannot overwrite it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use shelterscan_core::{AppConfig, Coordinate, RadiusFilters, Shelter, ShelterWithDistance};
use uuid::Uuid;

use crate::dedup::deduplicate;
use crate::error::DiscoveryError;
use crate::fallback::generate_fallback;
use crate::normalize::normalize;
use crate::providers::{GraphQueryClient, RawCandidate, TextSearchClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryPhase {
    Idle,
    Querying,
    Classifying,
    Ready,
    Failed,
}

impl std::fmt::Display for DiscoveryPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiscoveryPhase::Idle => "idle",
            DiscoveryPhase::Querying => "querying",
            DiscoveryPhase::Classifying => "classifying",
            DiscoveryPhase::Ready => "ready",
            DiscoveryPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of a completed cycle or reclassification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub cycle_id: Uuid,
    pub generation: u64,
    pub center: Coordinate,
    /// Sorted by ascending distance.
    pub results: Vec<ShelterWithDistance>,
    pub status: String,
    /// `true` when `results` came from the fallback generator.
    pub synthetic: bool,
    /// Radius the providers were queried with; `None` when no filter was active.
    pub queried_radius: Option<f64>,
    pub completed_at: DateTime<Utc>,
}

/// Point-in-time view of the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySnapshot {
    pub phase: DiscoveryPhase,
    pub generation: u64,
    pub loading: bool,
    pub center: Option<Coordinate>,
    pub results: Vec<ShelterWithDistance>,
    pub status: String,
}

impl Default for DiscoverySnapshot {
    fn default() -> Self {
        Self {
            phase: DiscoveryPhase::Idle,
            generation: 0,
            loading: false,
            center: None,
            results: Vec::new(),
            status: String::new(),
        }
    }
}

/// Deduplicated shelters from the last successful query.
#[derive(Debug, Clone)]
struct CandidateCache {
    cycle_id: Uuid,
    center: Coordinate,
    radius: f64,
    shelters: Vec<Shelter>,
    synthetic: bool,
}

#[derive(Debug, Default)]
struct State {
    snapshot: DiscoverySnapshot,
    cache: Option<CandidateCache>,
}

/// Runs discovery cycles against both providers.
#[derive(Debug)]
pub struct DiscoveryOrchestrator {
    text_search: TextSearchClient,
    graph_query: GraphQueryClient,
    parallel_providers: bool,
    state: Mutex<State>,
}

impl DiscoveryOrchestrator {
    #[must_use]
    pub fn new(text_search: TextSearchClient, graph_query: GraphQueryClient) -> Self {
        Self {
            text_search,
            graph_query,
            parallel_providers: false,
            state: Mutex::new(State::default()),
        }
    }

    #[must_use]
    pub fn from_config(client: &Client, config: &AppConfig) -> Self {
        Self::new(
            TextSearchClient::from_config(client.clone(), config),
            GraphQueryClient::from_config(client.clone(), config),
        )
        .with_parallel_providers(config.parallel_providers)
    }

    /// Runs the two providers concurrently instead of one after the other.
    #[must_use]
    pub fn with_parallel_providers(mut self, parallel: bool) -> Self {
        self.parallel_providers = parallel;
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> DiscoverySnapshot {
        self.lock().snapshot.clone()
    }

    /// `true` when a filter change can be answered from cached candidates:
    /// the last query succeeded and covered the largest active radius.
    #[must_use]
    pub fn can_reclassify(&self, filters: &RadiusFilters) -> bool {
        let Some(max_radius) = filters.max_active_radius() else {
            return true;
        };
        let state = self.lock();
        !state.snapshot.loading
            && state
                .cache
                .as_ref()
                .is_some_and(|cache| max_radius <= cache.radius)
    }

    /// Runs one full discovery cycle around `center`.
    ///
    /// Returns `Ok(None)` when a newer cycle started before this one
    /// finished; its results are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the center is invalid or a provider
    /// response has the wrong shape. The orchestrator is left in
    /// [`DiscoveryPhase::Failed`] with a readable status.
    pub async fn discover(
        &self,
        center: Coordinate,
        filters: &RadiusFilters,
    ) -> Result<Option<DiscoveryReport>, DiscoveryError> {
        let cycle_id = Uuid::new_v4();
        let generation = {
            let mut state = self.lock();
            state.snapshot.generation += 1;
            state.snapshot.phase = DiscoveryPhase::Querying;
            state.snapshot.loading = true;
            state.snapshot.center = Some(center);
            state.snapshot.generation
        };
        tracing::info!(%cycle_id, generation, %center, "starting discovery cycle");

        let Some(radius) = filters.max_active_radius() else {
            tracing::info!(%cycle_id, "no radius filter active, skipping provider queries");
            let report = DiscoveryReport {
                cycle_id,
                generation,
                center,
                results: Vec::new(),
                status: "No radius filters selected".to_string(),
                synthetic: false,
                queried_radius: None,
                completed_at: Utc::now(),
            };
            return Ok(self.commit(generation, None, report));
        };

        let candidates = match self.query(cycle_id, center, radius).await {
            Ok(candidates) => candidates,
            Err(err) => {
                self.fail(generation, &err);
                return Err(err);
            }
        };

        {
            let mut state = self.lock();
            if state.snapshot.generation != generation {
                tracing::debug!(%cycle_id, generation, "discovery cycle superseded");
                return Ok(None);
            }
            state.snapshot.phase = DiscoveryPhase::Classifying;
        }

        let results = classify(&candidates.shelters, center, filters);
        let status = status_message(results.len(), candidates.synthetic);
        let report = DiscoveryReport {
            cycle_id,
            generation,
            center,
            results,
            status,
            synthetic: candidates.synthetic,
            queried_radius: Some(radius),
            completed_at: Utc::now(),
        };
        Ok(self.commit(generation, Some(candidates), report))
    }

    /// Re-applies `filters` to the cached candidates without any network
    /// traffic. Returns `None` when there is nothing cached to classify or a
    /// cycle is in flight; callers should check [`Self::can_reclassify`] first.
    #[must_use]
    pub fn reclassify(&self, filters: &RadiusFilters) -> Option<DiscoveryReport> {
        let mut state = self.lock();
        if state.snapshot.loading {
            return None;
        }
        let cache = state.cache.as_ref()?;

        let results = match filters.max_active_radius() {
            Some(_) => classify(&cache.shelters, cache.center, filters),
            None => Vec::new(),
        };
        let status = if filters.max_active_radius().is_some() {
            status_message(results.len(), cache.synthetic)
        } else {
            "No radius filters selected".to_string()
        };
        let report = DiscoveryReport {
            cycle_id: cache.cycle_id,
            generation: state.snapshot.generation,
            center: cache.center,
            results,
            status,
            synthetic: cache.synthetic,
            queried_radius: Some(cache.radius),
            completed_at: Utc::now(),
        };
        tracing::debug!(
            cycle_id = %report.cycle_id,
            shown = report.results.len(),
            "reclassified cached candidates"
        );

        state.snapshot.phase = DiscoveryPhase::Ready;
        state.snapshot.results = report.results.clone();
        state.snapshot.status = report.status.clone();
        Some(report)
    }

    async fn query(
        &self,
        cycle_id: Uuid,
        center: Coordinate,
        radius: f64,
    ) -> Result<CandidateCache, DiscoveryError> {
        // `new_unchecked` centers are rejected here rather than trusted.
        Coordinate::new(center.longitude, center.latitude)?;

        let (text, graph) = if self.parallel_providers {
            tokio::join!(
                self.text_search.search(center, radius),
                self.graph_query.search(center, radius)
            )
        } else {
            let text = self.text_search.search(center, radius).await;
            let graph = self.graph_query.search(center, radius).await;
            (text, graph)
        };
        let raw: Vec<RawCandidate> = text?.into_iter().chain(graph?).collect();
        let raw_total = raw.len();

        let normalized: Vec<Shelter> = raw
            .iter()
            .filter_map(|candidate| normalize(candidate, center, radius))
            .collect();
        let shelters = deduplicate(normalized);
        tracing::info!(
            %cycle_id,
            raw = raw_total,
            unique = shelters.len(),
            radius,
            "provider queries finished"
        );

        if shelters.is_empty() {
            let shelters = generate_fallback(center, radius);
            tracing::info!(%cycle_id, generated = shelters.len(), "no shelters found, using sample data");
            return Ok(CandidateCache {
                cycle_id,
                center,
                radius,
                shelters,
                synthetic: true,
            });
        }

        Ok(CandidateCache {
            cycle_id,
            center,
            radius,
            shelters,
            synthetic: false,
        })
    }

    /// Writes a finished cycle if `generation` is still current.
    fn commit(
        &self,
        generation: u64,
        cache: Option<CandidateCache>,
        report: DiscoveryReport,
    ) -> Option<DiscoveryReport> {
        let mut state = self.lock();
        if state.snapshot.generation != generation {
            tracing::debug!(cycle_id = %report.cycle_id, generation, "discovery cycle superseded");
            return None;
        }
        state.cache = cache;
        state.snapshot.phase = DiscoveryPhase::Ready;
        state.snapshot.loading = false;
        state.snapshot.results = report.results.clone();
        state.snapshot.status = report.status.clone();
        tracing::info!(
            cycle_id = %report.cycle_id,
            generation,
            shown = report.results.len(),
            synthetic = report.synthetic,
            "discovery cycle ready"
        );
        Some(report)
    }

    fn fail(&self, generation: u64, err: &DiscoveryError) {
        let mut state = self.lock();
        if state.snapshot.generation != generation {
            return;
        }
        tracing::error!(generation, error = %err, "discovery cycle failed");
        state.cache = None;
        state.snapshot.phase = DiscoveryPhase::Failed;
        state.snapshot.loading = false;
        state.snapshot.results.clear();
        state.snapshot.status = format!("Could not load shelters: {err}");
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pairs each shelter with its distance from `center`, keeps those inside
/// at least one active filter and sorts nearest first.
#[must_use]
pub fn classify(
    shelters: &[Shelter],
    center: Coordinate,
    filters: &RadiusFilters,
) -> Vec<ShelterWithDistance> {
    let mut results: Vec<ShelterWithDistance> = shelters
        .iter()
        .filter_map(|shelter| {
            let distance = center.distance_to(&shelter.coordinates);
            filters.retains(distance).then(|| ShelterWithDistance {
                shelter: shelter.clone(),
                distance,
                tier: filters.tier_for(distance),
            })
        })
        .collect();
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    results
}

fn status_message(count: usize, synthetic: bool) -> String {
    if synthetic {
        format!("No shelters found nearby. Showing {count} sample shelters (not real data)")
    } else {
        format!("Found {count} real shelters nearby")
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
