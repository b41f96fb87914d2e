//! User-facing interactions wired to the orchestrator, markers and map.

use std::time::Duration;

use shelterscan_core::{Coordinate, RadiusFilters, DEFAULT_CENTER};

use crate::error::DiscoveryError;
use crate::geolocation::{resolve_location, Geolocator, ResolvedLocation};
use crate::map::{MapControl, MapSurface, INITIAL_ZOOM, LOCAL_ZOOM, PLACE_ZOOM};
use crate::markers::MarkerManager;
use crate::orchestrator::{DiscoveryOrchestrator, DiscoveryReport};
use crate::providers::{PlaceMatch, PlaceSearchClient};

pub const DEFAULT_TILE_SOURCE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Owns the map surface, marker registry and current filters, and turns
/// host events into discovery cycles.
pub struct InteractionController<S, G> {
    orchestrator: DiscoveryOrchestrator,
    place_search: PlaceSearchClient,
    surface: S,
    geolocator: G,
    markers: MarkerManager,
    filters: RadiusFilters,
    center: Option<Coordinate>,
    tile_source: String,
    geolocation_timeout: Duration,
    mounted: bool,
    loaded: bool,
}

impl<S: MapSurface, G: Geolocator> InteractionController<S, G> {
    #[must_use]
    pub fn new(
        orchestrator: DiscoveryOrchestrator,
        place_search: PlaceSearchClient,
        surface: S,
        geolocator: G,
        filters: RadiusFilters,
    ) -> Self {
        Self {
            orchestrator,
            place_search,
            surface,
            geolocator,
            markers: MarkerManager::new(),
            filters,
            center: None,
            tile_source: DEFAULT_TILE_SOURCE.to_string(),
            geolocation_timeout: Duration::from_secs(10),
            mounted: false,
            loaded: false,
        }
    }

    #[must_use]
    pub fn with_tile_source(mut self, tile_source: &str) -> Self {
        tile_source.clone_into(&mut self.tile_source);
        self
    }

    #[must_use]
    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    /// Initializes the surface on the default center and adds the standard
    /// controls. Calling it again is a no-op.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.surface
            .initialize(DEFAULT_CENTER, INITIAL_ZOOM, &self.tile_source);
        self.surface
            .add_controls(&[MapControl::Navigation, MapControl::Scale]);
        self.mounted = true;
        tracing::debug!(tile_source = %self.tile_source, "map mounted");
    }

    /// Handles the surface's load-complete event: locates the user and runs
    /// the first discovery cycle. Only the first call does anything.
    pub async fn on_map_loaded(&mut self) -> Option<DiscoveryReport> {
        if !self.mounted || self.loaded {
            return None;
        }
        self.loaded = true;
        self.locate_and_discover().await
    }

    /// Flips the filter at `index`. Answers from cached candidates when the
    /// last query covered the new largest radius, otherwise re-queries.
    pub async fn toggle_filter(&mut self, index: usize) -> Option<DiscoveryReport> {
        let active = self.filters.toggle(index)?;
        let label = self.filters.get(index).map(|f| f.label.clone());
        tracing::debug!(index, ?label, active, "radius filter toggled");

        let center = self.center?;
        if self.orchestrator.can_reclassify(&self.filters) {
            if let Some(report) = self.orchestrator.reclassify(&self.filters) {
                self.markers.render_shelters(&mut self.surface, &report.results);
                return Some(report);
            }
        }
        self.run_cycle(center).await
    }

    /// Re-acquires the device location and runs a full cycle there.
    pub async fn use_my_location(&mut self) -> Option<DiscoveryReport> {
        if !self.loaded {
            return None;
        }
        self.locate_and_discover().await
    }

    /// Re-runs a full cycle at the current center.
    pub async fn rediscover(&mut self) -> Option<DiscoveryReport> {
        let center = self.center?;
        self.run_cycle(center).await
    }

    /// Geocodes `query`, flies the map there and drops the place marker.
    /// Does not start a discovery cycle or move the discovery center.
    ///
    /// # Errors
    ///
    /// Propagates [`DiscoveryError`] from the geocoding request.
    pub async fn search_place(&mut self, query: &str) -> Result<Option<PlaceMatch>, DiscoveryError> {
        let Some(place) = self.place_search.resolve(query).await? else {
            tracing::info!(query, "no place matched search");
            return Ok(None);
        };
        self.surface.fly_to(place.coordinate, PLACE_ZOOM);
        self.markers.set_place_marker(&mut self.surface, &place);
        tracing::info!(query, place = %place.display_name, at = %place.coordinate, "moved map to place");
        Ok(Some(place))
    }

    #[must_use]
    pub fn orchestrator(&self) -> &DiscoveryOrchestrator {
        &self.orchestrator
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerManager {
        &self.markers
    }

    #[must_use]
    pub fn filters(&self) -> &RadiusFilters {
        &self.filters
    }

    /// Discovery center, once known.
    #[must_use]
    pub fn center(&self) -> Option<Coordinate> {
        self.center
    }

    async fn locate_and_discover(&mut self) -> Option<DiscoveryReport> {
        let ResolvedLocation { coordinate, source } =
            resolve_location(&self.geolocator, self.geolocation_timeout).await;
        tracing::info!(center = %coordinate, ?source, "discovery center resolved");

        self.center = Some(coordinate);
        self.markers.set_user_location(&mut self.surface, coordinate);
        self.surface.fly_to(coordinate, LOCAL_ZOOM);
        self.run_cycle(coordinate).await
    }

    async fn run_cycle(&mut self, center: Coordinate) -> Option<DiscoveryReport> {
        match self.orchestrator.discover(center, &self.filters).await {
            Ok(Some(report)) => {
                self.markers.render_shelters(&mut self.surface, &report.results);
                Some(report)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "discovery cycle failed");
                self.markers.clear_shelters(&mut self.surface);
                None
            }
        }
    }
}
