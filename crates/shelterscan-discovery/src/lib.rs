//! Shelter discovery: provider clients, normalization, deduplication,
//! fallback data, the discovery cycle and its map-facing controller.

pub mod controller;
pub mod dedup;
pub mod error;
pub mod fallback;
mod fetch;
pub mod geolocation;
pub mod map;
pub mod markers;
pub mod normalize;
pub mod orchestrator;
pub mod providers;
pub mod rate_limit;

pub use controller::{InteractionController, DEFAULT_TILE_SOURCE};
pub use dedup::{deduplicate, location_key};
pub use error::{DiscoveryError, GeolocationError};
pub use fallback::{generate_fallback, generate_fallback_with, FALLBACK_ID_PREFIX};
pub use fetch::build_http_client;
pub use geolocation::{
    resolve_location, DeniedGeolocator, FixedGeolocator, Geolocator, IpGeolocator,
    LocationSource, ResolvedLocation,
};
pub use map::{MapControl, MapSurface, MarkerHandle, MarkerLayer, MarkerSpec, RecordingMapSurface};
pub use markers::MarkerManager;
pub use normalize::normalize;
pub use orchestrator::{
    classify, DiscoveryOrchestrator, DiscoveryPhase, DiscoveryReport, DiscoverySnapshot,
};
pub use providers::{
    GraphQueryClient, PlaceMatch, PlaceSearchClient, ProviderTag, RawCandidate, TextSearchClient,
};
pub use rate_limit::RateLimitedQueue;
