//! Map surface abstraction.
//!
//! The discovery engine never talks to a concrete map widget. Hosts implement
//! [`MapSurface`] for whatever renders tiles and pins; [`RecordingMapSurface`]
//! keeps everything in memory and is what the CLI and the tests drive.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use shelterscan_core::Coordinate;

/// Zoom used when the map first mounts on the default center.
pub const INITIAL_ZOOM: f64 = 4.0;
/// Zoom used once a discovery center is known.
pub const LOCAL_ZOOM: f64 = 11.0;
/// Zoom used after a place search.
pub const PLACE_ZOOM: f64 = 12.0;

/// Which set a marker belongs to. Shelter re-renders only touch
/// [`MarkerLayer::Shelter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerLayer {
    Shelter,
    UserLocation,
    PlaceSearch,
}

impl MarkerLayer {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerLayer::Shelter => "shelter",
            MarkerLayer::UserLocation => "user-location",
            MarkerLayer::PlaceSearch => "place-search",
        }
    }
}

/// Opaque id issued by a surface for one rendered marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapControl {
    Navigation,
    Scale,
}

/// Everything a surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub coordinate: Coordinate,
    pub color: String,
    pub title: String,
    pub popup_html: Option<String>,
    pub layer: MarkerLayer,
}

pub trait MapSurface {
    fn initialize(&mut self, center: Coordinate, zoom: f64, tile_source: &str);

    fn add_controls(&mut self, controls: &[MapControl]);

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle;

    /// Removes a marker. Returns `false` if the handle was unknown.
    fn remove_marker(&mut self, handle: MarkerHandle) -> bool;

    fn fly_to(&mut self, center: Coordinate, zoom: f64);
}

/// In-memory [`MapSurface`].
#[derive(Debug, Default)]
pub struct RecordingMapSurface {
    tile_source: Option<String>,
    view: Option<(Coordinate, f64)>,
    controls: Vec<MapControl>,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    next_handle: u64,
    fly_count: usize,
}

impl RecordingMapSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.tile_source.is_some()
    }

    #[must_use]
    pub fn tile_source(&self) -> Option<&str> {
        self.tile_source.as_deref()
    }

    /// Current `(center, zoom)`.
    #[must_use]
    pub fn view(&self) -> Option<(Coordinate, f64)> {
        self.view
    }

    #[must_use]
    pub fn controls(&self) -> &[MapControl] {
        &self.controls
    }

    /// Number of `fly_to` calls since mount.
    #[must_use]
    pub fn fly_count(&self) -> usize {
        self.fly_count
    }

    #[must_use]
    pub fn marker(&self, handle: MarkerHandle) -> Option<&MarkerSpec> {
        self.markers.get(&handle)
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Live markers on `layer`, in creation order.
    pub fn markers_in(&self, layer: MarkerLayer) -> impl Iterator<Item = &MarkerSpec> {
        self.markers.values().filter(move |m| m.layer == layer)
    }

    /// Live markers as a GeoJSON `FeatureCollection`.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .markers
            .values()
            .map(|m| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.coordinate.longitude, m.coordinate.latitude],
                    },
                    "properties": {
                        "layer": m.layer.as_str(),
                        "title": m.title,
                        "color": m.color,
                    },
                })
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}

impl MapSurface for RecordingMapSurface {
    fn initialize(&mut self, center: Coordinate, zoom: f64, tile_source: &str) {
        self.tile_source = Some(tile_source.to_string());
        self.view = Some((center, zoom));
    }

    fn add_controls(&mut self, controls: &[MapControl]) {
        for control in controls {
            if !self.controls.contains(control) {
                self.controls.push(*control);
            }
        }
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(handle, spec);
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> bool {
        self.markers.remove(&handle).is_some()
    }

    fn fly_to(&mut self, center: Coordinate, zoom: f64) {
        self.view = Some((center, zoom));
        self.fly_count += 1;
    }
}
