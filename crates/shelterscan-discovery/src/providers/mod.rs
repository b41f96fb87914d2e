//! Third-party POI providers.
//!
//! Both discovery providers return [`RawCandidate`]s: the untouched provider
//! JSON plus a provider-qualified id. Shape differences between providers are
//! resolved later by [`crate::normalize`].

mod geocode;
mod graph_query;
mod text_search;

pub use geocode::{PlaceMatch, PlaceSearchClient};
pub use graph_query::{build_overpass_query, GraphQueryClient};
pub use text_search::{
    TextSearchClient, SHELTER_AMENITY, SHELTER_NAME_KEYWORDS, SYNONYM_TERMS, VETERINARY_AMENITY,
};

use serde_json::Value;
use shelterscan_core::Coordinate;

const MILES_PER_LAT_DEGREE: f64 = 69.0;

/// Which provider produced a raw record. Controls id prefixing and which
/// field layout the normalizer expects first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderTag {
    /// Nominatim-style text/tag search (`/search`).
    TextSearch,
    /// Overpass-style graph query (`/api/interpreter`).
    GraphQuery,
}

impl ProviderTag {
    #[must_use]
    pub fn id_prefix(self) -> &'static str {
        match self {
            ProviderTag::TextSearch => "nominatim",
            ProviderTag::GraphQuery => "overpass",
        }
    }

    /// Builds the provider-qualified id for `record`.
    ///
    /// Prefers the provider's own identifiers and falls back to the record's
    /// raw coordinate text so the id is still stable for a given record.
    #[must_use]
    pub fn candidate_id(self, record: &Value) -> String {
        let prefix = self.id_prefix();
        let native = match self {
            ProviderTag::TextSearch => record
                .get("place_id")
                .and_then(value_as_id)
                .or_else(|| {
                    let kind = record.get("osm_type").and_then(Value::as_str)?;
                    let id = record.get("osm_id").and_then(value_as_id)?;
                    Some(format!("{kind}-{id}"))
                }),
            ProviderTag::GraphQuery => {
                let kind = record.get("type").and_then(Value::as_str).unwrap_or("element");
                record
                    .get("id")
                    .and_then(value_as_id)
                    .map(|id| format!("{kind}-{id}"))
            }
        };

        let local = native.unwrap_or_else(|| {
            let lat = record.get("lat").map_or_else(String::new, raw_text);
            let lon = record.get("lon").map_or_else(String::new, raw_text);
            format!("at-{lat}-{lon}")
        });
        let local: String = local.split_whitespace().collect();
        format!("{prefix}-{local}")
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderTag::TextSearch => write!(f, "text-search"),
            ProviderTag::GraphQuery => write!(f, "graph-query"),
        }
    }
}

/// One unnormalized record from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub id: String,
    pub provider: ProviderTag,
    pub record: Value,
}

impl RawCandidate {
    #[must_use]
    pub fn new(provider: ProviderTag, record: Value) -> Self {
        Self {
            id: provider.candidate_id(&record),
            provider,
            record,
        }
    }

    /// Best available name text, used for keyword filtering before
    /// normalization. Only the leading segment of `display_name` counts; the
    /// rest of that label is street, city and state.
    #[must_use]
    pub fn name_hint(&self) -> Option<&str> {
        ["/namedetails/name", "/tags/name", "/name"]
            .iter()
            .filter_map(|ptr| self.record.pointer(ptr).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .or_else(|| {
                self.record
                    .get("display_name")
                    .and_then(Value::as_str)
                    .and_then(|label| label.split(',').next())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
    }

    /// `true` if the name contains any of `keywords`, ignoring case.
    #[must_use]
    pub fn name_matches_any(&self, keywords: &[&str]) -> bool {
        self.name_hint().is_some_and(|name| {
            let lowered = name.to_lowercase();
            keywords.iter().any(|k| lowered.contains(&k.to_lowercase()))
        })
    }
}

/// Axis-aligned search box around a center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Box that encloses the circle of `radius_miles` around `center`,
    /// clamped to valid coordinate ranges.
    ///
    /// A viewbox cannot wrap, so a circle that crosses the antimeridian gets
    /// the full longitude range. Candidates outside the radius are dropped
    /// later during normalization.
    #[must_use]
    pub fn around(center: Coordinate, radius_miles: f64) -> Self {
        let lat_delta = radius_miles / MILES_PER_LAT_DEGREE;
        // Near the poles cos(lat) approaches zero; cap at a full hemisphere.
        let cos_lat = center.latitude.to_radians().cos().abs().max(1e-6);
        let lon_delta = (radius_miles / (MILES_PER_LAT_DEGREE * cos_lat)).min(180.0);
        let west = center.longitude - lon_delta;
        let east = center.longitude + lon_delta;
        let (min_lon, max_lon) = if west < -180.0 || east > 180.0 {
            (-180.0, 180.0)
        } else {
            (west, east)
        };
        Self {
            min_lon,
            min_lat: (center.latitude - lat_delta).max(-90.0),
            max_lon,
            max_lat: (center.latitude + lat_delta).min(90.0),
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lon..=self.max_lon).contains(&point.longitude)
            && (self.min_lat..=self.max_lat).contains(&point.latitude)
    }

    /// Nominatim `viewbox` value: `left,top,right,bottom`.
    #[must_use]
    pub fn to_viewbox(&self) -> String {
        format!(
            "{:.6},{:.6},{:.6},{:.6}",
            self.min_lon, self.max_lat, self.max_lon, self.min_lat
        )
    }
}

/// Reads a JSON number or numeric string as `f64`.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
