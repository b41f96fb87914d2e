//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Mean Earth radius used for every distance in the crate.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Geographic center of the contiguous US. Used when the device location is
/// unavailable.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new_unchecked(-98.579_5, 39.828_3);

/// A `(longitude, latitude)` pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting values outside the valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LongitudeOutOfRange`] or
    /// [`CoreError::LatitudeOutOfRange`] for out-of-range or non-finite input.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoreError> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Builds a coordinate without range checks. Intended for constants.
    #[must_use]
    pub const fn new_unchecked(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Convenience constructor taking the conventional `lat, lon` order.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinate::new`].
    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        Self::new(longitude, latitude)
    }

    /// Great-circle distance to `other` in miles.
    #[must_use]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_miles(*self, *other)
    }

    /// Point reached by travelling `distance_miles` from `self` along the
    /// initial `bearing_deg` (clockwise from north) on a sphere.
    #[must_use]
    pub fn destination(&self, bearing_deg: f64, distance_miles: f64) -> Coordinate {
        let angular = distance_miles / EARTH_RADIUS_MILES;
        let bearing = bearing_deg.to_radians();
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        // Normalize longitude back into [-180, 180].
        let lon2 = (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
        Coordinate::new_unchecked(lon2, lat2.to_degrees())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Haversine distance between two coordinates in miles.
#[must_use]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards asin against h drifting a hair above 1.0 for antipodes.
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
#[path = "geo_test.rs"]
mod tests;
