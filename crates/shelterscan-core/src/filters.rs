//! Radius filters and the distance tiers derived from them.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Marker color for shelters outside every band.
pub const DEFAULT_TIER_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusFilter {
    pub label: String,
    pub miles: f64,
    /// Display-only color tag.
    pub color: String,
    pub active: bool,
}

impl RadiusFilter {
    #[must_use]
    pub fn new(label: &str, miles: f64, color: &str, active: bool) -> Self {
        Self {
            label: label.to_string(),
            miles,
            color: color.to_string(),
            active,
        }
    }

    #[must_use]
    pub fn contains(&self, distance: f64) -> bool {
        distance <= self.miles
    }
}

/// The band a shelter's distance falls into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusTier {
    pub label: String,
    pub miles: f64,
    pub color: String,
}

impl From<&RadiusFilter> for RadiusTier {
    fn from(filter: &RadiusFilter) -> Self {
        Self {
            label: filter.label.clone(),
            miles: filter.miles,
            color: filter.color.clone(),
        }
    }
}

/// Ordered collection of radius filters, smallest radius first.
///
/// Filters are independent toggles: a distance is retained when it lies
/// within ANY active filter, so the effective boundary is the largest active
/// radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RadiusFilters(Vec<RadiusFilter>);

impl Default for RadiusFilters {
    fn default() -> Self {
        Self(vec![
            RadiusFilter::new("5 miles", 5.0, "#16a34a", true),
            RadiusFilter::new("10 miles", 10.0, "#2563eb", true),
            RadiusFilter::new("25 miles", 25.0, "#f59e0b", true),
            RadiusFilter::new("50 miles", 50.0, "#dc2626", true),
        ])
    }
}

impl RadiusFilters {
    /// Builds a validated collection, sorted by ascending radius.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the list is empty, a radius is
    /// not a positive finite number, or labels repeat.
    pub fn new(mut filters: Vec<RadiusFilter>) -> Result<Self, ConfigError> {
        validate_filters(&filters)?;
        filters.sort_by(|a, b| a.miles.total_cmp(&b.miles));
        Ok(Self(filters))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RadiusFilter> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RadiusFilter> {
        self.0.get(index)
    }

    /// Flips the `active` flag of the filter at `index` and returns the new
    /// value, or `None` if the index is out of bounds.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let filter = self.0.get_mut(index)?;
        filter.active = !filter.active;
        Some(filter.active)
    }

    /// Sets the `active` flag of the filter labelled `label`.
    /// Returns `false` when no filter has that label.
    pub fn set_active(&mut self, label: &str, active: bool) -> bool {
        match self.0.iter_mut().find(|f| f.label == label) {
            Some(filter) => {
                filter.active = active;
                true
            }
            None => false,
        }
    }

    /// Activates exactly the filters whose radius appears in `miles`.
    pub fn activate_only(&mut self, miles: &[f64]) {
        for filter in &mut self.0 {
            filter.active = miles.iter().any(|m| (m - filter.miles).abs() < f64::EPSILON);
        }
    }

    /// Largest radius among active filters; `None` when none is active.
    #[must_use]
    pub fn max_active_radius(&self) -> Option<f64> {
        self.0
            .iter()
            .filter(|f| f.active)
            .map(|f| f.miles)
            .reduce(f64::max)
    }

    /// `true` if `distance` lies within at least one active filter.
    #[must_use]
    pub fn retains(&self, distance: f64) -> bool {
        self.0.iter().any(|f| f.active && f.contains(distance))
    }

    /// Smallest band containing `distance`, regardless of its active flag.
    #[must_use]
    pub fn tier_for(&self, distance: f64) -> Option<RadiusTier> {
        self.0
            .iter()
            .find(|f| f.contains(distance))
            .map(RadiusTier::from)
    }
}

#[derive(Debug, Deserialize)]
struct FiltersFile {
    filters: Vec<RadiusFilter>,
}

/// Load and validate radius filters from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_filters(path: &Path) -> Result<RadiusFilters, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FiltersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_filters(&content)
}

fn parse_filters(content: &str) -> Result<RadiusFilters, ConfigError> {
    let file: FiltersFile = serde_yaml::from_str(content)?;
    RadiusFilters::new(file.filters)
}

fn validate_filters(filters: &[RadiusFilter]) -> Result<(), ConfigError> {
    if filters.is_empty() {
        return Err(ConfigError::Validation(
            "at least one radius filter is required".to_string(),
        ));
    }

    let mut seen_labels = HashSet::new();
    for filter in filters {
        if filter.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "filter label must be non-empty".to_string(),
            ));
        }
        if !filter.miles.is_finite() || filter.miles <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "filter '{}' has invalid radius {}; must be a positive number of miles",
                filter.label, filter.miles
            )));
        }
        if !seen_labels.insert(filter.label.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate filter label: '{}'",
                filter.label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "filters_test.rs"]
mod tests;
