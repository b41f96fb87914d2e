//! Shared domain types and configuration for shelterscan.

mod app_config;
mod config;
pub mod filters;
pub mod geo;
pub mod shelter;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::{load_filters, RadiusFilter, RadiusFilters, RadiusTier};
pub use geo::{distance_miles, Coordinate, DEFAULT_CENTER, EARTH_RADIUS_MILES};
pub use shelter::{placeholder, Shelter, ShelterWithDistance};

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read filters file {path}: {source}")]
    FiltersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse filters file: {0}")]
    FiltersFileParse(#[from] serde_yaml::Error),

    #[error("filters validation failed: {0}")]
    Validation(String),
}
