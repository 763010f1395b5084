//! Domain core for the food truck finder: vendor validation, great-circle
//! distance, text/radius filtering, and application configuration.

pub mod app_config;
pub mod config;
pub mod filter;
pub mod geo;
pub mod provider;
pub mod vendor;
pub mod working_set;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{
    apply_filters, sort_by_distance, text_matches, RadiusFilter, RadiusLimits, SearchQuery,
};
pub use geo::{distance_miles, BoundingBox, Coordinate};
pub use provider::{Geocoder, VendorSource};
pub use vendor::{is_valid_record, RawVendorRecord, Vendor};
pub use working_set::{ValidationReport, WorkingSet};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
