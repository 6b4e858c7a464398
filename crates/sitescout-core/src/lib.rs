mod app_config;
mod config;
mod geo;
mod identity;
mod sites;

pub use app_config::{AppConfig, Environment, StaleSelection};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{Bounds, GeoPoint};
pub use identity::Identity;
pub use sites::{SearchResultSet, SiteDetail, SiteSummary};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
