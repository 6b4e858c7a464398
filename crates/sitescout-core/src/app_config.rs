use std::path::PathBuf;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What the map does with the active marker when a new result set no longer
/// contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleSelection {
    /// Drop the selection, its detail payload and any in-flight detail fetch.
    #[default]
    Clear,
    /// Keep the dangling id; no marker is drawn for it.
    Retain,
}

impl std::fmt::Display for StaleSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaleSelection::Clear => write!(f, "clear"),
            StaleSelection::Retain => write!(f, "retain"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub env: Environment,
    pub log_level: String,
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub default_center: GeoPoint,
    pub map_zoom: u8,
    pub map_min_zoom: u8,
    pub map_max_zoom: u8,
    pub stale_selection: StaleSelection,
}
