use crate::app_config::{AppConfig, Environment, StaleSelection};
use crate::geo::GeoPoint;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u8 = |var: &str, default: &str| -> Result<u8, ConfigError> {
        or_default(var, default)
            .parse::<u8>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base_url = require("SITESCOUT_API_BASE_URL")?;

    let env = parse_environment(&or_default("SITESCOUT_ENV", "development"))?;
    let log_level = or_default("SITESCOUT_LOG_LEVEL", "info");
    let session_path = PathBuf::from(or_default(
        "SITESCOUT_SESSION_PATH",
        "./.sitescout/session.json",
    ));

    let request_timeout_secs = parse_u64("SITESCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SITESCOUT_USER_AGENT", "sitescout/0.1 (site-explorer)");
    let max_retries = parse_u32("SITESCOUT_MAX_RETRIES", "0")?;
    let retry_backoff_base_ms = parse_u64("SITESCOUT_RETRY_BACKOFF_BASE_MS", "500")?;

    let lat = parse_f64("SITESCOUT_DEFAULT_LAT", "52.3676")?;
    let lng = parse_f64("SITESCOUT_DEFAULT_LNG", "4.9041")?;
    let default_center = GeoPoint::new(lat, lng).map_err(|e| {
        let var = if matches!(e, crate::CoreError::InvalidLatitude(_)) {
            "SITESCOUT_DEFAULT_LAT"
        } else {
            "SITESCOUT_DEFAULT_LNG"
        };
        invalid(var, e.to_string())
    })?;

    let map_zoom = parse_u8("SITESCOUT_MAP_ZOOM", "15")?;
    let map_min_zoom = parse_u8("SITESCOUT_MAP_MIN_ZOOM", "11")?;
    let map_max_zoom = parse_u8("SITESCOUT_MAP_MAX_ZOOM", "15")?;
    if map_min_zoom > map_max_zoom {
        return Err(invalid(
            "SITESCOUT_MAP_MIN_ZOOM",
            format!("min zoom {map_min_zoom} exceeds max zoom {map_max_zoom}"),
        ));
    }
    if !(map_min_zoom..=map_max_zoom).contains(&map_zoom) {
        return Err(invalid(
            "SITESCOUT_MAP_ZOOM",
            format!("zoom {map_zoom} is outside [{map_min_zoom}, {map_max_zoom}]"),
        ));
    }

    let stale_selection = parse_stale_selection(&or_default("SITESCOUT_STALE_SELECTION", "clear"))?;

    Ok(AppConfig {
        api_base_url,
        env,
        log_level,
        session_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        default_center,
        map_zoom,
        map_min_zoom,
        map_max_zoom,
        stale_selection,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SITESCOUT_ENV".to_string(),
            reason: format!("expected development, test or production, got \"{other}\""),
        }),
    }
}

fn parse_stale_selection(s: &str) -> Result<StaleSelection, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "clear" => Ok(StaleSelection::Clear),
        "retain" => Ok(StaleSelection::Retain),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SITESCOUT_STALE_SELECTION".to_string(),
            reason: format!("expected clear or retain, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
