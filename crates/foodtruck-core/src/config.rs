use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::filter::RadiusLimits;
use crate::geo::{BoundingBox, Coordinate};
use crate::ConfigError;

/// San Francisco mobile food facility permits (Socrata JSON export).
pub const DEFAULT_DATA_URL: &str = "https://data.sfgov.org/resource/rqzj-sfat.json";

pub const DEFAULT_GEOCODER_URL: &str = "https://api.mapbox.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parse `var` with `FromStr`, or return `default` when it is unset.
fn parse_or<T, F>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Pure parsing/validation, decoupled from the process environment so tests
/// can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("FOODTRUCK_ENV", "development"))?;
    let log_level = or_default("FOODTRUCK_LOG_LEVEL", env.default_log_level());

    let data_url = or_default("FOODTRUCK_DATA_URL", DEFAULT_DATA_URL);
    let data_limit = match lookup("FOODTRUCK_DATA_LIMIT") {
        Ok(_) => Some(parse_or(&lookup, "FOODTRUCK_DATA_LIMIT", 0u32)?),
        Err(_) => None,
    };
    let geocoder_url = or_default("FOODTRUCK_GEOCODER_URL", DEFAULT_GEOCODER_URL);
    let geocoder_token = lookup("FOODTRUCK_GEOCODER_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let sf = BoundingBox::san_francisco();
    let bounding_box = BoundingBox {
        min_lat: parse_or(&lookup, "FOODTRUCK_MIN_LAT", sf.min_lat)?,
        max_lat: parse_or(&lookup, "FOODTRUCK_MAX_LAT", sf.max_lat)?,
        min_lon: parse_or(&lookup, "FOODTRUCK_MIN_LON", sf.min_lon)?,
        max_lon: parse_or(&lookup, "FOODTRUCK_MAX_LON", sf.max_lon)?,
    };
    validate_bounding_box(&bounding_box)?;

    let map_center = Coordinate::new(
        parse_or(&lookup, "FOODTRUCK_CENTER_LAT", 37.7749)?,
        parse_or(&lookup, "FOODTRUCK_CENTER_LON", -122.4194)?,
    );
    if !map_center.is_finite() {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODTRUCK_CENTER_LAT".to_string(),
            reason: "map center must be finite".to_string(),
        });
    }

    let defaults = RadiusLimits::default();
    let radius = RadiusLimits {
        min_miles: parse_or(&lookup, "FOODTRUCK_RADIUS_MIN_MILES", defaults.min_miles)?,
        max_miles: parse_or(&lookup, "FOODTRUCK_RADIUS_MAX_MILES", defaults.max_miles)?,
        default_miles: parse_or(
            &lookup,
            "FOODTRUCK_RADIUS_DEFAULT_MILES",
            defaults.default_miles,
        )?,
    };
    validate_radius(&radius)?;

    let text_debounce_ms = parse_or(&lookup, "FOODTRUCK_TEXT_DEBOUNCE_MS", 0u64)?;
    let radius_debounce_ms = parse_or(&lookup, "FOODTRUCK_RADIUS_DEBOUNCE_MS", 500u64)?;

    let request_timeout_secs = parse_or(&lookup, "FOODTRUCK_REQUEST_TIMEOUT_SECS", 30u64)?;
    let user_agent = or_default("FOODTRUCK_USER_AGENT", "foodtruck/0.1 (vendor-search)");
    let max_retries = parse_or(&lookup, "FOODTRUCK_MAX_RETRIES", 3u32)?;
    let retry_backoff_base_secs = parse_or(&lookup, "FOODTRUCK_RETRY_BACKOFF_BASE_SECS", 2u64)?;

    Ok(AppConfig {
        env,
        log_level,
        data_url,
        data_limit,
        geocoder_url,
        geocoder_token,
        bounding_box,
        map_center,
        radius,
        text_debounce_ms,
        radius_debounce_ms,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FOODTRUCK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn validate_bounding_box(bbox: &BoundingBox) -> Result<(), ConfigError> {
    let finite = [bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon]
        .iter()
        .all(|v| v.is_finite());
    if !finite || bbox.min_lat >= bbox.max_lat {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODTRUCK_MIN_LAT".to_string(),
            reason: format!(
                "latitude range {}..{} is empty or not finite",
                bbox.min_lat, bbox.max_lat
            ),
        });
    }
    if bbox.min_lon >= bbox.max_lon {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODTRUCK_MIN_LON".to_string(),
            reason: format!(
                "longitude range {}..{} is empty",
                bbox.min_lon, bbox.max_lon
            ),
        });
    }
    Ok(())
}

fn validate_radius(radius: &RadiusLimits) -> Result<(), ConfigError> {
    let finite = [radius.min_miles, radius.max_miles, radius.default_miles]
        .iter()
        .all(|v| v.is_finite());
    if !finite || radius.min_miles <= 0.0 || radius.min_miles > radius.max_miles {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODTRUCK_RADIUS_MIN_MILES".to_string(),
            reason: format!(
                "radius range {}..{} must be positive and ordered",
                radius.min_miles, radius.max_miles
            ),
        });
    }
    if radius.default_miles < radius.min_miles || radius.default_miles > radius.max_miles {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOODTRUCK_RADIUS_DEFAULT_MILES".to_string(),
            reason: format!(
                "default {} is outside {}..{}",
                radius.default_miles, radius.min_miles, radius.max_miles
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
