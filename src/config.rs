// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::models::{Coordinate, UserId};
use std::env;
use std::path::PathBuf;

/// Default positioning distance filter (meters).
pub const DEFAULT_MIN_DISTANCE_METERS: f64 = 200.0;

pub const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity of the user walking the tour
    pub user_id: UserId,
    /// Minimum distance between reported position fixes
    pub min_distance_meters: f64,
    /// GeoJSON tour definition
    pub tour_file: PathBuf,
    /// Mapbox token; the offline router is used when absent
    pub mapbox_access_token: Option<String>,
    pub mapbox_base_url: String,
    /// Fallback starting point for the demo walker
    pub default_location: Coordinate,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            user_id: UserId::from("test_user"),
            min_distance_meters: DEFAULT_MIN_DISTANCE_METERS,
            tour_file: PathBuf::from("data/tour.geojson"),
            mapbox_access_token: None,
            mapbox_base_url: DEFAULT_MAPBOX_BASE_URL.to_string(),
            default_location: Coordinate::new(37.787353, -122.421561),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            user_id: env::var("PINTOUR_USER_ID")
                .map(|v| UserId::from(v.trim()))
                .map_err(|_| ConfigError::Missing("PINTOUR_USER_ID"))?,
            min_distance_meters: parse_or("PINTOUR_MIN_DISTANCE_METERS", defaults.min_distance_meters)?,
            tour_file: env::var("PINTOUR_TOUR_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.tour_file),
            mapbox_access_token: env::var("MAPBOX_ACCESS_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            mapbox_base_url: env::var("MAPBOX_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MAPBOX_BASE_URL.to_string()),
            default_location: Coordinate::new(
                parse_or("PINTOUR_DEFAULT_LAT", defaults.default_location.latitude)?,
                parse_or("PINTOUR_DEFAULT_LON", defaults.default_location.longitude)?,
            ),
        })
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
