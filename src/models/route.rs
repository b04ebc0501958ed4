// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route request and route result models.

use super::Coordinate;
use geo::LineString;
use serde::{Deserialize, Serialize};

/// Transport profile passed to the routing provider. Tours are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportProfile {
    #[default]
    Walking,
}

impl TransportProfile {
    /// Profile segment used in directions URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportProfile::Walking => "walking",
        }
    }
}

/// How much of the route geometry the provider should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeResolution {
    /// Full-resolution path
    #[default]
    Full,
}

impl ShapeResolution {
    /// Value of the directions `overview` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeResolution::Full => "full",
        }
    }
}

/// Two-point routing request (current position to next waypoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    /// Label shown for the destination
    pub destination_label: String,
    pub resolution: ShapeResolution,
    /// Whether turn-by-turn steps are requested
    pub include_steps: bool,
    pub profile: TransportProfile,
}

/// A single turn-by-turn instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance_meters: f64,
}

/// Navigable path returned by a routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Path geometry (x = longitude, y = latitude)
    pub geometry: LineString<f64>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// Encode the geometry as a precision-5 polyline.
    pub fn encoded_polyline(&self) -> Result<String, String> {
        polyline::encode_coordinates(self.geometry.0.iter().copied(), 5).map_err(|e| e.to_string())
    }

    /// Last point of the geometry, if any.
    pub fn destination(&self) -> Option<Coordinate> {
        self.geometry.0.last().copied().map(Coordinate::from)
    }

    /// Route geometry as coordinates in travel order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.geometry.0.iter().copied().map(Coordinate::from).collect()
    }
}
