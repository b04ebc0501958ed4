// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapbox Directions API client.
//!
//! Handles:
//! - Two-point walking directions with full-resolution geometry
//! - Turn-by-turn steps
//! - Polyline geometry decoding
//! - "NoRoute" detection

use crate::error::RoutingError;
use crate::models::{Route, RouteRequest, RouteStep};
use crate::services::routing::RoutingProvider;
use async_trait::async_trait;
use serde::Deserialize;

/// Mapbox Directions client.
#[derive(Clone)]
pub struct MapboxDirections {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MapboxDirections {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Directions URL (without query string) for a request.
    fn directions_url(&self, request: &RouteRequest) -> String {
        format!(
            "{}/directions/v5/mapbox/{}/{},{};{},{}",
            self.base_url,
            request.profile.as_str(),
            request.origin.longitude,
            request.origin.latitude,
            request.destination.longitude,
            request.destination.latitude,
        )
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json(
        &self,
        response: reqwest::Response,
    ) -> Result<DirectionsResponse, RoutingError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Mapbox rate limit hit (429)");
            }

            return Err(RoutingError::Provider(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| RoutingError::InvalidResponse(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl RoutingProvider for MapboxDirections {
    async fn calculate_route(&self, request: &RouteRequest) -> Result<Route, RoutingError> {
        let response = self
            .http
            .get(self.directions_url(request))
            .query(&[
                ("geometries", "polyline"),
                ("overview", request.resolution.as_str()),
                ("steps", if request.include_steps { "true" } else { "false" }),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RoutingError::Provider(e.to_string()))?;

        let body = self.check_response_json(response).await?;
        route_from_response(body)
    }
}

/// Convert a directions response into the first route it contains.
fn route_from_response(response: DirectionsResponse) -> Result<Route, RoutingError> {
    if response.code == "NoRoute" || response.code == "NoSegment" {
        return Err(RoutingError::NoRoute);
    }
    if response.code != "Ok" {
        return Err(RoutingError::Provider(
            response.message.unwrap_or(response.code),
        ));
    }

    let route = response.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;
    let geometry = polyline::decode_polyline(&route.geometry, 5)
        .map_err(|e| RoutingError::InvalidResponse(format!("Failed to decode polyline: {}", e)))?;

    let steps = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| RouteStep {
            instruction: step.maneuver.instruction,
            distance_meters: step.distance,
        })
        .collect();

    Ok(Route {
        geometry,
        distance_meters: route.distance,
        duration_seconds: route.duration,
        steps,
    })
}

/// Directions API response body.
#[derive(Debug, Clone, Deserialize)]
struct DirectionsResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Clone, Deserialize)]
struct DirectionsRoute {
    geometry: String,
    distance: f64,
    duration: f64,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Clone, Deserialize)]
struct DirectionsLeg {
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Debug, Clone, Deserialize)]
struct DirectionsStep {
    distance: f64,
    maneuver: Maneuver,
}

#[derive(Debug, Clone, Deserialize)]
struct Maneuver {
    #[serde(default)]
    instruction: String,
}
