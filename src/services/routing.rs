// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route request construction and the routing provider seam.

use crate::error::RoutingError;
use crate::models::{Coordinate, Route, RouteRequest, RouteStep, ShapeResolution, TransportProfile, Waypoint};
use async_trait::async_trait;
use geo::LineString;

/// Average walking speed used for offline duration estimates (m/s).
const WALKING_SPEED_MPS: f64 = 1.4;

/// Computes navigable paths between two coordinates.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn calculate_route(&self, request: &RouteRequest) -> Result<Route, RoutingError>;
}

/// Builds walking route requests toward the current waypoint of a tour.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRequestBuilder;

impl RouteRequestBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a request from the current fix to `waypoints[index]`.
    ///
    /// Returns `None` when there is no fix, when `index` is past the end of
    /// the list, or when the target waypoint has no coordinate.
    pub fn build_request(
        &self,
        current_position: Option<Coordinate>,
        waypoints: &[Waypoint],
        index: usize,
    ) -> Option<RouteRequest> {
        let origin = current_position?;
        let target = waypoints.get(index)?;
        let destination = target.coordinate?;

        Some(RouteRequest {
            origin,
            destination,
            destination_label: target.label.clone(),
            resolution: ShapeResolution::Full,
            include_steps: true,
            profile: TransportProfile::Walking,
        })
    }
}

/// Offline provider that routes in a straight line.
///
/// Used by the demo binary when no Mapbox token is configured.
#[derive(Debug, Clone, Default)]
pub struct StraightLineRouter;

#[async_trait]
impl RoutingProvider for StraightLineRouter {
    async fn calculate_route(&self, request: &RouteRequest) -> Result<Route, RoutingError> {
        let distance = request.origin.distance_to(&request.destination);
        let steps = if request.include_steps {
            vec![
                RouteStep {
                    instruction: format!("Head toward {}", request.destination_label),
                    distance_meters: distance,
                },
                RouteStep {
                    instruction: format!("You have arrived at {}", request.destination_label),
                    distance_meters: 0.0,
                },
            ]
        } else {
            Vec::new()
        };

        Ok(Route {
            geometry: LineString::from(vec![request.origin.to_point(), request.destination.to_point()]),
            distance_meters: distance,
            duration_seconds: distance / WALKING_SPEED_MPS,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tour() -> Vec<Waypoint> {
        vec![
            Waypoint::new("a", Some(Coordinate::new(37.0, -122.0)), "owner").with_label("Fountain"),
            Waypoint::new("b", None, "owner"),
        ]
    }

    #[test]
    fn test_build_request_happy_path() {
        let here = Coordinate::new(37.1, -122.1);
        let request = RouteRequestBuilder::default()
            .build_request(Some(here), &tour(), 0)
            .expect("request expected");

        assert_eq!(request.origin, here);
        assert_eq!(request.destination, Coordinate::new(37.0, -122.0));
        assert_eq!(request.destination_label, "Fountain");
        assert_eq!(request.profile, TransportProfile::Walking);
        assert_eq!(request.resolution, ShapeResolution::Full);
        assert!(request.include_steps);
    }

    #[test]
    fn test_build_request_none_without_fix() {
        assert!(RouteRequestBuilder::default().build_request(None, &tour(), 0).is_none());
    }

    #[test]
    fn test_build_request_none_past_end() {
        let here = Some(Coordinate::new(37.1, -122.1));
        let builder = RouteRequestBuilder::default();
        assert!(builder.build_request(here, &tour(), 2).is_none());
        assert!(builder.build_request(here, &tour(), 99).is_none());
        assert!(builder.build_request(here, &[], 0).is_none());
    }

    #[test]
    fn test_build_request_none_without_coordinate() {
        let here = Some(Coordinate::new(37.1, -122.1));
        assert!(RouteRequestBuilder::default().build_request(here, &tour(), 1).is_none());
    }

    #[tokio::test]
    async fn test_straight_line_router() {
        let request = RouteRequestBuilder::default()
            .build_request(Some(Coordinate::new(37.01, -122.0)), &tour(), 0)
            .unwrap();
        let route = StraightLineRouter.calculate_route(&request).await.unwrap();

        assert_eq!(route.geometry.0.len(), 2);
        assert_eq!(route.destination(), Some(Coordinate::new(37.0, -122.0)));
        assert!(route.distance_meters > 1000.0);
        assert_eq!(route.steps.len(), 2);
    }
}
