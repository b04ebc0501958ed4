// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tour loading from GeoJSON.
//!
//! A tour file is a FeatureCollection of Point features, in visit order.
//! Recognised properties: `id`, `label`, `owner`, `visited`, `tags`.

use crate::models::{Coordinate, PinId, UserId, Waypoint};
use geo::Point;
use geojson::{feature::Id, GeoJson};
use std::fs;
use std::path::Path;

/// Load waypoints from a GeoJSON file.
pub fn load_tour_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Waypoint>, TourFileError> {
    let json_data =
        fs::read_to_string(path.as_ref()).map_err(|e| TourFileError::IoError(e.to_string()))?;
    load_tour_from_json(&json_data)
}

/// Load waypoints from a GeoJSON string.
pub fn load_tour_from_json(json_data: &str) -> Result<Vec<Waypoint>, TourFileError> {
    let geojson: GeoJson = json_data
        .parse()
        .map_err(|e: geojson::Error| TourFileError::ParseError(e.to_string()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(TourFileError::NotACollection);
    };

    let mut waypoints = Vec::with_capacity(collection.features.len());
    for (position, feature) in collection.features.into_iter().enumerate() {
        let id = feature
            .property("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| match &feature.id {
                Some(Id::String(s)) => Some(s.clone()),
                Some(Id::Number(n)) => Some(n.to_string()),
                None => None,
            })
            .ok_or(TourFileError::MissingId(position))?;

        let label = feature
            .property("label")
            .and_then(|v| v.as_str())
            .unwrap_or(id.as_str())
            .to_string();

        let owner = feature
            .property("owner")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let visited = feature
            .property("visited")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let tags = feature
            .property("tags")
            .and_then(|v| v.as_array())
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        // A feature without geometry is kept; it just cannot be routed to
        let coordinate = match feature.geometry {
            Some(geom) => Some(convert_geometry(geom.value)?),
            None => None,
        };

        waypoints.push(Waypoint {
            id: PinId::from(id),
            coordinate,
            label,
            visited,
            owner: UserId::from(owner),
            tags,
        });
    }

    tracing::info!(count = waypoints.len(), "Loaded tour waypoints");
    Ok(waypoints)
}

/// Convert GeoJSON geometry to a coordinate.
fn convert_geometry(value: geojson::Value) -> Result<Coordinate, TourFileError> {
    let point: Result<Point<f64>, _> = value.try_into();
    point
        .map(Coordinate::from)
        .map_err(|_| TourFileError::UnsupportedGeometry)
}

/// Errors from tour file loading.
#[derive(Debug, thiserror::Error)]
pub enum TourFileError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Tour file must be a FeatureCollection")]
    NotACollection,

    #[error("Feature {0} has no id")]
    MissingId(usize),

    #[error("Unsupported geometry type (expected Point)")]
    UnsupportedGeometry,
}
