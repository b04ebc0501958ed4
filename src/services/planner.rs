// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scavenger-hunt planning: pick the tour's pins around the walker.

use crate::error::{Result, TourError};
use crate::models::{Coordinate, Waypoint};
use crate::services::directory::{HuntQuery, PinDirectory};

/// Search the directory for a hunt's pins around `origin`.
///
/// The returned order (nearest first) is the visit order.
pub async fn plan_hunt(
    directory: &dyn PinDirectory,
    query: &HuntQuery,
    origin: Coordinate,
) -> Result<Vec<Waypoint>> {
    let pins = directory.search_pins(query, origin).await?;

    if pins.is_empty() {
        tracing::warn!(
            tags = ?query.tags,
            radius_m = query.radius_meters,
            "No pins match the hunt around the current location"
        );
        return Err(TourError::InvalidInput(format!(
            "no pins match tags {:?} within {} m",
            query.tags, query.radius_meters
        )));
    }

    tracing::info!(count = pins.len(), "Hunt planned");
    Ok(pins)
}
