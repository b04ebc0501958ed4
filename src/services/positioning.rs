// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Positioning seam and a replaying implementation.

use crate::models::Coordinate;
use futures_util::stream::{self, BoxStream, StreamExt};

/// Reports the device position whenever it moves at least `min_distance_meters`.
pub trait PositioningService: Send + Sync {
    fn start_updates(&self, min_distance_meters: f64) -> BoxStream<'static, Coordinate>;
}

/// Replays a fixed track.
#[derive(Debug, Clone, Default)]
pub struct ReplayPositioning {
    fixes: Vec<Coordinate>,
}

impl ReplayPositioning {
    pub fn new(fixes: Vec<Coordinate>) -> Self {
        Self { fixes }
    }
}

impl PositioningService for ReplayPositioning {
    fn start_updates(&self, min_distance_meters: f64) -> BoxStream<'static, Coordinate> {
        stream::iter(filter_min_distance(&self.fixes, min_distance_meters)).boxed()
    }
}

/// Drop fixes closer than `min_distance_meters` to the last emitted fix.
///
/// The first fix is always emitted.
pub fn filter_min_distance(fixes: &[Coordinate], min_distance_meters: f64) -> Vec<Coordinate> {
    let mut emitted: Vec<Coordinate> = Vec::with_capacity(fixes.len());
    for fix in fixes {
        match emitted.last() {
            Some(last) if last.distance_to(fix) < min_distance_meters => continue,
            _ => emitted.push(*fix),
        }
    }
    emitted
}
