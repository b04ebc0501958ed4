// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waypoint (pin) model, coordinates, and identifiers.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a user (tour walker, pin owner, like actor).
    UserId
);
string_id!(
    /// Identifier of a pin in the directory.
    PinId
);
string_id!(
    /// Identifier of a stored like record, needed to undo a like.
    LikeRecordId
);

/// WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Convert to a `geo` point (x = longitude, y = latitude).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        Haversine.distance(self.to_point(), other.to_point())
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// A geo-located point of interest visited as part of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: PinId,
    /// Location; a pin without one cannot be routed to
    pub coordinate: Option<Coordinate>,
    /// Display label (the pin's blurb)
    pub label: String,
    /// Set once, on arrival, when the visitor is not the owner
    #[serde(default)]
    pub visited: bool,
    /// Creator of the pin
    pub owner: UserId,
    /// Tags used for hunt searches
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Waypoint {
    pub fn new(id: impl Into<PinId>, coordinate: Option<Coordinate>, owner: impl Into<UserId>) -> Self {
        let id = id.into();
        Self {
            label: id.to_string(),
            id,
            coordinate,
            visited: false,
            owner: owner.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}
