// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod engagement;
pub mod route;
pub mod waypoint;

pub use engagement::{Comment, LikeDeltaEvent, LikeDirection};
pub use route::{Route, RouteRequest, RouteStep, ShapeResolution, TransportProfile};
pub use waypoint::{Coordinate, LikeRecordId, PinId, UserId, Waypoint};
