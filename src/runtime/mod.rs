// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-session tasks that serialize every input onto one owner.

pub mod pin_view;
pub mod tour;

pub use pin_view::{PinViewDeps, PinViewHandle};
pub use tour::{TourDeps, TourHandle};
