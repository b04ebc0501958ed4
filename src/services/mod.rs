// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - state machines, collaborator seams, and adapters.

pub mod comments;
pub mod directory;
pub mod engagement;
pub mod mapbox;
pub mod planner;
pub mod positioning;
pub mod presentation;
pub mod reconciliation;
pub mod routing;
pub mod tour;
pub mod tour_file;

pub use comments::{should_refresh, CommentSet};
pub use directory::{HuntQuery, InMemoryDirectory, LikeSubscription, PinDirectory};
pub use engagement::{EngagementCounter, FlushOutcome, LikeAction, PendingIntent};
pub use mapbox::MapboxDirections;
pub use planner::plan_hunt;
pub use positioning::{PositioningService, ReplayPositioning};
pub use presentation::{ChannelSink, LoggingSink, PresentationEvent, PresentationSink};
pub use reconciliation::ReconciliationScheduler;
pub use routing::{RouteRequestBuilder, RoutingProvider, StraightLineRouter};
pub use tour::{ArrivalOutcome, CompletionReason, RouteTicket, TourPhase, TourSession, TourSummary};
pub use tour_file::{load_tour_from_file, load_tour_from_json, TourFileError};
