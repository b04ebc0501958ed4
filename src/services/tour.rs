// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tour sequencing state machine.
//!
//! A session walks a user through an ordered list of waypoints:
//! 1. Wait for a position fix and request a route to the current waypoint
//! 2. Wait for the routing provider's "arrived" trigger
//! 3. Mark the waypoint visited and advance the index by exactly one
//! 4. Route to the next waypoint, or complete the tour
//!
//! The session itself is synchronous and owns no I/O; the tour runtime
//! feeds it events one at a time and executes the effects it returns.

use crate::error::{Result, RoutingError, TourError};
use crate::models::{Coordinate, Route, RouteRequest, UserId, Waypoint};
use crate::services::routing::RouteRequestBuilder;
use serde::Serialize;

/// Lifecycle phase of a tour session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "reason")]
pub enum TourPhase {
    Idle,
    RoutingToNext,
    AwaitingArrival,
    Arrived,
    Completed(CompletionReason),
}

impl TourPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TourPhase::Idle => "idle",
            TourPhase::RoutingToNext => "routing_to_next",
            TourPhase::AwaitingArrival => "awaiting_arrival",
            TourPhase::Arrived => "arrived",
            TourPhase::Completed(_) => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TourPhase::Completed(_))
    }
}

/// Why a tour reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Every waypoint was reached
    Finished,
    /// The user ended the tour early
    Ended,
    /// The tour was torn down without user action
    Cancelled,
}

impl CompletionReason {
    pub fn is_cancellation(&self) -> bool {
        !matches!(self, CompletionReason::Finished)
    }
}

/// Tag identifying one route calculation. Only the newest ticket is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RouteTicket(u64);

/// Result of processing an arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalOutcome {
    /// Waypoint that was just reached
    pub arrived: Waypoint,
    /// Whether the visited flag was flipped (false for the owner's own pins)
    pub marked_visited: bool,
    /// Waypoint the tour heads to next, if any
    pub next: Option<Waypoint>,
    pub has_next: bool,
    /// Index after the increment
    pub index: usize,
    pub completed: bool,
}

/// Snapshot of a session, reported when the tour task exits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourSummary {
    pub phase: TourPhase,
    pub index: usize,
    pub total: usize,
    pub visited: usize,
}

/// Waypoint-sequencing state machine for one user.
#[derive(Debug)]
pub struct TourSession {
    user: UserId,
    builder: RouteRequestBuilder,
    waypoints: Vec<Waypoint>,
    index: usize,
    phase: TourPhase,
    last_fix: Option<Coordinate>,
    next_ticket: u64,
    in_flight: Option<RouteTicket>,
    /// A route to the current waypoint has been delivered
    route_active: bool,
}

impl TourSession {
    pub fn new(user: UserId, builder: RouteRequestBuilder) -> Self {
        Self {
            user,
            builder,
            waypoints: Vec::new(),
            index: 0,
            phase: TourPhase::Idle,
            last_fix: None,
            next_ticket: 0,
            in_flight: None,
            route_active: false,
        }
    }

    /// Begin the tour at `start_index`.
    pub fn start(&mut self, waypoints: Vec<Waypoint>, start_index: usize) -> Result<()> {
        if self.phase != TourPhase::Idle {
            return Err(self.invalid("start"));
        }
        if waypoints.is_empty() {
            return Err(TourError::InvalidInput("tour has no waypoints".to_string()));
        }
        if start_index >= waypoints.len() {
            return Err(TourError::InvalidInput(format!(
                "start index {} out of range for {} waypoints",
                start_index,
                waypoints.len()
            )));
        }

        self.waypoints = waypoints;
        self.index = start_index;
        self.transition(TourPhase::RoutingToNext);
        tracing::info!(
            user = %self.user,
            waypoints = self.waypoints.len(),
            start_index,
            "Tour started"
        );
        Ok(())
    }

    /// Record a position fix.
    ///
    /// Returns a route request when the session still needs a route to the
    /// current waypoint. A new request supersedes any request in flight.
    pub fn on_position_update(&mut self, fix: Coordinate) -> Option<(RouteTicket, RouteRequest)> {
        self.last_fix = Some(fix);
        if self.needs_route() {
            self.begin_route()
        } else {
            None
        }
    }

    /// Build a route request toward the current waypoint using the last fix.
    pub fn begin_route(&mut self) -> Option<(RouteTicket, RouteRequest)> {
        if !matches!(self.phase, TourPhase::RoutingToNext | TourPhase::AwaitingArrival) {
            return None;
        }

        let Some(request) = self.builder.build_request(self.last_fix, &self.waypoints, self.index)
        else {
            tracing::debug!(
                index = self.index,
                has_fix = self.last_fix.is_some(),
                "No route request possible"
            );
            return None;
        };

        self.next_ticket += 1;
        let ticket = RouteTicket(self.next_ticket);
        if let Some(previous) = self.in_flight.replace(ticket) {
            tracing::debug!(?previous, ?ticket, "Superseding in-flight route request");
        }
        Some((ticket, request))
    }

    /// Apply a route result. Returns the route if the ticket is still current.
    pub fn on_route_ready(&mut self, ticket: RouteTicket, route: Route) -> Option<Route> {
        if !self.take_ticket(ticket) {
            return None;
        }
        self.route_active = true;
        self.transition(TourPhase::AwaitingArrival);
        Some(route)
    }

    /// Apply a routing failure. Returns the error if the ticket is still current.
    ///
    /// The session waits in `AwaitingArrival` and retries on the next fix.
    pub fn on_route_failed(&mut self, ticket: RouteTicket, error: RoutingError) -> Option<RoutingError> {
        if !self.take_ticket(ticket) {
            return None;
        }
        self.route_active = false;
        self.transition(TourPhase::AwaitingArrival);
        Some(error)
    }

    /// Process the "arrived at waypoint" trigger.
    pub fn on_arrived_at_current_waypoint(&mut self) -> Result<ArrivalOutcome> {
        if !matches!(self.phase, TourPhase::AwaitingArrival | TourPhase::Arrived) {
            return Err(self.invalid("arrive"));
        }
        self.transition(TourPhase::Arrived);

        let user = self.user.clone();
        let waypoint = &mut self.waypoints[self.index];
        let marked_visited = !waypoint.is_owned_by(&user);
        if marked_visited {
            waypoint.visited = true;
        }
        let arrived = waypoint.clone();

        self.index += 1;
        self.in_flight = None;
        self.route_active = false;

        let completed = self.index >= self.waypoints.len();
        if completed {
            self.transition(TourPhase::Completed(CompletionReason::Finished));
        } else {
            self.transition(TourPhase::RoutingToNext);
        }

        tracing::info!(
            pin_id = %arrived.id,
            index = self.index,
            marked_visited,
            completed,
            "Arrived at waypoint"
        );

        Ok(ArrivalOutcome {
            arrived,
            marked_visited,
            next: self.current_waypoint().cloned(),
            has_next: self.has_next(),
            index: self.index,
            completed,
        })
    }

    /// User ended the tour early.
    pub fn end_tour(&mut self) -> Result<()> {
        self.finish_early(CompletionReason::Ended, "end_tour")
    }

    /// Tear the tour down without user action.
    pub fn cancel(&mut self) -> Result<()> {
        self.finish_early(CompletionReason::Cancelled, "cancel")
    }

    fn finish_early(&mut self, reason: CompletionReason, operation: &'static str) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(self.invalid(operation));
        }
        self.in_flight = None;
        self.route_active = false;
        self.transition(TourPhase::Completed(reason));
        Ok(())
    }

    /// Whether another waypoint follows the current one.
    pub fn has_next(&self) -> bool {
        self.index + 1 < self.waypoints.len()
    }

    pub fn phase(&self) -> TourPhase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.index)
    }

    pub fn last_fix(&self) -> Option<Coordinate> {
        self.last_fix
    }

    /// Whether `ticket` is the route request the session is waiting on.
    pub fn is_current(&self, ticket: RouteTicket) -> bool {
        self.in_flight == Some(ticket)
    }

    pub fn summary(&self) -> TourSummary {
        TourSummary {
            phase: self.phase,
            index: self.index,
            total: self.waypoints.len(),
            visited: self.waypoints.iter().filter(|w| w.visited).count(),
        }
    }

    fn needs_route(&self) -> bool {
        match self.phase {
            TourPhase::RoutingToNext => true,
            TourPhase::AwaitingArrival => !self.route_active,
            _ => false,
        }
    }

    fn take_ticket(&mut self, ticket: RouteTicket) -> bool {
        if self.phase.is_terminal() || !self.is_current(ticket) {
            tracing::debug!(?ticket, phase = self.phase.name(), "Dropping stale route result");
            return false;
        }
        self.in_flight = None;
        true
    }

    fn transition(&mut self, next: TourPhase) {
        tracing::debug!(from = self.phase.name(), to = next.name(), index = self.index, "Tour transition");
        self.phase = next;
    }

    fn invalid(&self, operation: &'static str) -> TourError {
        TourError::InvalidTransition {
            phase: self.phase.name(),
            operation,
        }
    }
}
