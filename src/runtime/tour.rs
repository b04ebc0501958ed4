// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tour session task.
//!
//! One tokio task owns the `TourSession`. Position fixes, route results,
//! arrival triggers and user commands are all funneled through its queue,
//! so the session is only ever mutated by that task. Route calculations run
//! in their own tasks and post back a ticketed result; a newer request aborts
//! the older task, and stale results are dropped by the session.

use crate::error::{Result, RoutingError, TourError};
use crate::models::{Coordinate, Route, RouteRequest, UserId, Waypoint};
use crate::services::directory::PinDirectory;
use crate::services::positioning::PositioningService;
use crate::services::presentation::PresentationSink;
use crate::services::routing::{RouteRequestBuilder, RoutingProvider};
use crate::services::tour::{ArrivalOutcome, CompletionReason, RouteTicket, TourSession, TourSummary};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Collaborators for one tour.
#[derive(Clone)]
pub struct TourDeps {
    pub user: UserId,
    pub routing: Arc<dyn RoutingProvider>,
    pub directory: Arc<dyn PinDirectory>,
    pub positioning: Arc<dyn PositioningService>,
    pub sink: Arc<dyn PresentationSink>,
    pub min_distance_meters: f64,
}

enum TourCommand {
    Position(Coordinate),
    PositioningEnded,
    Reroute,
    RouteResolved {
        ticket: RouteTicket,
        result: std::result::Result<Route, RoutingError>,
    },
    Arrived {
        reply: oneshot::Sender<Result<ArrivalOutcome>>,
    },
    Finish {
        reason: CompletionReason,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Handle to a running tour.
///
/// Dropping the handle cancels the tour.
pub struct TourHandle {
    tx: mpsc::UnboundedSender<TourCommand>,
    task: JoinHandle<TourSummary>,
}

impl TourHandle {
    /// Start a tour task. Invalid input is reported here and no task is spawned.
    pub fn spawn(deps: TourDeps, waypoints: Vec<Waypoint>, start_index: usize) -> Result<Self> {
        let mut session = TourSession::new(deps.user.clone(), RouteRequestBuilder::new());
        session.start(waypoints, start_index)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let forwarder = spawn_position_forwarder(&deps, tx.downgrade());

        let runtime = TourRuntime {
            session,
            deps,
            self_tx: tx.downgrade(),
            route_task: None,
            forwarder,
        };
        let task = tokio::spawn(runtime.run(rx));

        Ok(Self { tx, task })
    }

    /// Feed a position fix directly (in addition to the positioning service).
    pub fn push_position(&self, fix: Coordinate) -> Result<()> {
        self.send(TourCommand::Position(fix), "push_position")
    }

    /// Ask for a fresh route to the current waypoint using the last fix.
    pub fn request_route(&self) -> Result<()> {
        self.send(TourCommand::Reroute, "request_route")
    }

    /// Routing provider's "arrived at waypoint" trigger.
    pub async fn arrived(&self) -> Result<ArrivalOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(TourCommand::Arrived { reply }, "arrive")?;
        rx.await.map_err(|_| closed("arrive"))?
    }

    /// User ended the tour.
    pub async fn end_tour(&self) -> Result<()> {
        self.finish(CompletionReason::Ended, "end_tour").await
    }

    pub async fn cancel(&self) -> Result<()> {
        self.finish(CompletionReason::Cancelled, "cancel").await
    }

    /// Wait for the tour to reach `Completed`.
    pub async fn join(self) -> Result<TourSummary> {
        let TourHandle { tx, task } = self;
        let summary = task
            .await
            .map_err(|e| TourError::Internal(anyhow::anyhow!("Tour task failed: {}", e)))?;
        drop(tx);
        Ok(summary)
    }

    async fn finish(&self, reason: CompletionReason, operation: &'static str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(TourCommand::Finish { reason, reply }, operation)?;
        rx.await.map_err(|_| closed(operation))?
    }

    fn send(&self, command: TourCommand, operation: &'static str) -> Result<()> {
        self.tx.send(command).map_err(|_| closed(operation))
    }
}

fn closed(operation: &'static str) -> TourError {
    TourError::InvalidTransition {
        phase: "completed",
        operation,
    }
}

fn spawn_position_forwarder(
    deps: &TourDeps,
    tx: mpsc::WeakUnboundedSender<TourCommand>,
) -> JoinHandle<()> {
    let mut updates = deps.positioning.start_updates(deps.min_distance_meters);
    tokio::spawn(async move {
        while let Some(fix) = updates.next().await {
            let Some(tx) = tx.upgrade() else { return };
            if tx.send(TourCommand::Position(fix)).is_err() {
                return;
            }
        }
        if let Some(tx) = tx.upgrade() {
            let _ = tx.send(TourCommand::PositioningEnded);
        }
    })
}

struct TourRuntime {
    session: TourSession,
    deps: TourDeps,
    self_tx: mpsc::WeakUnboundedSender<TourCommand>,
    route_task: Option<JoinHandle<()>>,
    forwarder: JoinHandle<()>,
}

impl TourRuntime {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<TourCommand>) -> TourSummary {
        while !self.session.phase().is_terminal() {
            let Some(command) = rx.recv().await else {
                // Every handle is gone
                tracing::info!("Tour handle dropped, cancelling tour");
                let _ = self.finish(CompletionReason::Cancelled);
                break;
            };
            self.handle(command);
        }

        self.abort_route();
        self.forwarder.abort();
        let summary = self.session.summary();
        tracing::info!(
            index = summary.index,
            total = summary.total,
            visited = summary.visited,
            "Tour task finished"
        );
        summary
    }

    fn handle(&mut self, command: TourCommand) {
        match command {
            TourCommand::Position(fix) => {
                if let Some((ticket, request)) = self.session.on_position_update(fix) {
                    self.dispatch_route(ticket, request);
                }
            }
            TourCommand::PositioningEnded => {
                tracing::warn!(
                    error = %TourError::PositioningUnavailable,
                    phase = self.session.phase().name(),
                    "Position updates stopped; tour paused until a fix arrives"
                );
            }
            TourCommand::Reroute => {
                if let Some((ticket, request)) = self.session.begin_route() {
                    self.dispatch_route(ticket, request);
                }
            }
            TourCommand::RouteResolved { ticket, result } => match result {
                Ok(route) => {
                    if let Some(route) = self.session.on_route_ready(ticket, route) {
                        self.route_task = None;
                        self.deps.sink.on_route_ready(&route);
                    }
                }
                Err(error) => {
                    if let Some(error) = self.session.on_route_failed(ticket, error) {
                        self.route_task = None;
                        tracing::warn!(error = %error, ?ticket, "Route calculation failed");
                        self.deps.sink.on_route_failed(&error);
                    }
                }
            },
            TourCommand::Arrived { reply } => {
                let result = self.session.on_arrived_at_current_waypoint();
                if let Ok(outcome) = &result {
                    self.after_arrival(outcome);
                }
                let _ = reply.send(result);
            }
            TourCommand::Finish { reason, reply } => {
                let _ = reply.send(self.finish(reason));
            }
        }
    }

    fn after_arrival(&mut self, outcome: &ArrivalOutcome) {
        self.abort_route();
        self.mark_viewed(outcome);

        self.deps
            .sink
            .on_arrival_processed(outcome.next.as_ref(), outcome.has_next);

        if outcome.completed {
            self.deps.sink.on_tour_completed(CompletionReason::Finished);
        } else if let Some((ticket, request)) = self.session.begin_route() {
            self.dispatch_route(ticket, request);
        }
    }

    /// Fire-and-forget view record; failures never block the tour.
    fn mark_viewed(&self, outcome: &ArrivalOutcome) {
        let directory = Arc::clone(&self.deps.directory);
        let user = self.deps.user.clone();
        let pin = outcome.arrived.id.clone();
        tokio::spawn(async move {
            if let Err(e) = directory.mark_viewed(&user, &pin).await {
                tracing::warn!(pin_id = %pin, error = %e, "Failed to mark pin viewed");
            }
        });
    }

    fn dispatch_route(&mut self, ticket: RouteTicket, request: RouteRequest) {
        self.abort_route();

        let routing = Arc::clone(&self.deps.routing);
        let tx = self.self_tx.clone();
        tracing::debug!(?ticket, destination = %request.destination_label, "Requesting route");
        self.route_task = Some(tokio::spawn(async move {
            let result = routing.calculate_route(&request).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(TourCommand::RouteResolved { ticket, result });
            }
        }));
    }

    fn abort_route(&mut self) {
        if let Some(task) = self.route_task.take() {
            task.abort();
        }
    }

    fn finish(&mut self, reason: CompletionReason) -> Result<()> {
        let result = match reason {
            CompletionReason::Cancelled => self.session.cancel(),
            _ => self.session.end_tour(),
        };
        if result.is_ok() {
            self.abort_route();
            self.deps.sink.on_tour_completed(reason);
        }
        result
    }
}
