// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presentation-layer event sink.

use crate::error::RoutingError;
use crate::models::{Comment, PinId, Route, Waypoint};
use crate::services::tour::CompletionReason;
use tokio::sync::mpsc;

/// Receives every state change the core exposes to the UI.
///
/// All handlers are required; callers run them on the session task, so
/// implementations must not block.
pub trait PresentationSink: Send + Sync {
    fn on_route_ready(&self, route: &Route);

    fn on_route_failed(&self, reason: &RoutingError);

    fn on_arrival_processed(&self, next: Option<&Waypoint>, has_next: bool);

    fn on_tour_completed(&self, reason: CompletionReason);

    fn on_engagement_changed(&self, pin: &PinId, displayed_count: i64, liked: bool);

    fn on_comments_changed(&self, pin: &PinId, comments: &[Comment]);

    fn on_comment_icon_changed(&self, pin: &PinId, has_commented: bool);
}

/// Tagged form of the sink's handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    RouteReady(Route),
    RouteFailed(RoutingError),
    ArrivalProcessed {
        next: Option<Waypoint>,
        has_next: bool,
    },
    TourCompleted(CompletionReason),
    EngagementChanged {
        pin: PinId,
        displayed_count: i64,
        liked: bool,
    },
    CommentsChanged {
        pin: PinId,
        comments: Vec<Comment>,
    },
    CommentIconChanged {
        pin: PinId,
        has_commented: bool,
    },
}

/// Sink that forwards every handler into a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PresentationEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresentationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: PresentationEvent) {
        // Receiver gone means the UI is gone
        let _ = self.tx.send(event);
    }
}

impl PresentationSink for ChannelSink {
    fn on_route_ready(&self, route: &Route) {
        self.send(PresentationEvent::RouteReady(route.clone()));
    }

    fn on_route_failed(&self, reason: &RoutingError) {
        self.send(PresentationEvent::RouteFailed(reason.clone()));
    }

    fn on_arrival_processed(&self, next: Option<&Waypoint>, has_next: bool) {
        self.send(PresentationEvent::ArrivalProcessed {
            next: next.cloned(),
            has_next,
        });
    }

    fn on_tour_completed(&self, reason: CompletionReason) {
        self.send(PresentationEvent::TourCompleted(reason));
    }

    fn on_engagement_changed(&self, pin: &PinId, displayed_count: i64, liked: bool) {
        self.send(PresentationEvent::EngagementChanged {
            pin: pin.clone(),
            displayed_count,
            liked,
        });
    }

    fn on_comments_changed(&self, pin: &PinId, comments: &[Comment]) {
        self.send(PresentationEvent::CommentsChanged {
            pin: pin.clone(),
            comments: comments.to_vec(),
        });
    }

    fn on_comment_icon_changed(&self, pin: &PinId, has_commented: bool) {
        self.send(PresentationEvent::CommentIconChanged {
            pin: pin.clone(),
            has_commented,
        });
    }
}

/// Sink that logs every event; used by the demo binary.
#[derive(Debug, Clone, Default)]
pub struct LoggingSink;

impl PresentationSink for LoggingSink {
    fn on_route_ready(&self, route: &Route) {
        tracing::info!(
            distance_m = route.distance_meters,
            duration_s = route.duration_seconds,
            steps = route.steps.len(),
            "Route ready"
        );
    }

    fn on_route_failed(&self, reason: &RoutingError) {
        tracing::warn!(error = %reason, "Route failed");
    }

    fn on_arrival_processed(&self, next: Option<&Waypoint>, has_next: bool) {
        tracing::info!(next = ?next.map(|w| w.label.as_str()), has_next, "Arrival processed");
    }

    fn on_tour_completed(&self, reason: CompletionReason) {
        tracing::info!(?reason, "Tour completed");
    }

    fn on_engagement_changed(&self, pin: &PinId, displayed_count: i64, liked: bool) {
        tracing::info!(pin_id = %pin, displayed_count, liked, "Engagement changed");
    }

    fn on_comments_changed(&self, pin: &PinId, comments: &[Comment]) {
        tracing::info!(pin_id = %pin, count = comments.len(), "Comments changed");
    }

    fn on_comment_icon_changed(&self, pin: &PinId, has_commented: bool) {
        tracing::info!(pin_id = %pin, has_commented, "Comment icon changed");
    }
}
