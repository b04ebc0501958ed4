// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use pintour::error::{Result as TourResult, RoutingError};
use pintour::models::{
    Comment, Coordinate, LikeDeltaEvent, LikeRecordId, PinId, Route, RouteRequest, UserId,
    Waypoint,
};
use pintour::runtime::{PinViewDeps, TourDeps};
use pintour::services::{
    ChannelSink, HuntQuery, InMemoryDirectory, LikeSubscription, PinDirectory, PositioningService,
    PresentationEvent, RoutingProvider, StraightLineRouter,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[allow(dead_code)]
pub const WALKER: &str = "walker";

/// How long to wait for an event before failing the test.
const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Starting point of every test tour.
#[allow(dead_code)]
pub fn origin() -> Coordinate {
    Coordinate::new(37.7700, -122.4200)
}

/// Three pins north of the origin, owned by someone other than the walker.
#[allow(dead_code)]
pub fn three_waypoints() -> Vec<Waypoint> {
    vec![
        Waypoint::new("w0", Some(Coordinate::new(37.7710, -122.4200)), "guide"),
        Waypoint::new("w1", Some(Coordinate::new(37.7720, -122.4200)), "guide"),
        Waypoint::new("w2", Some(Coordinate::new(37.7730, -122.4200)), "guide"),
    ]
}

/// Router that fails a configured number of times, optionally after a delay,
/// then answers with a straight line.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedRouter {
    failures: AtomicUsize,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(times: usize) -> Self {
        Self {
            failures: AtomicUsize::new(times),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingProvider for ScriptedRouter {
    async fn calculate_route(&self, request: &RouteRequest) -> Result<Route, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RoutingError::Provider("scripted failure".to_string()));
        }
        StraightLineRouter.calculate_route(request).await
    }
}

/// Positioning source that never produces a fix; tests push fixes by hand.
#[allow(dead_code)]
pub struct SilentPositioning;

impl PositioningService for SilentPositioning {
    fn start_updates(&self, _min_distance_meters: f64) -> BoxStream<'static, Coordinate> {
        stream::pending().boxed()
    }
}

/// Directory with a fixed like count whose live events are pushed by the test.
///
/// The first subscription receives whatever is sent on the sender returned
/// by [`ScriptedDirectory::new`], whatever pin the events name.
#[allow(dead_code)]
pub struct ScriptedDirectory {
    like_count: u64,
    deltas: Mutex<Option<UnboundedReceiver<LikeDeltaEvent>>>,
    cancelled: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl ScriptedDirectory {
    pub fn new(like_count: u64) -> (Self, UnboundedSender<LikeDeltaEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let directory = Self {
            like_count,
            deltas: Mutex::new(Some(rx)),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        (directory, tx)
    }

    /// Whether the subscription handed out has been cancelled.
    pub fn subscription_cancelled(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

#[async_trait]
impl PinDirectory for ScriptedDirectory {
    async fn fetch_comments(&self, _pin: &PinId) -> TourResult<Vec<Comment>> {
        Ok(Vec::new())
    }

    async fn fetch_like_count(&self, _pin: &PinId) -> TourResult<u64> {
        Ok(self.like_count)
    }

    async fn fetch_user_like(
        &self,
        _pin: &PinId,
        _user: &UserId,
    ) -> TourResult<Option<LikeRecordId>> {
        Ok(None)
    }

    async fn has_commented(&self, _pin: &PinId, _user: &UserId) -> TourResult<bool> {
        Ok(false)
    }

    async fn commit_like(&self, _user: &UserId, _pin: &PinId) -> TourResult<LikeRecordId> {
        Ok(LikeRecordId::from("scripted-like"))
    }

    async fn commit_unlike(&self, _record: &LikeRecordId) -> TourResult<()> {
        Ok(())
    }

    async fn mark_viewed(&self, _user: &UserId, _pin: &PinId) -> TourResult<()> {
        Ok(())
    }

    async fn search_pins(
        &self,
        _query: &HuntQuery,
        _origin: Coordinate,
    ) -> TourResult<Vec<Waypoint>> {
        Ok(Vec::new())
    }

    fn subscribe_live_like_deltas(&self, pin: &PinId) -> LikeSubscription {
        let receiver = self
            .deltas
            .lock()
            .expect("Delta lock poisoned")
            .take()
            .unwrap_or_else(|| mpsc::unbounded_channel().1);
        let cancelled = Arc::clone(&self.cancelled);
        LikeSubscription::new(pin.clone(), receiver, move || {
            cancelled.store(true, Ordering::SeqCst)
        })
    }
}

/// Tour collaborators wired to a channel sink.
#[allow(dead_code)]
pub fn tour_deps(
    routing: Arc<dyn RoutingProvider>,
    directory: InMemoryDirectory,
) -> (TourDeps, UnboundedReceiver<PresentationEvent>) {
    let (sink, events) = ChannelSink::new();
    let deps = TourDeps {
        user: UserId::from(WALKER),
        routing,
        directory: Arc::new(directory),
        positioning: Arc::new(SilentPositioning),
        sink: Arc::new(sink),
        min_distance_meters: 0.0,
    };
    (deps, events)
}

/// Pin view collaborators wired to a channel sink.
#[allow(dead_code)]
pub fn view_deps(
    user: &str,
    directory: InMemoryDirectory,
) -> (PinViewDeps, UnboundedReceiver<PresentationEvent>) {
    view_deps_with(user, Arc::new(directory))
}

/// Pin view collaborators over any directory.
#[allow(dead_code)]
pub fn view_deps_with(
    user: &str,
    directory: Arc<dyn PinDirectory>,
) -> (PinViewDeps, UnboundedReceiver<PresentationEvent>) {
    let (sink, events) = ChannelSink::new();
    let deps = PinViewDeps {
        user: UserId::from(user),
        directory,
        sink: Arc::new(sink),
    };
    (deps, events)
}

/// Next presentation event, failing the test on timeout.
#[allow(dead_code)]
pub async fn next_event(events: &mut UnboundedReceiver<PresentationEvent>) -> PresentationEvent {
    tokio::time::timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("Timed out waiting for presentation event")
        .expect("Presentation channel closed")
}

/// Skip events until one matches `predicate`.
#[allow(dead_code)]
pub async fn wait_for<F>(
    events: &mut UnboundedReceiver<PresentationEvent>,
    mut predicate: F,
) -> PresentationEvent
where
    F: FnMut(&PresentationEvent) -> bool,
{
    loop {
        let event = next_event(events).await;
        if predicate(&event) {
            return event;
        }
    }
}

/// Poll `condition` until it holds, failing the test on timeout.
#[allow(dead_code)]
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(EVENT_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Condition not reached in time");
}
