// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pin view task.
//!
//! Handles the core workflow for one visible pin:
//! 1. Subscribe to live like events and mark the pin viewed
//! 2. Fetch comments, like count, the user's like, and comment state
//! 3. Merge user toggles, fetch results and live deltas, in arrival order
//! 4. On close, cancel the subscription and flush the pending like once

use crate::error::{Result, TourError};
use crate::models::{Comment, LikeRecordId, PinId, UserId, Waypoint};
use crate::services::comments::CommentSet;
use crate::services::directory::{LikeSubscription, PinDirectory};
use crate::services::engagement::{EngagementCounter, FlushOutcome, LikeAction};
use crate::services::presentation::PresentationSink;
use crate::services::reconciliation::ReconciliationScheduler;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Collaborators for one pin view.
#[derive(Clone)]
pub struct PinViewDeps {
    pub user: UserId,
    pub directory: Arc<dyn PinDirectory>,
    pub sink: Arc<dyn PresentationSink>,
}

enum Fetched {
    Comments(Vec<Comment>),
    Snapshot {
        count: u64,
        like: Option<LikeRecordId>,
    },
    HasCommented(bool),
}

enum ViewInput {
    ToggleLike,
    RefreshComments,
    Fetched(Fetched),
}

enum PinViewCommand {
    Input(ViewInput),
    Close { reply: oneshot::Sender<FlushOutcome> },
}

/// Handle to an open pin view.
///
/// Dropping the handle closes the view (and flushes, like `close`).
pub struct PinViewHandle {
    tx: mpsc::UnboundedSender<PinViewCommand>,
    task: JoinHandle<FlushOutcome>,
}

impl PinViewHandle {
    /// Open a view on `pin`.
    pub fn open(deps: PinViewDeps, pin: Waypoint) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = deps.directory.subscribe_live_like_deltas(&pin.id);

        let view = PinView {
            pin,
            deps,
            self_tx: tx.downgrade(),
            counter: EngagementCounter::new(),
            comments: CommentSet::new(),
            scheduler: ReconciliationScheduler::new(),
            like_record: None,
        };
        let task = tokio::spawn(view.run(rx, subscription));

        Self { tx, task }
    }

    pub fn toggle_like(&self) -> Result<()> {
        self.send(ViewInput::ToggleLike, "toggle_like")
    }

    /// Re-fetch comments; the list is only replaced if its length changed.
    pub fn refresh_comments(&self) -> Result<()> {
        self.send(ViewInput::RefreshComments, "refresh_comments")
    }

    /// Close the view and wait for the reconciliation outcome.
    pub async fn close(self) -> Result<FlushOutcome> {
        let PinViewHandle { tx, task } = self;
        let (reply, rx) = oneshot::channel();
        if tx.send(PinViewCommand::Close { reply }).is_ok() {
            if let Ok(outcome) = rx.await {
                return Ok(outcome);
            }
        }
        task.await
            .map_err(|e| TourError::Internal(anyhow::anyhow!("Pin view task failed: {}", e)))
    }

    fn send(&self, input: ViewInput, operation: &'static str) -> Result<()> {
        self.tx.send(PinViewCommand::Input(input)).map_err(|_| TourError::InvalidTransition {
            phase: "closed",
            operation,
        })
    }
}

struct PinView {
    pin: Waypoint,
    deps: PinViewDeps,
    self_tx: mpsc::WeakUnboundedSender<PinViewCommand>,
    counter: EngagementCounter,
    comments: CommentSet,
    scheduler: ReconciliationScheduler,
    like_record: Option<LikeRecordId>,
}

impl PinView {
    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<PinViewCommand>,
        mut subscription: LikeSubscription,
    ) -> FlushOutcome {
        tracing::debug!(pin_id = %self.pin.id, "Pin view opened");
        self.mark_viewed_if_needed();
        self.fetch_all();

        let mut live = true;
        let reply = loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(PinViewCommand::Close { reply }) => break Some(reply),
                    Some(PinViewCommand::Input(input)) => self.handle(input),
                    None => break None,
                },
                event = subscription.recv(), if live => match event {
                    Some(event) if event.pin_id == self.pin.id => {
                        self.counter.apply_live_delta(event.direction.delta());
                        tracing::debug!(
                            pin_id = %self.pin.id,
                            actor = %event.actor,
                            displayed = self.counter.displayed_count(),
                            "Applied live like delta"
                        );
                        self.notify_engagement();
                    }
                    Some(event) => {
                        tracing::debug!(pin_id = %event.pin_id, "Ignoring delta for another pin");
                    }
                    None => live = false,
                },
            }
        };

        // Deregister before flushing so our own commit is not echoed back
        drop(subscription);
        let outcome = self.scheduler.on_view_closing(&mut self.counter);
        self.execute(outcome);
        tracing::debug!(pin_id = %self.pin.id, ?outcome, "Pin view closed");

        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
        outcome
    }

    fn handle(&mut self, input: ViewInput) {
        match input {
            ViewInput::ToggleLike => {
                self.counter.toggle_local();
                self.notify_engagement();
            }
            ViewInput::RefreshComments => self.fetch_comments(),
            ViewInput::Fetched(Fetched::Comments(list)) => {
                if self.comments.ingest(list) {
                    self.deps
                        .sink
                        .on_comments_changed(&self.pin.id, self.comments.comments());
                }
            }
            ViewInput::Fetched(Fetched::Snapshot { count, like }) => {
                self.counter.apply_snapshot(count, like.is_some());
                self.like_record = like;
                self.notify_engagement();
            }
            ViewInput::Fetched(Fetched::HasCommented(has_commented)) => {
                self.deps
                    .sink
                    .on_comment_icon_changed(&self.pin.id, has_commented);
            }
        }
    }

    fn notify_engagement(&self) {
        self.deps.sink.on_engagement_changed(
            &self.pin.id,
            self.counter.displayed_count(),
            self.counter.liked_icon(),
        );
    }

    /// Record a view of someone else's pin the first time it is seen.
    fn mark_viewed_if_needed(&self) {
        if self.pin.visited || self.pin.is_owned_by(&self.deps.user) {
            return;
        }
        let directory = Arc::clone(&self.deps.directory);
        let user = self.deps.user.clone();
        let pin = self.pin.id.clone();
        tokio::spawn(async move {
            if let Err(e) = directory.mark_viewed(&user, &pin).await {
                tracing::warn!(pin_id = %pin, error = %e, "Failed to mark pin viewed");
            }
        });
    }

    fn fetch_all(&self) {
        self.fetch_comments();

        let (directory, pin, user) = self.query_parts();
        self.fetch(async move {
            let (count, like) = tokio::try_join!(
                directory.fetch_like_count(&pin),
                directory.fetch_user_like(&pin, &user)
            )?;
            Ok::<_, TourError>(Fetched::Snapshot { count, like })
        });

        let (directory, pin, user) = self.query_parts();
        self.fetch(async move {
            directory
                .has_commented(&pin, &user)
                .await
                .map(Fetched::HasCommented)
        });
    }

    fn fetch_comments(&self) {
        let (directory, pin, _) = self.query_parts();
        self.fetch(async move { directory.fetch_comments(&pin).await.map(Fetched::Comments) });
    }

    fn query_parts(&self) -> (Arc<dyn PinDirectory>, PinId, UserId) {
        (
            Arc::clone(&self.deps.directory),
            self.pin.id.clone(),
            self.deps.user.clone(),
        )
    }

    /// Run a directory query off-task and post its result back to the queue.
    fn fetch<F>(&self, query: F)
    where
        F: Future<Output = Result<Fetched>> + Send + 'static,
    {
        let tx = self.self_tx.clone();
        let pin = self.pin.id.clone();
        tokio::spawn(async move {
            match query.await {
                Ok(fetched) => {
                    if let Some(tx) = tx.upgrade() {
                        let _ = tx.send(PinViewCommand::Input(ViewInput::Fetched(fetched)));
                    }
                }
                Err(e) => tracing::warn!(pin_id = %pin, error = %e, "Directory query failed"),
            }
        });
    }

    /// Dispatch the flush result as a fire-and-forget write.
    fn execute(&self, outcome: FlushOutcome) {
        let FlushOutcome::Commit(action) = outcome else {
            return;
        };
        let directory = Arc::clone(&self.deps.directory);
        let user = self.deps.user.clone();
        let pin = self.pin.id.clone();
        let record = self.like_record.clone();

        tracing::info!(pin_id = %pin, ?action, "Committing like change");
        tokio::spawn(async move {
            let result = match action {
                LikeAction::Like => directory.commit_like(&user, &pin).await.map(|_| ()),
                LikeAction::Unlike => match record {
                    Some(record) => directory.commit_unlike(&record).await,
                    None => Err(TourError::DirectoryWrite(
                        "no like record to remove".to_string(),
                    )),
                },
            };
            if let Err(e) = result {
                tracing::warn!(pin_id = %pin, ?action, error = %e, "Like commit failed");
            }
        });
    }
}
