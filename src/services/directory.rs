// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pin directory seam and an in-memory implementation.
//!
//! The directory owns pins, comments, like records and view records, and
//! pushes live like/unlike events to per-pin subscriptions.

use crate::error::{Result, TourError};
use crate::models::{Comment, Coordinate, LikeDeltaEvent, LikeDirection, LikeRecordId, PinId, UserId, Waypoint};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Pin search parameters for a scavenger hunt.
#[derive(Debug, Clone, PartialEq)]
pub struct HuntQuery {
    /// Pins must carry at least one of these tags (any pin if empty)
    pub tags: Vec<String>,
    pub radius_meters: f64,
}

/// Access to pins and their social data.
#[async_trait]
pub trait PinDirectory: Send + Sync {
    async fn fetch_comments(&self, pin: &PinId) -> Result<Vec<Comment>>;

    async fn fetch_like_count(&self, pin: &PinId) -> Result<u64>;

    /// The user's like record on a pin, if any.
    async fn fetch_user_like(&self, pin: &PinId, user: &UserId) -> Result<Option<LikeRecordId>>;

    async fn has_commented(&self, pin: &PinId, user: &UserId) -> Result<bool>;

    async fn commit_like(&self, user: &UserId, pin: &PinId) -> Result<LikeRecordId>;

    async fn commit_unlike(&self, record: &LikeRecordId) -> Result<()>;

    async fn mark_viewed(&self, user: &UserId, pin: &PinId) -> Result<()>;

    /// Pins matching a hunt query around `origin`, nearest first.
    async fn search_pins(&self, query: &HuntQuery, origin: Coordinate) -> Result<Vec<Waypoint>>;

    /// Register for live like events on one pin.
    fn subscribe_live_like_deltas(&self, pin: &PinId) -> LikeSubscription;
}

/// Live like events for one pin.
///
/// Dropping the handle (or calling [`LikeSubscription::cancel`]) deregisters
/// it from the directory.
pub struct LikeSubscription {
    pin_id: PinId,
    receiver: mpsc::UnboundedReceiver<LikeDeltaEvent>,
    on_cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl LikeSubscription {
    pub fn new(
        pin_id: PinId,
        receiver: mpsc::UnboundedReceiver<LikeDeltaEvent>,
        on_cancel: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            pin_id,
            receiver,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    pub fn pin_id(&self) -> &PinId {
        &self.pin_id
    }

    /// Next event, or `None` once the directory side is gone.
    pub async fn recv(&mut self) -> Option<LikeDeltaEvent> {
        self.receiver.recv().await
    }

    pub fn cancel(self) {}
}

impl Drop for LikeSubscription {
    fn drop(&mut self) {
        self.receiver.close();
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}

impl std::fmt::Debug for LikeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeSubscription")
            .field("pin_id", &self.pin_id)
            .finish_non_exhaustive()
    }
}

type Subscribers = DashMap<PinId, Vec<(u64, mpsc::UnboundedSender<LikeDeltaEvent>)>>;

#[derive(Default)]
struct Inner {
    pins: DashMap<PinId, Waypoint>,
    comments: DashMap<PinId, Vec<Comment>>,
    likes: DashMap<LikeRecordId, (UserId, PinId)>,
    views: DashSet<(UserId, PinId)>,
    subscribers: Subscribers,
    next_id: AtomicU64,
    fail_writes: AtomicBool,
}

/// Process-local directory used by the demo binary and tests.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    inner: Arc<Inner>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pin(&self, pin: Waypoint) {
        self.inner.pins.insert(pin.id.clone(), pin);
    }

    pub fn add_comment(&self, pin: &PinId, author: &UserId, text: &str) -> Comment {
        let comment = Comment {
            id: format!("comment-{}", self.next_id()),
            pin_id: pin.clone(),
            author: author.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.inner
            .comments
            .entry(pin.clone())
            .or_default()
            .push(comment.clone());
        comment
    }

    /// Rewrite the text of an existing comment without changing the count.
    pub fn edit_comment(&self, pin: &PinId, comment_id: &str, text: &str) -> bool {
        let Some(mut comments) = self.inner.comments.get_mut(pin) else {
            return false;
        };
        match comments.iter_mut().find(|c| c.id == comment_id) {
            Some(comment) => {
                comment.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Make every write fail until reset (for testing failure paths).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn has_viewed(&self, user: &UserId, pin: &PinId) -> bool {
        self.inner.views.contains(&(user.clone(), pin.clone()))
    }

    pub fn like_count(&self, pin: &PinId) -> u64 {
        self.inner.likes.iter().filter(|e| &e.value().1 == pin).count() as u64
    }

    pub fn subscriber_count(&self, pin: &PinId) -> usize {
        self.inner.subscribers.get(pin).map(|s| s.len()).unwrap_or(0)
    }

    /// Deliver an event to every live subscriber of its pin.
    pub fn publish(&self, event: LikeDeltaEvent) {
        if let Some(mut subs) = self.inner.subscribers.get_mut(&event.pin_id) {
            subs.retain(|(_, tx)| tx.send(event.clone()).is_ok());
        }
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn check_writable(&self) -> Result<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(TourError::DirectoryWrite("directory unavailable".to_string()));
        }
        Ok(())
    }

    fn find_like(&self, pin: &PinId, user: &UserId) -> Option<LikeRecordId> {
        self.inner
            .likes
            .iter()
            .find(|e| &e.value().0 == user && &e.value().1 == pin)
            .map(|e| e.key().clone())
    }
}

#[async_trait]
impl PinDirectory for InMemoryDirectory {
    async fn fetch_comments(&self, pin: &PinId) -> Result<Vec<Comment>> {
        Ok(self
            .inner
            .comments
            .get(pin)
            .map(|c| c.value().clone())
            .unwrap_or_default())
    }

    async fn fetch_like_count(&self, pin: &PinId) -> Result<u64> {
        Ok(self.like_count(pin))
    }

    async fn fetch_user_like(&self, pin: &PinId, user: &UserId) -> Result<Option<LikeRecordId>> {
        Ok(self.find_like(pin, user))
    }

    async fn has_commented(&self, pin: &PinId, user: &UserId) -> Result<bool> {
        Ok(self
            .inner
            .comments
            .get(pin)
            .is_some_and(|c| c.iter().any(|comment| &comment.author == user)))
    }

    async fn commit_like(&self, user: &UserId, pin: &PinId) -> Result<LikeRecordId> {
        self.check_writable()?;
        if let Some(existing) = self.find_like(pin, user) {
            return Ok(existing);
        }

        let record = LikeRecordId::from(format!("like-{}", self.next_id()));
        self.inner
            .likes
            .insert(record.clone(), (user.clone(), pin.clone()));
        self.publish(LikeDeltaEvent {
            pin_id: pin.clone(),
            direction: LikeDirection::Like,
            actor: user.clone(),
        });
        Ok(record)
    }

    async fn commit_unlike(&self, record: &LikeRecordId) -> Result<()> {
        self.check_writable()?;
        let (_, (user, pin)) = self
            .inner
            .likes
            .remove(record)
            .ok_or_else(|| TourError::DirectoryWrite(format!("like record {} not found", record)))?;
        self.publish(LikeDeltaEvent {
            pin_id: pin,
            direction: LikeDirection::Unlike,
            actor: user,
        });
        Ok(())
    }

    async fn mark_viewed(&self, user: &UserId, pin: &PinId) -> Result<()> {
        self.check_writable()?;
        self.inner.views.insert((user.clone(), pin.clone()));
        Ok(())
    }

    async fn search_pins(&self, query: &HuntQuery, origin: Coordinate) -> Result<Vec<Waypoint>> {
        let mut matches: Vec<(f64, Waypoint)> = self
            .inner
            .pins
            .iter()
            .filter_map(|entry| {
                let pin = entry.value();
                let distance = origin.distance_to(&pin.coordinate?);
                let tagged = query.tags.is_empty() || pin.tags.iter().any(|t| query.tags.contains(t));
                (tagged && distance <= query.radius_meters).then(|| (distance, pin.clone()))
            })
            .collect();

        matches.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        Ok(matches.into_iter().map(|(_, pin)| pin).collect())
    }

    fn subscribe_live_like_deltas(&self, pin: &PinId) -> LikeSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id();
        self.inner
            .subscribers
            .entry(pin.clone())
            .or_default()
            .push((id, tx));

        let inner = Arc::clone(&self.inner);
        let key = pin.clone();
        LikeSubscription::new(pin.clone(), rx, move || {
            if let Some(mut subs) = inner.subscribers.get_mut(&key) {
                subs.retain(|(sub_id, _)| *sub_id != id);
            }
            tracing::debug!(pin_id = %key, "Live like subscription cancelled");
        })
    }
}
