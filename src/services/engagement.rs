// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Like counter with an optimistic local edit.
//!
//! The counter keeps three things apart:
//! - server truth (count and whether this user has liked the pin)
//! - the displayed count (server count plus live deltas since the snapshot)
//! - the user's pending like intent, which only drives the icon
//!
//! The pending intent is committed at most once, when the owning view
//! closes, and only if it differs from server truth.

use serde::Serialize;

/// Authoritative write to issue on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeAction {
    Like,
    Unlike,
}

/// Outcome of flushing the pending intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "action")]
pub enum FlushOutcome {
    Commit(LikeAction),
    NoOp,
}

/// Pending intent relative to server truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingIntent {
    /// No local edit
    None,
    /// Local edit ends where the server already is
    MatchesServer,
    /// Local edit requires this write
    DiffersFromServer(LikeAction),
}

/// Like count and like state for one pin, seen by one user.
#[derive(Debug, Clone, Default)]
pub struct EngagementCounter {
    server_count: u64,
    server_has_liked: bool,
    displayed_count: i64,
    pending: Option<bool>,
}

impl EngagementCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace server truth. A pending local intent survives.
    pub fn apply_snapshot(&mut self, server_count: u64, server_has_liked: bool) {
        self.server_count = server_count;
        self.server_has_liked = server_has_liked;
        self.displayed_count = server_count as i64;
    }

    /// Flip the user's like intent.
    pub fn toggle_local(&mut self) {
        let next = match self.pending {
            Some(intent) => !intent,
            None => !self.server_has_liked,
        };
        self.pending = Some(next);
    }

    /// Apply a live +1/-1 from another source.
    pub fn apply_live_delta(&mut self, delta: i64) {
        self.displayed_count += delta;
    }

    pub fn intent(&self) -> PendingIntent {
        match self.pending {
            None => PendingIntent::None,
            Some(intent) if intent == self.server_has_liked => PendingIntent::MatchesServer,
            Some(true) => PendingIntent::DiffersFromServer(LikeAction::Like),
            Some(false) => PendingIntent::DiffersFromServer(LikeAction::Unlike),
        }
    }

    /// Take the pending intent, returning the write it requires.
    pub fn flush_if_needed(&mut self) -> FlushOutcome {
        let outcome = match self.intent() {
            PendingIntent::DiffersFromServer(action) => FlushOutcome::Commit(action),
            PendingIntent::None | PendingIntent::MatchesServer => FlushOutcome::NoOp,
        };
        self.pending = None;
        outcome
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_intent(&self) -> Option<bool> {
        self.pending
    }

    pub fn displayed_count(&self) -> i64 {
        self.displayed_count
    }

    pub fn server_count(&self) -> u64 {
        self.server_count
    }

    pub fn server_has_liked(&self) -> bool {
        self.server_has_liked
    }

    /// Icon state shown to the user.
    pub fn liked_icon(&self) -> bool {
        self.pending.unwrap_or(self.server_has_liked)
    }
}
