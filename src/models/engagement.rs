// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social engagement models: comments and live like events.

use super::{PinId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment left on a pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub pin_id: PinId,
    pub author: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Direction of a like counter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeDirection {
    Like,
    Unlike,
}

impl LikeDirection {
    /// Signed counter change (+1 / -1).
    pub fn delta(self) -> i64 {
        match self {
            LikeDirection::Like => 1,
            LikeDirection::Unlike => -1,
        }
    }
}

/// Live like/unlike event pushed by the directory's subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeDeltaEvent {
    pub pin_id: PinId,
    pub direction: LikeDirection,
    /// User whose action produced the event
    pub actor: UserId,
}
