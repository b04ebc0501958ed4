// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Comment list cache with a count-based refresh gate.
//!
//! Only a change in the number of comments triggers a refresh. Edits to the
//! text of existing comments are not detected.

use crate::models::Comment;

/// Whether a re-fetched comment list should replace the cached one.
pub fn should_refresh(new_comments: &[Comment], cached_count: usize) -> bool {
    new_comments.len() != cached_count
}

/// Comments shown for one pin, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentSet {
    comments: Vec<Comment>,
    cached_count: usize,
}

impl CommentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a freshly fetched list. Returns `true` if the cache was replaced.
    pub fn ingest(&mut self, new_comments: Vec<Comment>) -> bool {
        if !should_refresh(&new_comments, self.cached_count) {
            return false;
        }
        self.cached_count = new_comments.len();
        self.comments = new_comments;
        true
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn count(&self) -> usize {
        self.cached_count
    }
}
