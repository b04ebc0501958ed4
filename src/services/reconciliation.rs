// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot flush of a pin view's pending like on teardown.

use crate::services::engagement::{EngagementCounter, FlushOutcome};

/// Fires the engagement flush exactly once per view instance.
#[derive(Debug, Default)]
pub struct ReconciliationScheduler {
    fired: bool,
}

impl ReconciliationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the view's "about to close" signal.
    ///
    /// The first call flushes the counter; later calls return `NoOp` without
    /// touching it. A view closed before any toggle never flushes.
    pub fn on_view_closing(&mut self, counter: &mut EngagementCounter) -> FlushOutcome {
        if self.fired {
            tracing::debug!("Reconciliation already ran for this view");
            return FlushOutcome::NoOp;
        }
        self.fired = true;

        if !counter.has_pending() {
            return FlushOutcome::NoOp;
        }
        counter.flush_if_needed()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
