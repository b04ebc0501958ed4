// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for tour sequencing and engagement reconciliation.

/// Errors surfaced by the tour and pin-view core.
///
/// None of these are fatal to the process; each is scoped to the session or
/// view that produced it.
#[derive(Debug, thiserror::Error)]
pub enum TourError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation {operation} not valid in phase {phase}")]
    InvalidTransition {
        phase: &'static str,
        operation: &'static str,
    },

    #[error("Routing failed: {0}")]
    Routing(#[from] RoutingError),

    #[error("Directory write failed: {0}")]
    DirectoryWrite(String),

    #[error("Directory query failed: {0}")]
    Directory(String),

    #[error("Positioning unavailable")]
    PositioningUnavailable,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TourError {
    /// Whether this error should take down the process. Always false.
    pub fn is_fatal(&self) -> bool {
        false
    }

    /// Whether the caller may retry the failed operation (next position fix).
    pub fn is_retryable(&self) -> bool {
        matches!(self, TourError::Routing(_))
    }
}

/// Failures reported by a routing provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    #[error("No route found")]
    NoRoute,

    #[error("Routing provider error: {0}")]
    Provider(String),

    #[error("Invalid routing response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for the core.
pub type Result<T> = std::result::Result<T, TourError>;
