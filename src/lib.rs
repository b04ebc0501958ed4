// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pintour: guided walking tours through pins, with live engagement counters
//!
//! This crate provides the tour sequencing state machine and the
//! optimistic like reconciliation used while a pin is on screen.

pub mod config;
pub mod error;
pub mod models;
pub mod runtime;
pub mod services;
