// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pintour demo driver
//!
//! Loads a tour from GeoJSON and walks it with a simulated walker: each
//! route is replayed as position fixes, arrival is triggered at its end,
//! and the arrived pin is opened, liked, and closed again.

use pintour::{
    config::Config,
    models::Waypoint,
    runtime::{PinViewDeps, PinViewHandle, TourDeps, TourHandle},
    services::{
        load_tour_from_file, ChannelSink, InMemoryDirectory, LoggingSink, MapboxDirections,
        PinDirectory, PresentationEvent, ReplayPositioning, RoutingProvider, StraightLineRouter,
    },
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(user = %config.user_id, "Starting Pintour demo");

    tracing::info!(path = %config.tour_file.display(), "Loading tour");
    let waypoints = load_tour_from_file(&config.tour_file).expect("Failed to load tour");

    let directory = InMemoryDirectory::new();
    seed_directory(&directory, &waypoints);

    let routing: Arc<dyn RoutingProvider> = match &config.mapbox_access_token {
        Some(token) => {
            tracing::info!(base_url = %config.mapbox_base_url, "Using Mapbox directions");
            Arc::new(MapboxDirections::new(config.mapbox_base_url.clone(), token.clone()))
        }
        None => {
            tracing::info!("No Mapbox token, using straight-line routing");
            Arc::new(StraightLineRouter)
        }
    };

    let (sink, mut events) = ChannelSink::new();
    let directory: Arc<dyn PinDirectory> = Arc::new(directory);

    let tour = TourHandle::spawn(
        TourDeps {
            user: config.user_id.clone(),
            routing,
            directory: Arc::clone(&directory),
            positioning: Arc::new(ReplayPositioning::new(vec![config.default_location])),
            sink: Arc::new(sink),
            min_distance_meters: config.min_distance_meters,
        },
        waypoints,
        0,
    )?;

    let view_deps = PinViewDeps {
        user: config.user_id.clone(),
        directory,
        sink: Arc::new(LoggingSink),
    };

    while let Some(event) = events.recv().await {
        match event {
            PresentationEvent::RouteReady(route) => {
                tracing::info!(
                    distance_m = route.distance_meters,
                    steps = route.steps.len(),
                    "Walking route"
                );
                for fix in route.coordinates() {
                    tour.push_position(fix)?;
                }
                let outcome = tour.arrived().await?;

                let view = PinViewHandle::open(view_deps.clone(), outcome.arrived.clone());
                view.toggle_like()?;
                let flushed = view.close().await?;
                tracing::info!(pin_id = %outcome.arrived.id, ?flushed, "Left pin");
            }
            PresentationEvent::RouteFailed(reason) => {
                tracing::warn!(error = %reason, "Giving up on tour");
                tour.end_tour().await?;
            }
            PresentationEvent::ArrivalProcessed { next, has_next } => {
                tracing::info!(next = ?next.map(|w| w.label), has_next, "Next stop");
            }
            PresentationEvent::TourCompleted(reason) => {
                tracing::info!(?reason, "Tour over");
                break;
            }
            other => tracing::debug!(event = ?other, "Presentation event"),
        }
    }

    let summary = tour.join().await?;
    tracing::info!(
        visited = summary.visited,
        total = summary.total,
        "Demo finished"
    );
    Ok(())
}

/// Register the tour's pins, plus a couple of comments, in the directory.
fn seed_directory(directory: &InMemoryDirectory, waypoints: &[Waypoint]) {
    for pin in waypoints {
        directory.insert_pin(pin.clone());
        directory.add_comment(&pin.id, &pin.owner, &format!("Welcome to {}", pin.label));
    }
    tracing::info!(count = waypoints.len(), "Directory seeded");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pintour=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
