// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HomeFit API Server
//!
//! Serves the booking wizard, trainer workspace and admin console for
//! at-home personal training.

use homefit::{config::Config, db::FirestoreDb, services::ZoneService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting HomeFit API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    // Load service zones
    tracing::info!(path = %config.zones_path, "Loading service zones");
    let zones = ZoneService::load_from_file(&config.zones_path, config.zone_radius_km)?;
    tracing::info!(
        count = zones.zones().len(),
        radius_km = zones.radius_km(),
        "Service zones loaded"
    );

    if config.analytics_webhook_url.is_none() {
        tracing::warn!("ANALYTICS_WEBHOOK_URL not set, analytics events will be dropped");
    }

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, zones)?);

    // Build router
    let app = homefit::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,homefit=debug"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
