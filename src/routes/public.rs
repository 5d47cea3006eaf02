// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public routes: catalog, slots and address checks.

use crate::error::{AppError, Result};
use crate::models::catalog::{PACKAGE_OFFERS, SESSION_CATEGORIES};
use crate::models::zone::ZoneSummary;
use crate::models::{Coordinates, PackageOffer, SessionCategory};
use crate::services::geofence::GeofenceVerdict;
use crate::services::slots::{generate_slots, DaySlots};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/catalog", get(get_catalog))
        .route("/api/trainers", get(get_trainers))
        .route("/api/slots", get(get_slots))
        .route("/api/geofence/check", post(check_geofence))
        .route("/api/geocode/reverse", post(reverse_geocode))
}

// ─── Catalog ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatalogResponse {
    pub categories: Vec<SessionCategory>,
    pub packages: Vec<PackageOffer>,
    pub zones: Vec<ZoneSummary>,
    pub zone_radius_km: f64,
}

async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let zones = state.geofence.zones();
    Json(CatalogResponse {
        categories: SESSION_CATEGORIES.to_vec(),
        packages: PACKAGE_OFFERS.to_vec(),
        zones: zones.summaries(),
        zone_radius_km: zones.radius_km(),
    })
}

/// Trainer card shown to clients. Contact details stay private.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrainerCard {
    pub uid: String,
    pub name: String,
    pub specialties: Vec<String>,
    pub bio: String,
}

async fn get_trainers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TrainerCard>>> {
    let trainers = state
        .db
        .list_trainers()
        .await?
        .into_iter()
        .filter(|t| t.active)
        .map(|t| TrainerCard {
            uid: t.uid,
            name: t.name,
            specialties: t.specialties,
            bio: t.bio,
        })
        .collect();
    Ok(Json(trainers))
}

// ─── Slots ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct SlotsQuery {
    date: NaiveDate,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SlotsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub slots: DaySlots,
}

/// Slots for a date, as seen now in the service timezone.
async fn get_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SlotsQuery>,
) -> Json<SlotsResponse> {
    let now = state.now().naive_local();
    Json(SlotsResponse {
        date: params.date,
        slots: generate_slots(params.date, now),
    })
}

// ─── Address checks ──────────────────────────────────────────

#[derive(Deserialize)]
struct GeofenceRequest {
    #[serde(default)]
    address: String,
    #[serde(default)]
    coordinates: Option<Coordinates>,
}

async fn check_geofence(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GeofenceRequest>,
) -> Result<Json<GeofenceVerdict>> {
    let address = body.address.trim();
    if address.is_empty() {
        return Err(AppError::BadRequest("address is required".to_string()));
    }

    let verdict = state.geofence.check(address, body.coordinates).await;
    Ok(Json(verdict))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReverseGeocodeResponse {
    pub address: String,
}

/// Describe device coordinates for the address field.
async fn reverse_geocode(
    State(state): State<Arc<AppState>>,
    Json(coordinates): Json<Coordinates>,
) -> Result<Json<ReverseGeocodeResponse>> {
    if !coordinates.is_valid() {
        return Err(AppError::BadRequest(
            "coordinates out of range".to_string(),
        ));
    }

    let address = state.geofence.geocoder().reverse(coordinates).await;
    Ok(Json(ReverseGeocodeResponse { address }))
}
