// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console routes: bookings, users and trainers.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Booking, BookingQuickEdit, BookingStatus, Trainer, UserProfile, UserProfilePatch};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/bookings", get(list_bookings))
        .route(
            "/api/admin/bookings/{id}",
            patch(quick_edit_booking).delete(delete_booking),
        )
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{uid}", patch(update_user))
        .route("/api/admin/trainers", get(list_trainers))
        .route("/api/admin/trainers/{uid}", put(upsert_trainer))
}

// ─── Bookings ────────────────────────────────────────────────

#[derive(Deserialize)]
struct BookingsQuery {
    status: Option<BookingStatus>,
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;

#[derive(Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
    pub page: u32,
    pub per_page: u32,
    /// Total number of bookings matching the filter
    pub total: u32,
}

/// Slice one page (1-indexed) out of an in-memory list.
pub fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Result<Vec<T>> {
    if page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }

    let start = (page as usize - 1)
        .checked_mul(per_page as usize)
        .ok_or_else(|| AppError::BadRequest("Page number causes overflow".to_string()))?;

    if start >= items.len() {
        return Ok(vec![]);
    }
    let end = start.saturating_add(per_page as usize).min(items.len());
    Ok(items[start..end].to_vec())
}

async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }
    let per_page = params.per_page.clamp(1, MAX_PER_PAGE);

    let bookings: Vec<Booking> = state
        .db
        .list_bookings()
        .await?
        .into_iter()
        .filter(|b| params.status.map_or(true, |status| b.status == status))
        .collect();

    let total = bookings.len() as u32;
    let page = paginate(&bookings, params.page, per_page)?;

    Ok(Json(BookingsResponse {
        bookings: page,
        page: params.page,
        per_page,
        total,
    }))
}

/// Change status and/or trainer. Only fields that differ are written.
async fn quick_edit_booking(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(edit): Json<BookingQuickEdit>,
) -> Result<Json<Booking>> {
    let mut booking = state
        .db
        .get_booking(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", id)))?;

    let trainer = match edit.trainer_change(&booking) {
        Some(trainer_uid) if !trainer_uid.is_empty() => Some(
            state
                .db
                .get_trainer(trainer_uid)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("trainer {}", trainer_uid)))?,
        ),
        _ => None,
    };

    let patch = edit.diff(&booking, trainer.as_ref());
    if patch.is_empty() {
        tracing::debug!(booking_id = %id, "Quick edit changed nothing");
        return Ok(Json(booking));
    }

    state.db.update_booking_fields(&id, &patch).await?;
    patch.apply_to(&mut booking);

    tracing::info!(
        booking_id = %id,
        admin = %admin.uid,
        fields = ?patch.field_paths(),
        "Booking updated by admin"
    );
    Ok(Json(booking))
}

async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.db.delete_booking(&id).await?;
    tracing::info!(booking_id = %id, admin = %admin.uid, "Booking deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Users ───────────────────────────────────────────────────

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserProfile>>> {
    let mut users = state.db.list_users().await?;
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(users))
}

/// Support edit: merge the given fields into the profile.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(uid): Path<String>,
    Json(patch): Json<UserProfilePatch>,
) -> Result<Json<UserProfile>> {
    let mut profile = state
        .db
        .get_user(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", uid)))?;

    if patch.is_empty() {
        return Ok(Json(profile));
    }

    state.db.update_user_fields(&uid, &patch).await?;
    tracing::info!(uid = %uid, admin = %admin.uid, fields = ?patch.field_paths(), "User updated by admin");
    patch.apply_to(&mut profile);

    Ok(Json(profile))
}

// ─── Trainers ────────────────────────────────────────────────

async fn list_trainers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Trainer>>> {
    Ok(Json(state.db.list_trainers().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

async fn upsert_trainer(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(input): Json<TrainerInput>,
) -> Result<Json<Trainer>> {
    let trainer = Trainer {
        uid,
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: input.phone.trim().to_string(),
        specialties: input.specialties,
        bio: input.bio,
        active: input.active,
    };
    trainer.validate()?;

    state.db.upsert_trainer(&trainer).await?;
    tracing::info!(trainer_uid = %trainer.uid, active = trainer.active, "Trainer saved");
    Ok(Json(trainer))
}
