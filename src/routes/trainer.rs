// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer workspace routes.
//!
//! Trainers see only bookings assigned to them; admins may open any.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AssessmentData, AssessmentSection, Booking, SessionLog};
use crate::services::trainer_session::{
    close_session, record_closure, save_assessment, AssessmentState, ClosureForm,
    SessionWorkspace,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trainer/bookings", get(list_my_bookings))
        .route("/api/trainer/bookings/{id}", get(open_workspace))
        .route("/api/trainer/bookings/{id}/assessment", put(update_assessment))
        .route("/api/trainer/bookings/{id}/close", post(close_booking))
}

/// Load a booking the caller may work on.
async fn load_booking(state: &AppState, user: &AuthUser, id: &str) -> Result<Booking> {
    let booking = state
        .db
        .get_booking(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", id)))?;

    if !user.is_admin() && !booking.is_assigned_to(&user.uid) {
        tracing::warn!(uid = %user.uid, booking_id = id, "Trainer opened unassigned booking");
        return Err(AppError::Forbidden(
            "booking is not assigned to you".to_string(),
        ));
    }
    Ok(booking)
}

async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Booking>>> {
    let bookings = if user.is_admin() {
        state.db.list_bookings().await?
    } else {
        state.db.bookings_for_trainer(&user.uid).await?
    };
    Ok(Json(bookings))
}

async fn open_workspace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SessionWorkspace>> {
    let booking = load_booking(&state, &user, &id).await?;
    let profile = state.db.get_user(&booking.user_id).await?;
    if profile.is_none() {
        tracing::warn!(booking_id = %id, user_id = %booking.user_id, "Client profile missing");
    }

    Ok(Json(SessionWorkspace::open(booking, profile.as_ref())))
}

#[derive(Debug, Deserialize)]
pub struct AssessmentUpdate {
    pub sections: Vec<AssessmentSection>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub assessment: AssessmentData,
    pub state: AssessmentState,
}

/// Save assessment sections. Rejected once the assessment is locked.
async fn update_assessment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<AssessmentUpdate>,
) -> Result<Json<AssessmentResponse>> {
    if body.sections.is_empty() {
        return Err(AppError::BadRequest("no sections to save".to_string()));
    }

    let booking = load_booking(&state, &user, &id).await?;
    let profile = state
        .db
        .get_user(&booking.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", booking.user_id)))?;

    let assessment = save_assessment(
        profile.latest_assessment,
        body.sections,
        user.display_name(),
        Utc::now(),
    )?;
    state
        .db
        .save_assessment(&booking.user_id, &assessment)
        .await?;

    let assessment_state = AssessmentState::of(Some(&assessment));
    tracing::info!(
        booking_id = %id,
        user_id = %booking.user_id,
        state = ?assessment_state,
        "Assessment saved"
    );

    Ok(Json(AssessmentResponse {
        assessment,
        state: assessment_state,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseResponse {
    pub booking: Booking,
    pub log: SessionLog,
}

/// Close the session: validate, append the log, complete the booking.
async fn close_booking(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(form): Json<ClosureForm>,
) -> Result<Json<CloseResponse>> {
    // Rejected before any database access.
    form.validate()?;

    let booking = load_booking(&state, &user, &id).await?;

    let log = close_session(&booking, &form, &user.uid, user.display_name(), Utc::now())?;
    let booking = record_closure(&state.db, &state.analytics, booking, &log).await?;

    Ok(Json(CloseResponse { booking, log }))
}
