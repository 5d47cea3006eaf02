// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::{AuthUser, Role};
use crate::models::{Booking, UserPackage, UserProfile, UserProfilePatch};
use crate::services::analytics::AnalyticsEvent;
use crate::services::wizard::{validate_phone, validate_required};
use crate::time_utils::epoch_millis;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/onboarding", put(complete_onboarding))
        .route("/api/me/bookings", get(get_my_bookings))
}

/// Load the caller's profile, creating it from token claims on first use.
pub(crate) async fn load_or_create_profile(
    state: &AppState,
    user: &AuthUser,
) -> Result<UserProfile> {
    if let Some(profile) = state.db.get_user(&user.uid).await? {
        return Ok(profile);
    }

    let profile = UserProfile::new(
        &user.uid,
        user.email.as_deref(),
        user.name.as_deref(),
        epoch_millis(&Utc::now()),
    );
    state.db.upsert_user(&profile).await?;
    tracing::info!(uid = %user.uid, "Created user profile");
    Ok(profile)
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub role: Role,
    pub profile: UserProfile,
    /// Package that currently blocks new bookings
    pub blocking_package: Option<UserPackage>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let profile = load_or_create_profile(&state, &user).await?;
    let blocking_package = profile.blocking_package(Utc::now()).cloned();

    Ok(Json(MeResponse {
        role: user.role,
        profile,
        blocking_package,
    }))
}

// ─── Onboarding ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    #[validate(custom(function = "validate_required"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,
    #[validate(custom(function = "validate_required"))]
    pub address: String,
    #[serde(default)]
    pub apartment_name: String,
    #[serde(default)]
    pub flat_number: String,
    #[validate(custom(function = "validate_required"))]
    pub gender: String,
    #[validate(range(min = 10, max = 100))]
    pub age: Option<u32>,
    #[validate(range(min = 50.0, max = 250.0))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 20.0, max = 300.0))]
    pub weight_kg: Option<f64>,
}

impl OnboardingRequest {
    fn into_patch(self) -> UserProfilePatch {
        UserProfilePatch {
            name: Some(self.name.trim().to_string()),
            phone_number: Some(self.phone_number.trim().to_string()),
            address: Some(self.address.trim().to_string()),
            apartment_name: Some(self.apartment_name.trim().to_string()),
            flat_number: Some(self.flat_number.trim().to_string()),
            gender: Some(self.gender.trim().to_string()),
            age: self.age,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            onboarding_complete: Some(true),
            ..Default::default()
        }
    }
}

/// Save onboarding answers and mark onboarding complete.
async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<OnboardingRequest>,
) -> Result<Json<UserProfile>> {
    body.validate()?;

    let mut profile = load_or_create_profile(&state, &user).await?;
    let patch = body.into_patch();
    state.db.update_user_fields(&user.uid, &patch).await?;
    patch.apply_to(&mut profile);

    tracing::info!(uid = %user.uid, "Onboarding complete");
    state
        .analytics
        .notify(AnalyticsEvent::profile_updated(&profile));

    Ok(Json(profile))
}

// ─── Bookings ────────────────────────────────────────────────

/// The caller's bookings, newest first.
async fn get_my_bookings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Booking>>> {
    let bookings = state.db.bookings_for_user(&user.uid).await?;
    tracing::debug!(uid = %user.uid, count = bookings.len(), "Fetched bookings");
    Ok(Json(bookings))
}
