// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking wizard routes.
//!
//! The wizard lives in the in-memory store between requests. Handlers only
//! touch it through `WizardStore::with_wizard`, and every network call
//! (geofence, database) happens outside that closure.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::UserPackage;
use crate::routes::api::load_or_create_profile;
use crate::services::booking::{finalize, Confirmation};
use crate::services::payment::{CheckoutRequest, PaymentOutcome};
use crate::services::slots::{generate_slots, DaySlots};
use crate::services::wizard::{
    BookingWizard, CustomerDetails, ScheduleInput, SelectionInput, WizardError, WizardStep,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/wizard", post(start_wizard))
        .route("/api/wizard/{id}", get(get_wizard))
        .route("/api/wizard/{id}/selection", put(update_selection))
        .route("/api/wizard/{id}/schedule", put(update_schedule))
        .route("/api/wizard/{id}/details", put(update_details))
        .route("/api/wizard/{id}/next", post(next_step))
        .route("/api/wizard/{id}/back", post(previous_step))
        .route("/api/wizard/{id}/checkout", post(checkout))
        .route("/api/wizard/{id}/payment", post(payment_callback))
}

/// Wizard state plus what the current step needs to render.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardResponse {
    pub wizard: BookingWizard,
    pub step_number: u8,
    /// Slots for the chosen date while on the time step
    pub slots: Option<DaySlots>,
    /// Price in whole rupees once something is selected
    pub price: Option<u32>,
}

impl WizardResponse {
    fn new(state: &AppState, wizard: BookingWizard) -> Self {
        let slots = match (wizard.step, wizard.date) {
            (WizardStep::Time, Some(date)) => Some(generate_slots(date, state.now().naive_local())),
            _ => None,
        };
        let price = wizard.price().ok().map(|(price, _)| price);

        Self {
            step_number: wizard.step.number(),
            slots,
            price,
            wizard,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartResponse {
    /// An active package already covers the user; no steps are shown.
    Blocked { package: UserPackage },
    Ready(WizardResponse),
}

/// Open the caller's wizard unless an active package blocks booking.
async fn start_wizard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StartResponse>> {
    let profile = load_or_create_profile(&state, &user).await?;
    let now = Utc::now();

    if let Some(package) = profile.blocking_package(now) {
        tracing::info!(uid = %user.uid, package_id = %package.id, "Booking blocked by active package");
        return Ok(Json(StartResponse::Blocked {
            package: package.clone(),
        }));
    }

    let wizard = state.wizards.open(&user.uid, now);
    let wizard = state.wizards.with_wizard(&wizard.id, &user.uid, now, |w| {
        w.prefill_from(&profile);
        Ok(w.clone())
    })?;

    Ok(Json(StartResponse::Ready(WizardResponse::new(&state, wizard))))
}

async fn get_wizard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<WizardResponse>> {
    let wizard = state.wizards.get(&id, &user.uid)?;
    Ok(Json(WizardResponse::new(&state, wizard)))
}

async fn update_selection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<SelectionInput>,
) -> Result<Json<WizardResponse>> {
    let wizard = state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
        w.update_selection(input)?;
        Ok(w.clone())
    })?;
    Ok(Json(WizardResponse::new(&state, wizard)))
}

async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<ScheduleInput>,
) -> Result<Json<WizardResponse>> {
    let wizard = state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
        w.set_schedule(input)?;
        Ok(w.clone())
    })?;
    Ok(Json(WizardResponse::new(&state, wizard)))
}

async fn update_details(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(details): Json<CustomerDetails>,
) -> Result<Json<WizardResponse>> {
    let wizard = state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
        w.set_details(details)?;
        Ok(w.clone())
    })?;
    Ok(Json(WizardResponse::new(&state, wizard)))
}

/// Run the current step's guard and advance.
async fn next_step(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<WizardResponse>> {
    let snapshot = state.wizards.get(&id, &user.uid)?;

    let wizard = match snapshot.step {
        WizardStep::Selection => {
            snapshot.check_selection()?;

            // Re-checked on every attempt, even for an unchanged address.
            let verdict = state
                .geofence
                .check(&snapshot.address, snapshot.coordinates)
                .await;

            state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
                if w.address != snapshot.address {
                    return Err(WizardError::Invalid(
                        "address changed during the check, try again".to_string(),
                    ));
                }
                w.advance_selection(&verdict)?;
                Ok(w.clone())
            })?
        }
        WizardStep::Time => {
            let now = state.now().naive_local();
            state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
                w.advance_time(now)?;
                Ok(w.clone())
            })?
        }
        WizardStep::Details => state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
            w.advance_details()?;
            Ok(w.clone())
        })?,
        WizardStep::ConfirmPay => {
            return Err(AppError::Conflict(
                "already at the last step; confirm and pay".to_string(),
            ))
        }
    };

    tracing::debug!(wizard_id = %id, step = ?wizard.step, "Wizard advanced");
    Ok(Json(WizardResponse::new(&state, wizard)))
}

async fn previous_step(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<WizardResponse>> {
    let wizard = state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
        w.back()?;
        Ok(w.clone())
    })?;
    Ok(Json(WizardResponse::new(&state, wizard)))
}

/// Issue the checkout request for the widget.
async fn checkout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<CheckoutRequest>> {
    // Ownership check before any database read.
    state.wizards.get(&id, &user.uid)?;

    let profile = load_or_create_profile(&state, &user).await?;
    if profile.blocking_package(Utc::now()).is_some() {
        return Err(AppError::Conflict(
            "an active package already covers your sessions".to_string(),
        ));
    }

    let email = user.email.clone().unwrap_or(profile.email);
    let request = state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
        w.begin_checkout(&state.payments, &email)
    })?;

    tracing::info!(
        wizard_id = %id,
        uid = %user.uid,
        amount = request.amount,
        "Checkout issued"
    );
    Ok(Json(request))
}

/// Widget callback: finalize on success, reset on failure.
///
/// A success marks the wizard `finalizing` under its lock, so a duplicate
/// callback arriving while the record is being written gets a conflict.
async fn payment_callback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(outcome): Json<PaymentOutcome>,
) -> Result<Json<Confirmation>> {
    let now = Utc::now();
    let finalization = state.wizards.with_wizard(&id, &user.uid, now, |w| {
        w.complete_payment(&state.payments, outcome, now)
    })?;

    match finalize(&state.db, &state.analytics, finalization).await {
        Ok(confirmation) => {
            state.wizards.remove(&id);
            Ok(Json(confirmation))
        }
        Err(e) => {
            tracing::error!(wizard_id = %id, error = %e, "Paid wizard could not be saved");
            let _ = state.wizards.with_wizard(&id, &user.uid, Utc::now(), |w| {
                w.finalization_failed();
                Ok(())
            });
            Err(e)
        }
    }
}
