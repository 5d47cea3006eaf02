// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer workspace over one booking: client profile, assessment,
//! history and session closure.
//!
//! The decision logic here is pure. [`record_closure`] performs the writes
//! for a validated closure, in order and without a transaction.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{
    AssessmentData, AssessmentSection, Booking, BookingPatch, BookingStatus, SessionLog,
    UserPackage, UserProfile,
};
use crate::services::analytics::{AnalyticsEvent, AnalyticsWebhook};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// Shortest accepted activity summary, counted after trimming.
pub const MIN_SUMMARY_CHARS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentState {
    /// Nothing saved yet
    Empty,
    /// Saved, but no medical conditions recorded
    Editable,
    /// Medical conditions recorded; read-only from now on
    Locked,
}

impl AssessmentState {
    pub fn of(assessment: Option<&AssessmentData>) -> Self {
        match assessment {
            None => AssessmentState::Empty,
            Some(a) if a.is_locked() => AssessmentState::Locked,
            Some(_) => AssessmentState::Editable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseState {
    Open,
    Completed,
}

/// Read-only client information for the profile tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub apartment_name: String,
    pub flat_number: String,
    pub gender: String,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub active_package: Option<UserPackage>,
}

impl ClientSummary {
    /// Build from the profile, or from the booking's contact fields when the
    /// profile is missing.
    fn new(booking: &Booking, profile: Option<&UserProfile>) -> Self {
        match profile {
            Some(p) => Self {
                uid: p.uid.clone(),
                name: p.name.clone(),
                email: p.email.clone(),
                phone_number: p.phone_number.clone(),
                address: p.address.clone(),
                apartment_name: p.apartment_name.clone(),
                flat_number: p.flat_number.clone(),
                gender: p.gender.clone(),
                age: p.age,
                height_cm: p.height_cm,
                weight_kg: p.weight_kg,
                active_package: p.active_package.clone(),
            },
            None => Self {
                uid: booking.user_id.clone(),
                name: booking.user_name.clone(),
                email: String::new(),
                phone_number: booking.user_phone.clone(),
                address: booking.address.clone(),
                apartment_name: booking.apartment_name.clone(),
                flat_number: booking.flat_number.clone(),
                gender: booking.gender.clone(),
                age: None,
                height_cm: None,
                weight_kg: None,
                active_package: None,
            },
        }
    }
}

/// Everything the trainer sees when opening a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWorkspace {
    pub booking: Booking,
    pub profile: ClientSummary,
    pub assessment_state: AssessmentState,
    pub assessment: Option<AssessmentData>,
    /// Newest first
    pub history: Vec<SessionLog>,
    pub close_state: CloseState,
}

impl SessionWorkspace {
    pub fn open(booking: Booking, profile: Option<&UserProfile>) -> Self {
        let assessment = profile.and_then(|p| p.latest_assessment.clone());
        let history = profile
            .map(UserProfile::history_newest_first)
            .unwrap_or_default();
        let close_state = if booking.status == BookingStatus::Completed {
            CloseState::Completed
        } else {
            CloseState::Open
        };

        Self {
            profile: ClientSummary::new(&booking, profile),
            assessment_state: AssessmentState::of(assessment.as_ref()),
            assessment,
            history,
            close_state,
            booking,
        }
    }
}

/// Errors from the trainer workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Assessment is locked")]
    AssessmentLocked,

    #[error("Session is already completed")]
    AlreadyCompleted,

    #[error("Invalid closure")]
    Invalid(#[from] ValidationErrors),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::AssessmentLocked | WorkflowError::AlreadyCompleted => {
                AppError::Conflict(err.to_string())
            }
            WorkflowError::Invalid(errors) => errors.into(),
        }
    }
}

/// Apply section updates on top of the current assessment and sign it.
pub fn save_assessment(
    current: Option<AssessmentData>,
    sections: Vec<AssessmentSection>,
    trainer_name: &str,
    at: DateTime<Utc>,
) -> Result<AssessmentData, WorkflowError> {
    let current = current.unwrap_or_default();
    if current.is_locked() {
        return Err(WorkflowError::AssessmentLocked);
    }

    let updated = sections
        .into_iter()
        .fold(current, AssessmentData::apply)
        .signed(trainer_name, &format_utc_rfc3339(at));
    Ok(updated)
}

/// Closure form submitted from the close tab.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClosureForm {
    #[validate(custom(function = "validate_summary"))]
    pub activities_done: String,
    #[validate(range(min = 1, max = 5))]
    pub comfort_level: u8,
    #[serde(default)]
    pub focus_for_next: String,
    #[serde(default)]
    pub notes: String,
}

fn validate_summary(summary: &str) -> Result<(), ValidationError> {
    if summary.trim().chars().count() < MIN_SUMMARY_CHARS {
        return Err(ValidationError::new("summary_too_short"));
    }
    Ok(())
}

/// Validate a closure and build the log to append.
pub fn close_session(
    booking: &Booking,
    form: &ClosureForm,
    trainer_id: &str,
    trainer_name: &str,
    logged_at: DateTime<Utc>,
) -> Result<SessionLog, WorkflowError> {
    if booking.status == BookingStatus::Completed {
        return Err(WorkflowError::AlreadyCompleted);
    }
    form.validate()?;

    Ok(SessionLog {
        booking_id: booking.id.clone(),
        date: booking.date,
        trainer_id: trainer_id.to_string(),
        trainer_name: trainer_name.to_string(),
        completed: true,
        comfort_level: form.comfort_level,
        activities_done: form.activities_done.trim().to_string(),
        focus_for_next: form.focus_for_next.trim().to_string(),
        notes: form.notes.trim().to_string(),
        logged_at: format_utc_rfc3339(logged_at),
    })
}

/// Persist a closure: append the log, complete the booking, notify.
///
/// A failure part-way leaves the earlier writes in place.
pub async fn record_closure(
    db: &FirestoreDb,
    analytics: &AnalyticsWebhook,
    mut booking: Booking,
    log: &SessionLog,
) -> Result<Booking, AppError> {
    db.append_session_log(&booking.user_id, log).await?;

    let patch = BookingPatch {
        status: Some(BookingStatus::Completed),
        session_log: Some(log.activities_done.clone()),
        ..Default::default()
    };
    db.update_booking_fields(&booking.id, &patch).await?;
    patch.apply_to(&mut booking);

    tracing::info!(
        booking_id = %booking.id,
        user_id = %booking.user_id,
        comfort_level = log.comfort_level,
        "Session closed"
    );
    analytics.notify(AnalyticsEvent::session_completed(&booking, log));

    Ok(booking)
}
