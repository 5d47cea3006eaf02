// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking wizard state machine and the store that owns live wizards.
//!
//! ```text
//! Selection(1) ──session──> Time(2) ──> Details(3) ──> ConfirmPay(4)
//!      └──────────package───────────────────┘
//! ```
//!
//! Each guard validates locally first. The geofence check on leaving
//! Selection is done by the caller between [`BookingWizard::check_selection`]
//! and [`BookingWizard::advance_selection`], so no store lock is held across
//! the network call.

use crate::models::booking::UNASSIGNED_TRAINER;
use crate::models::catalog::{find_category, find_package};
use crate::models::{Booking, BookingStatus, Coordinates, UserPackage, UserProfile};
use crate::services::geofence::GeofenceVerdict;
use crate::services::payment::{
    CheckoutNotes, CheckoutPrefill, CheckoutRequest, PaymentBridge, PaymentError, PaymentOutcome,
};
use crate::services::slots::{generate_slots, TimeSlot};
use crate::time_utils::epoch_millis;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// Wizards untouched for this long are dropped.
const WIZARD_TTL_HOURS: i64 = 2;
/// Wizards waiting on a payment callback are kept this long instead.
const PAYMENT_GRACE_HOURS: i64 = 24;
const MIN_PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Selection,
    Time,
    Details,
    ConfirmPay,
}

impl WizardStep {
    /// 1-based position shown in the progress bar.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Selection => 1,
            WizardStep::Time => 2,
            WizardStep::Details => 3,
            WizardStep::ConfirmPay => 4,
        }
    }
}

/// What the client is buying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    #[default]
    Session,
    Package,
}

/// Step 1 input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInput {
    #[serde(default)]
    pub kind: BookingKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub package_id: Option<String>,
    #[serde(default)]
    pub address: String,
    /// Device location, when the client shared it
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Step 2 input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleInput {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
}

/// Step 3 contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerDetails {
    #[validate(custom(function = "validate_required"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "validate_required"))]
    pub apartment_name: String,
    #[validate(custom(function = "validate_required"))]
    pub flat_number: String,
    #[validate(custom(function = "validate_required"))]
    pub gender: String,
}

pub(crate) fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::new("phone_too_short"));
    }
    Ok(())
}

/// Errors from wizard transitions.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Wizard not found")]
    NotFound,

    #[error("Wizard belongs to another user")]
    NotOwner,

    #[error("Wizard is at step {current:?}, not {expected:?}")]
    WrongStep {
        expected: WizardStep,
        current: WizardStep,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("Invalid details")]
    Details(#[from] ValidationErrors),

    #[error("{0}")]
    NotServiceable(String),

    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    #[error("No checkout has been started")]
    NoCheckout,

    #[error("Payment already received; the booking is being saved")]
    AlreadyPaid,

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Persistable result of a successful payment.
#[derive(Debug, Clone, PartialEq)]
pub enum Finalization {
    Booking(Booking),
    Package { user_id: String, package: UserPackage },
}

/// One client's in-progress booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWizard {
    pub id: String,
    pub user_id: String,
    pub step: WizardStep,
    pub kind: BookingKind,
    pub category: Option<String>,
    pub package_id: Option<String>,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    /// Zone that accepted the address on the last geofence check
    pub zone: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub details: CustomerDetails,
    /// Set between checkout and the payment callback
    pub processing: bool,
    /// Set once a successful payment has produced a record to save
    pub finalizing: bool,
    pub created_at: DateTime<Utc>,
    /// Last time a request changed this wizard
    pub updated_at: DateTime<Utc>,
}

impl BookingWizard {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            step: WizardStep::Selection,
            kind: BookingKind::Session,
            category: None,
            package_id: None,
            address: String::new(),
            coordinates: None,
            zone: None,
            date: None,
            time: None,
            details: CustomerDetails::default(),
            processing: false,
            finalizing: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fill blank fields from the client's saved profile.
    pub fn prefill_from(&mut self, profile: &UserProfile) {
        fn fill(field: &mut String, value: &str) {
            if field.is_empty() {
                *field = value.trim().to_string();
            }
        }

        if self.step == WizardStep::Selection {
            fill(&mut self.address, &profile.address);
        }
        fill(&mut self.details.name, &profile.name);
        fill(&mut self.details.phone, &profile.phone_number);
        fill(&mut self.details.apartment_name, &profile.apartment_name);
        fill(&mut self.details.flat_number, &profile.flat_number);
        fill(&mut self.details.gender, &profile.gender);
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected,
                current: self.step,
            });
        }
        Ok(())
    }

    /// Step 1 edits. A new address invalidates cached coordinates.
    pub fn update_selection(&mut self, input: SelectionInput) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Selection)?;

        self.kind = input.kind;
        match input.kind {
            BookingKind::Session => {
                self.category = input.category.map(|c| c.trim().to_string());
                self.package_id = None;
            }
            BookingKind::Package => {
                self.package_id = input.package_id.map(|p| p.trim().to_string());
                self.category = None;
            }
        }

        let address = input.address.trim();
        if address != self.address {
            self.address = address.to_string();
            self.coordinates = None;
            self.zone = None;
        }
        if let Some(coordinates) = input.coordinates.filter(Coordinates::is_valid) {
            self.coordinates = Some(coordinates);
        }
        Ok(())
    }

    /// Local guard for leaving step 1. Runs before any network call.
    pub fn check_selection(&self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Selection)?;

        match self.kind {
            BookingKind::Session => {
                let category = self.category.as_deref().unwrap_or_default();
                if category.is_empty() {
                    return Err(WizardError::Invalid("choose a session category".to_string()));
                }
                if find_category(category).is_none() {
                    return Err(WizardError::Invalid(format!(
                        "unknown session category {:?}",
                        category
                    )));
                }
            }
            BookingKind::Package => {
                let package_id = self.package_id.as_deref().unwrap_or_default();
                if find_package(package_id).is_none() {
                    return Err(WizardError::Invalid("choose a valid package".to_string()));
                }
            }
        }

        if self.address.is_empty() {
            return Err(WizardError::Invalid("enter your address".to_string()));
        }
        Ok(())
    }

    /// Leave step 1 with the verdict of a fresh geofence check.
    pub fn advance_selection(&mut self, verdict: &GeofenceVerdict) -> Result<WizardStep, WizardError> {
        self.check_selection()?;

        if !verdict.serviceable {
            return Err(WizardError::NotServiceable(
                "we do not serve this address yet".to_string(),
            ));
        }

        if verdict.coordinates.is_some() {
            self.coordinates = verdict.coordinates;
        }
        self.zone = verdict.zone.clone();
        self.step = match self.kind {
            BookingKind::Session => WizardStep::Time,
            BookingKind::Package => WizardStep::Details,
        };
        Ok(self.step)
    }

    /// Step 2 edits.
    pub fn set_schedule(&mut self, input: ScheduleInput) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Time)?;
        if input.date.is_some() && input.date != self.date {
            self.time = None;
        }
        if let Some(date) = input.date {
            self.date = Some(date);
        }
        if let Some(time) = input.time {
            self.time = Some(time.trim().to_string());
        }
        Ok(())
    }

    /// Leave step 2. The slot must still be offered at `now`.
    pub fn advance_time(&mut self, now: NaiveDateTime) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Time)?;

        let Some(date) = self.date else {
            return Err(WizardError::Invalid("choose a date".to_string()));
        };
        let Some(label) = self.time.as_deref() else {
            return Err(WizardError::Invalid("choose a time slot".to_string()));
        };

        let slot = TimeSlot::parse(label)
            .ok_or_else(|| WizardError::Invalid(format!("invalid time slot {:?}", label)))?;
        if !generate_slots(date, now).contains(&slot.label()) {
            return Err(WizardError::Invalid(format!(
                "{} on {} is not available",
                slot.label(),
                date
            )));
        }

        self.time = Some(slot.label());
        self.step = WizardStep::Details;
        Ok(self.step)
    }

    /// Step 3 edits.
    pub fn set_details(&mut self, details: CustomerDetails) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details)?;
        self.details = CustomerDetails {
            name: details.name.trim().to_string(),
            phone: details.phone.trim().to_string(),
            apartment_name: details.apartment_name.trim().to_string(),
            flat_number: details.flat_number.trim().to_string(),
            gender: details.gender.trim().to_string(),
        };
        Ok(())
    }

    /// Leave step 3 once every contact field is filled.
    pub fn advance_details(&mut self) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Details)?;

        let mut errors = match self.details.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.address.is_empty() {
            errors.add("address", ValidationError::new("required"));
        }
        if !errors.is_empty() {
            return Err(WizardError::Details(errors));
        }

        self.step = WizardStep::ConfirmPay;
        Ok(self.step)
    }

    /// Go back one step. Package flows skip the time step.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        if self.processing {
            return Err(WizardError::CheckoutInProgress);
        }
        self.step = match (self.step, self.kind) {
            (WizardStep::Selection, _) => WizardStep::Selection,
            (WizardStep::Time, _) => WizardStep::Selection,
            (WizardStep::Details, BookingKind::Package) => WizardStep::Selection,
            (WizardStep::Details, BookingKind::Session) => WizardStep::Time,
            (WizardStep::ConfirmPay, _) => WizardStep::Details,
        };
        Ok(self.step)
    }

    /// Price in whole rupees and the line shown on the checkout widget.
    pub fn price(&self) -> Result<(u32, String), WizardError> {
        match self.kind {
            BookingKind::Session => {
                let category = self
                    .category
                    .as_deref()
                    .and_then(find_category)
                    .ok_or_else(|| WizardError::Invalid("choose a session category".to_string()))?;
                Ok((category.price, format!("{} session", category.name)))
            }
            BookingKind::Package => {
                let package = self
                    .package_id
                    .as_deref()
                    .and_then(find_package)
                    .ok_or_else(|| WizardError::Invalid("choose a valid package".to_string()))?;
                Ok((package.price, package.name.to_string()))
            }
        }
    }

    /// Issue a checkout request and mark the wizard as processing.
    pub fn begin_checkout(
        &mut self,
        bridge: &PaymentBridge,
        email: &str,
    ) -> Result<CheckoutRequest, WizardError> {
        self.expect_step(WizardStep::ConfirmPay)?;
        if self.processing {
            return Err(WizardError::CheckoutInProgress);
        }

        let (price, description) = self.price()?;
        let request = bridge.checkout(
            price,
            &description,
            CheckoutPrefill {
                name: self.details.name.clone(),
                email: email.to_string(),
                contact: self.details.phone.clone(),
            },
            CheckoutNotes {
                wizard_id: self.id.clone(),
                user_id: self.user_id.clone(),
            },
        );

        self.processing = true;
        Ok(request)
    }

    /// Handle the widget callback.
    ///
    /// Success yields the record to persist and marks the wizard
    /// `finalizing`, so a repeated callback cannot yield a second record.
    /// Any failure clears `processing` so the client can try again from the
    /// same step.
    pub fn complete_payment(
        &mut self,
        bridge: &PaymentBridge,
        outcome: PaymentOutcome,
        now: DateTime<Utc>,
    ) -> Result<Finalization, WizardError> {
        self.expect_step(WizardStep::ConfirmPay)?;
        if self.finalizing {
            return Err(WizardError::AlreadyPaid);
        }
        if !self.processing {
            return Err(WizardError::NoCheckout);
        }

        let payment_id = match bridge.resolve(outcome) {
            Ok(id) => id,
            Err(e) => {
                self.processing = false;
                return Err(e.into());
            }
        };

        match self.finalization(&payment_id, now) {
            Ok(finalization) => {
                self.finalizing = true;
                Ok(finalization)
            }
            Err(e) => {
                self.processing = false;
                Err(e)
            }
        }
    }

    /// The paid record could not be saved. The payment stays pending so
    /// the client can replay the same success callback.
    pub fn finalization_failed(&mut self) {
        self.finalizing = false;
    }

    fn finalization(&self, payment_id: &str, now: DateTime<Utc>) -> Result<Finalization, WizardError> {
        let (price, _) = self.price()?;

        match self.kind {
            BookingKind::Session => {
                let (Some(category), Some(date), Some(time)) =
                    (self.category.clone(), self.date, self.time.clone())
                else {
                    return Err(WizardError::Invalid("session is not scheduled".to_string()));
                };

                Ok(Finalization::Booking(Booking {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: self.user_id.clone(),
                    trainer_id: None,
                    trainer_name: UNASSIGNED_TRAINER.to_string(),
                    trainer_email: None,
                    category,
                    date,
                    time,
                    status: BookingStatus::Confirmed,
                    price,
                    address: self.address.clone(),
                    apartment_name: self.details.apartment_name.clone(),
                    flat_number: self.details.flat_number.clone(),
                    latitude: self.coordinates.map(|c| c.latitude),
                    longitude: self.coordinates.map(|c| c.longitude),
                    user_name: self.details.name.clone(),
                    user_phone: self.details.phone.clone(),
                    gender: self.details.gender.clone(),
                    session_notes: String::new(),
                    session_log: String::new(),
                    payment_id: payment_id.to_string(),
                    created_at: epoch_millis(&now),
                }))
            }
            BookingKind::Package => {
                let offer = self
                    .package_id
                    .as_deref()
                    .and_then(find_package)
                    .ok_or_else(|| WizardError::Invalid("choose a valid package".to_string()))?;

                Ok(Finalization::Package {
                    user_id: self.user_id.clone(),
                    package: UserPackage {
                        id: offer.id.to_string(),
                        name: offer.name.to_string(),
                        price: offer.price,
                        total_sessions: offer.total_sessions,
                        sessions_used: 0,
                        purchase_date: now,
                        expiry_date: now + Duration::days(i64::from(offer.validity_days)),
                        is_active: true,
                        payment_id: Some(payment_id.to_string()),
                    },
                })
            }
        }
    }
}

/// Live wizards keyed by wizard ID.
pub struct WizardStore {
    wizards: DashMap<String, BookingWizard>,
    ttl: Duration,
    payment_grace: Duration,
}

impl Default for WizardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardStore {
    pub fn new() -> Self {
        Self {
            wizards: DashMap::new(),
            ttl: Duration::hours(WIZARD_TTL_HOURS),
            payment_grace: Duration::hours(PAYMENT_GRACE_HOURS),
        }
    }

    /// Return the user's live wizard, or start a new one.
    pub fn open(&self, user_id: &str, now: DateTime<Utc>) -> BookingWizard {
        self.prune(now);

        if let Some(mut existing) = self
            .wizards
            .iter_mut()
            .find(|entry| entry.value().user_id == user_id)
        {
            existing.updated_at = existing.updated_at.max(now);
            return existing.value().clone();
        }

        let wizard = BookingWizard::new(user_id, now);
        self.wizards.insert(wizard.id.clone(), wizard.clone());
        tracing::debug!(wizard_id = %wizard.id, user_id, "Started booking wizard");
        wizard
    }

    pub fn get(&self, id: &str, user_id: &str) -> Result<BookingWizard, WizardError> {
        let entry = self.wizards.get(id).ok_or(WizardError::NotFound)?;
        if entry.user_id != user_id {
            return Err(WizardError::NotOwner);
        }
        Ok(entry.value().clone())
    }

    /// Run `f` on the caller's wizard under its shard lock and mark it
    /// touched at `now`.
    ///
    /// `f` must not block; callers do network I/O before or after.
    pub fn with_wizard<T>(
        &self,
        id: &str,
        user_id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut BookingWizard) -> Result<T, WizardError>,
    ) -> Result<T, WizardError> {
        let mut entry = self.wizards.get_mut(id).ok_or(WizardError::NotFound)?;
        if entry.user_id != user_id {
            return Err(WizardError::NotOwner);
        }
        entry.updated_at = entry.updated_at.max(now);
        f(entry.value_mut())
    }

    pub fn remove(&self, id: &str) -> Option<BookingWizard> {
        self.wizards.remove(id).map(|(_, wizard)| wizard)
    }

    /// Drop wizards untouched for longer than the TTL. A wizard waiting on
    /// its payment callback gets the longer payment grace period.
    /// Returns how many were dropped.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let before = self.wizards.len();
        let idle_cutoff = now - self.ttl;
        let payment_cutoff = now - self.payment_grace;
        self.wizards.retain(|_, wizard| {
            let cutoff = if wizard.processing {
                payment_cutoff
            } else {
                idle_cutoff
            };
            wizard.updated_at > cutoff
        });
        let pruned = before.saturating_sub(self.wizards.len());
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned stale booking wizards");
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.wizards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wizards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geofence::MatchKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap()
    }

    fn serviceable() -> GeofenceVerdict {
        GeofenceVerdict {
            serviceable: true,
            matched_by: Some(MatchKind::Keyword),
            zone: Some("HSR Layout".to_string()),
            distance_km: None,
            coordinates: None,
        }
    }

    fn session_selection(address: &str) -> SelectionInput {
        SelectionInput {
            kind: BookingKind::Session,
            category: Some("Pro Training".to_string()),
            address: address.to_string(),
            ..Default::default()
        }
    }

    fn details() -> CustomerDetails {
        CustomerDetails {
            name: "Asha".to_string(),
            phone: "98765 43210".to_string(),
            apartment_name: "Lake View".to_string(),
            flat_number: "B-204".to_string(),
            gender: "female".to_string(),
        }
    }

    fn bridge() -> PaymentBridge {
        PaymentBridge::new("rzp_test_key", "INR", "HomeFit")
    }

    #[test]
    fn test_empty_address_rejected_before_geofence() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard.update_selection(session_selection("   ")).unwrap();
        assert!(matches!(wizard.check_selection(), Err(WizardError::Invalid(_))));
        assert!(wizard.advance_selection(&serviceable()).is_err());
        assert_eq!(wizard.step, WizardStep::Selection);
    }

    #[test]
    fn test_address_change_clears_coordinates() {
        let mut wizard = BookingWizard::new("u1", now());
        let mut input = session_selection("123 HSR Layout");
        input.coordinates = Some(Coordinates::new(12.9121, 77.6446));
        wizard.update_selection(input).unwrap();
        assert!(wizard.coordinates.is_some());

        wizard.update_selection(session_selection("123 HSR Layout")).unwrap();
        assert!(wizard.coordinates.is_some());

        wizard.update_selection(session_selection("9 BTM Layout")).unwrap();
        assert!(wizard.coordinates.is_none());
    }

    #[test]
    fn test_unserviceable_address_stays_on_step_one() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard.update_selection(session_selection("Somewhere else")).unwrap();
        let verdict = GeofenceVerdict {
            serviceable: false,
            matched_by: None,
            zone: None,
            distance_km: None,
            coordinates: None,
        };
        assert!(matches!(
            wizard.advance_selection(&verdict),
            Err(WizardError::NotServiceable(_))
        ));
        assert_eq!(wizard.step, WizardStep::Selection);
    }

    #[test]
    fn test_package_flow_skips_time() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard
            .update_selection(SelectionInput {
                kind: BookingKind::Package,
                package_id: Some("starter-4".to_string()),
                address: "12 HSR Layout".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(wizard.advance_selection(&serviceable()).unwrap(), WizardStep::Details);
        assert_eq!(wizard.back().unwrap(), WizardStep::Selection);
        assert_eq!(wizard.back().unwrap(), WizardStep::Selection);
    }

    #[test]
    fn test_slot_must_be_offered() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard.update_selection(session_selection("123 HSR Layout")).unwrap();
        wizard.advance_selection(&serviceable()).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let at = today.and_hms_opt(18, 10, 0).unwrap();

        wizard
            .set_schedule(ScheduleInput {
                date: Some(today),
                time: Some("05:30 PM".to_string()),
            })
            .unwrap();
        assert!(wizard.advance_time(at).is_err());

        wizard
            .set_schedule(ScheduleInput {
                date: None,
                time: Some("6:30 pm".to_string()),
            })
            .unwrap();
        assert_eq!(wizard.advance_time(at).unwrap(), WizardStep::Details);
        assert_eq!(wizard.time.as_deref(), Some("06:30 PM"));
    }

    #[test]
    fn test_changing_date_clears_time() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard.update_selection(session_selection("123 HSR Layout")).unwrap();
        wizard.advance_selection(&serviceable()).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        wizard
            .set_schedule(ScheduleInput {
                date: Some(today),
                time: Some("07:00 PM".to_string()),
            })
            .unwrap();
        wizard
            .set_schedule(ScheduleInput {
                date: today.succ_opt(),
                time: None,
            })
            .unwrap();
        assert!(wizard.time.is_none());
    }

    #[test]
    fn test_details_require_every_field() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard
            .update_selection(SelectionInput {
                kind: BookingKind::Package,
                package_id: Some("starter-4".to_string()),
                address: "12 HSR Layout".to_string(),
                ..Default::default()
            })
            .unwrap();
        wizard.advance_selection(&serviceable()).unwrap();

        let mut short_phone = details();
        short_phone.phone = "12345".to_string();
        wizard.set_details(short_phone).unwrap();
        assert!(matches!(wizard.advance_details(), Err(WizardError::Details(_))));

        let mut no_flat = details();
        no_flat.flat_number = " ".to_string();
        wizard.set_details(no_flat).unwrap();
        assert!(wizard.advance_details().is_err());

        wizard.set_details(details()).unwrap();
        assert_eq!(wizard.advance_details().unwrap(), WizardStep::ConfirmPay);
    }

    #[test]
    fn test_second_checkout_rejected_and_failure_resets() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard
            .update_selection(SelectionInput {
                kind: BookingKind::Package,
                package_id: Some("transform-12".to_string()),
                address: "12 HSR Layout".to_string(),
                ..Default::default()
            })
            .unwrap();
        wizard.advance_selection(&serviceable()).unwrap();
        wizard.set_details(details()).unwrap();
        wizard.advance_details().unwrap();

        let request = wizard.begin_checkout(&bridge(), "asha@example.com").unwrap();
        assert_eq!(request.amount, 399_900);
        assert!(matches!(
            wizard.begin_checkout(&bridge(), "asha@example.com"),
            Err(WizardError::CheckoutInProgress)
        ));

        let result = wizard.complete_payment(&bridge(), PaymentOutcome::Dismissed, now());
        assert!(matches!(
            result,
            Err(WizardError::Payment(PaymentError::Dismissed))
        ));
        assert!(!wizard.processing);
        assert_eq!(wizard.step, WizardStep::ConfirmPay);
    }

    #[test]
    fn test_package_finalization() {
        let mut wizard = BookingWizard::new("u1", now());
        wizard
            .update_selection(SelectionInput {
                kind: BookingKind::Package,
                package_id: Some("starter-4".to_string()),
                address: "12 HSR Layout".to_string(),
                ..Default::default()
            })
            .unwrap();
        wizard.advance_selection(&serviceable()).unwrap();
        wizard.set_details(details()).unwrap();
        wizard.advance_details().unwrap();
        wizard.begin_checkout(&bridge(), "").unwrap();

        let outcome = PaymentOutcome::Success {
            payment_id: "pay_pkg".to_string(),
        };
        let Finalization::Package { user_id, package } =
            wizard.complete_payment(&bridge(), outcome, now()).unwrap()
        else {
            panic!("expected a package");
        };
        assert_eq!(user_id, "u1");
        assert_eq!(package.total_sessions, 4);
        assert_eq!(package.sessions_used, 0);
        assert!(package.is_active);
        assert_eq!(package.expiry_date, now() + Duration::days(30));
        assert_eq!(package.payment_id.as_deref(), Some("pay_pkg"));
    }

    #[test]
    fn test_prefill_keeps_entered_values() {
        let mut profile = UserProfile::new("u1", None, Some("Asha"), 0);
        profile.address = "12 HSR Layout".to_string();
        profile.phone_number = "9876543210".to_string();

        let mut wizard = BookingWizard::new("u1", now());
        wizard.details.name = "Asha K".to_string();
        wizard.prefill_from(&profile);

        assert_eq!(wizard.address, "12 HSR Layout");
        assert_eq!(wizard.details.name, "Asha K");
        assert_eq!(wizard.details.phone, "9876543210");
    }

    fn package_at_confirm_pay(user_id: &str, at: DateTime<Utc>) -> BookingWizard {
        let mut wizard = BookingWizard::new(user_id, at);
        wizard
            .update_selection(SelectionInput {
                kind: BookingKind::Package,
                package_id: Some("starter-4".to_string()),
                address: "12 HSR Layout".to_string(),
                ..Default::default()
            })
            .unwrap();
        wizard.advance_selection(&serviceable()).unwrap();
        wizard.set_details(details()).unwrap();
        wizard.advance_details().unwrap();
        wizard
    }

    fn success(payment_id: &str) -> PaymentOutcome {
        PaymentOutcome::Success {
            payment_id: payment_id.to_string(),
        }
    }

    #[test]
    fn test_duplicate_success_callback_finalizes_once() {
        let store = WizardStore::new();
        let wizard = package_at_confirm_pay("u1", now());
        let id = wizard.id.clone();
        store.wizards.insert(id.clone(), wizard);

        store
            .with_wizard(&id, "u1", now(), |w| w.begin_checkout(&bridge(), ""))
            .unwrap();
        let first = store.with_wizard(&id, "u1", now(), |w| {
            w.complete_payment(&bridge(), success("pay_1"), now())
        });
        assert!(first.is_ok());

        let second = store.with_wizard(&id, "u1", now(), |w| {
            w.complete_payment(&bridge(), success("pay_1"), now())
        });
        assert!(matches!(second, Err(WizardError::AlreadyPaid)));
        assert!(matches!(
            store.with_wizard(&id, "u1", now(), |w| w.begin_checkout(&bridge(), "")),
            Err(WizardError::CheckoutInProgress)
        ));
    }

    #[test]
    fn test_failed_save_allows_callback_replay() {
        let mut wizard = package_at_confirm_pay("u1", now());
        wizard.begin_checkout(&bridge(), "").unwrap();
        wizard
            .complete_payment(&bridge(), success("pay_1"), now())
            .unwrap();

        wizard.finalization_failed();
        assert!(wizard.processing);
        let Finalization::Package { package, .. } = wizard
            .complete_payment(&bridge(), success("pay_1"), now())
            .unwrap()
        else {
            panic!("expected a package");
        };
        assert_eq!(package.payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn test_wizard_awaiting_payment_survives_prune() {
        let store = WizardStore::new();
        let wizard = package_at_confirm_pay("u1", now());
        let id = wizard.id.clone();
        store.wizards.insert(id.clone(), wizard);

        // Checkout issued just under the idle TTL after the wizard started.
        let checkout_at = now() + Duration::minutes(110);
        store
            .with_wizard(&id, "u1", checkout_at, |w| w.begin_checkout(&bridge(), ""))
            .unwrap();

        // Another user's open prunes the store while the widget is up.
        store.open("u2", now() + Duration::minutes(121));
        store.prune(checkout_at + Duration::hours(3));

        let result = store.with_wizard(&id, "u1", checkout_at + Duration::hours(3), |w| {
            w.complete_payment(&bridge(), success("pay_late"), now())
        });
        assert!(result.is_ok());

        // Abandoned checkouts are eventually dropped.
        assert_eq!(store.prune(checkout_at + Duration::hours(30)), 1);
    }

    #[test]
    fn test_touch_extends_idle_lifetime() {
        let store = WizardStore::new();
        let wizard = store.open("u1", now());
        store
            .with_wizard(&wizard.id, "u1", now() + Duration::minutes(90), |w| {
                w.update_selection(session_selection("12 HSR Layout"))
            })
            .unwrap();

        assert_eq!(store.prune(now() + Duration::minutes(150)), 0);
        assert_eq!(store.prune(now() + Duration::minutes(211)), 1);
    }

    #[test]
    fn test_store_ownership_and_prune() {
        let store = WizardStore::new();
        let wizard = store.open("u1", now());
        assert_eq!(store.open("u1", now()).id, wizard.id);

        assert!(matches!(store.get(&wizard.id, "u2"), Err(WizardError::NotOwner)));
        assert!(matches!(store.get("missing", "u1"), Err(WizardError::NotFound)));

        assert_eq!(store.prune(now() + Duration::hours(1)), 0);
        assert_eq!(store.prune(now() + Duration::hours(3)), 1);
        assert!(store.is_empty());
    }
}
