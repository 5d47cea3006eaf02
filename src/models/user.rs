//! User profile model for storage and API.

use crate::models::{AssessmentData, SessionLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore (`users/{uid}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth provider uid (also used as document ID)
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,

    // ─── Address ─────────────────────────────────────────────────
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub apartment_name: String,
    #[serde(default)]
    pub flat_number: String,

    // ─── Demographics ────────────────────────────────────────────
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,

    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub active_package: Option<UserPackage>,
    #[serde(default)]
    pub latest_assessment: Option<AssessmentData>,
    /// Completed sessions, in append order
    #[serde(default)]
    pub session_history: Vec<SessionLog>,
    /// When the profile was first created (Unix epoch milliseconds)
    #[serde(default)]
    pub created_at: i64,
}

impl UserProfile {
    /// Fresh profile for a user seen for the first time.
    pub fn new(uid: &str, email: Option<&str>, name: Option<&str>, created_at: i64) -> Self {
        Self {
            uid: uid.to_string(),
            email: email.unwrap_or_default().to_string(),
            name: name.unwrap_or_default().to_string(),
            phone_number: String::new(),
            address: String::new(),
            apartment_name: String::new(),
            flat_number: String::new(),
            gender: String::new(),
            age: None,
            height_cm: None,
            weight_kg: None,
            onboarding_complete: false,
            active_package: None,
            latest_assessment: None,
            session_history: Vec::new(),
            created_at,
        }
    }

    /// Package that still blocks new bookings, if any.
    pub fn blocking_package(&self, now: DateTime<Utc>) -> Option<&UserPackage> {
        self.active_package
            .as_ref()
            .filter(|package| package.is_in_force(now))
    }

    /// Session history sorted newest first.
    pub fn history_newest_first(&self) -> Vec<SessionLog> {
        let mut history: Vec<SessionLog> = self.session_history.iter().rev().cloned().collect();
        // Stable sort: logs from the same day stay latest-appended first.
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }
}

/// A prepaid bundle of sessions embedded in the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPackage {
    pub id: String,
    pub name: String,
    /// Price in whole rupees
    pub price: u32,
    pub total_sessions: u32,
    /// Never incremented: package consumption is not implemented.
    #[serde(default)]
    pub sessions_used: u32,
    pub purchase_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl UserPackage {
    /// Active and not yet expired.
    pub fn is_in_force(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expiry_date > now
    }
}

/// Partial update of a user profile (onboarding, admin support edits).
///
/// Only `Some` fields are serialized and written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_package: Option<UserPackage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_assessment: Option<AssessmentData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_history: Option<Vec<SessionLog>>,
}

impl UserProfilePatch {
    /// Firestore field paths present in this patch.
    pub fn field_paths(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("email", self.email.is_some()),
            ("phoneNumber", self.phone_number.is_some()),
            ("address", self.address.is_some()),
            ("apartmentName", self.apartment_name.is_some()),
            ("flatNumber", self.flat_number.is_some()),
            ("gender", self.gender.is_some()),
            ("age", self.age.is_some()),
            ("heightCm", self.height_cm.is_some()),
            ("weightKg", self.weight_kg.is_some()),
            ("onboardingComplete", self.onboarding_complete.is_some()),
            ("activePackage", self.active_package.is_some()),
            ("latestAssessment", self.latest_assessment.is_some()),
            ("sessionHistory", self.session_history.is_some()),
        ]
        .into_iter()
        .filter_map(|(path, present)| present.then_some(path))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Apply the patch to an in-memory profile (mirrors the merge write).
    pub fn apply_to(self, profile: &mut UserProfile) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field { profile.$field = value; })*
            };
        }
        merge!(
            name,
            email,
            phone_number,
            address,
            apartment_name,
            flat_number,
            gender,
            onboarding_complete,
            session_history
        );
        if self.age.is_some() {
            profile.age = self.age;
        }
        if self.height_cm.is_some() {
            profile.height_cm = self.height_cm;
        }
        if self.weight_kg.is_some() {
            profile.weight_kg = self.weight_kg;
        }
        if self.active_package.is_some() {
            profile.active_package = self.active_package;
        }
        if self.latest_assessment.is_some() {
            profile.latest_assessment = self.latest_assessment;
        }
    }
}
