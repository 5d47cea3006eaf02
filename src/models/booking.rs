// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Booking model for storage and API.

use crate::models::Trainer;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trainer name shown until an admin assigns someone.
pub const UNASSIGNED_TRAINER: &str = "Unassigned";

/// Lifecycle status of a booking.
///
/// Transitions are expected to go `confirmed -> completed | cancelled`, but
/// nothing enforces it: admins and trainers may write any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

/// Stored booking record in Firestore (`bookings/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Generated booking ID (also used as document ID)
    pub id: String,
    /// Owning user's uid
    pub user_id: String,
    /// Assigned trainer's uid
    #[serde(default)]
    pub trainer_id: Option<String>,
    #[serde(default = "unassigned")]
    pub trainer_name: String,
    #[serde(default)]
    pub trainer_email: Option<String>,
    /// Session category (e.g. "Pro Training")
    pub category: String,
    /// Session date (ISO 8601 calendar date)
    pub date: NaiveDate,
    /// Slot display label (e.g. "05:30 PM")
    pub time: String,
    pub status: BookingStatus,
    /// Price in whole rupees
    pub price: u32,

    // ─── Location ────────────────────────────────────────────────
    pub address: String,
    #[serde(default)]
    pub apartment_name: String,
    #[serde(default)]
    pub flat_number: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,

    // ─── Client contact ──────────────────────────────────────────
    pub user_name: String,
    pub user_phone: String,
    #[serde(default)]
    pub gender: String,

    // ─── Session outcome ─────────────────────────────────────────
    #[serde(default)]
    pub session_notes: String,
    /// Activity summary written by the trainer on closure
    #[serde(default)]
    pub session_log: String,

    /// Gateway payment ID reported by the checkout callback
    pub payment_id: String,
    /// Creation time (Unix epoch milliseconds)
    pub created_at: i64,
}

fn unassigned() -> String {
    UNASSIGNED_TRAINER.to_string()
}

impl Booking {
    pub fn is_assigned_to(&self, trainer_uid: &str) -> bool {
        !trainer_uid.is_empty() && self.trainer_id.as_deref() == Some(trainer_uid)
    }
}

/// Partial update of a booking document.
///
/// Only fields that are `Some` are serialized and listed in the update
/// mask, so everything else in the stored document is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_notes: Option<String>,
}

impl BookingPatch {
    /// Firestore field paths present in this patch.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.status.is_some() {
            paths.push("status");
        }
        if self.trainer_id.is_some() {
            paths.push("trainerId");
        }
        if self.trainer_name.is_some() {
            paths.push("trainerName");
        }
        if self.trainer_email.is_some() {
            paths.push("trainerEmail");
        }
        if self.session_log.is_some() {
            paths.push("sessionLog");
        }
        if self.session_notes.is_some() {
            paths.push("sessionNotes");
        }
        paths
    }

    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Apply the patch to an in-memory booking (mirrors the merge write).
    pub fn apply_to(&self, booking: &mut Booking) {
        if let Some(status) = self.status {
            booking.status = status;
        }
        // An empty id or email is stored as-is but means "none".
        if let Some(trainer_id) = &self.trainer_id {
            booking.trainer_id = Some(trainer_id.clone()).filter(|id| !id.is_empty());
        }
        if let Some(trainer_name) = &self.trainer_name {
            booking.trainer_name = trainer_name.clone();
        }
        if let Some(trainer_email) = &self.trainer_email {
            booking.trainer_email = Some(trainer_email.clone()).filter(|e| !e.is_empty());
        }
        if let Some(session_log) = &self.session_log {
            booking.session_log = session_log.clone();
        }
        if let Some(session_notes) = &self.session_notes {
            booking.session_notes = session_notes.clone();
        }
    }
}

/// Admin quick edit: status and/or trainer reassignment.
///
/// An empty `trainerId` unassigns the booking.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuickEdit {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub trainer_id: Option<String>,
}

impl BookingQuickEdit {
    /// Requested trainer when it differs from the current assignment.
    pub fn trainer_change<'a>(&'a self, current: &Booking) -> Option<&'a str> {
        let requested = self.trainer_id.as_deref()?.trim();
        let assigned = current.trainer_id.as_deref().unwrap_or_default();
        (requested != assigned).then_some(requested)
    }

    /// Patch holding only the fields that actually change.
    ///
    /// `trainer` is the record looked up for a trainer change. A change to an
    /// unknown trainer yields no trainer fields.
    pub fn diff(&self, current: &Booking, trainer: Option<&Trainer>) -> BookingPatch {
        let mut patch = BookingPatch {
            status: self.status.filter(|status| *status != current.status),
            ..Default::default()
        };

        match (self.trainer_change(current), trainer) {
            (Some(""), _) => {
                patch.trainer_id = Some(String::new());
                patch.trainer_name = Some(UNASSIGNED_TRAINER.to_string());
                patch.trainer_email = Some(String::new());
            }
            (Some(requested), Some(trainer)) if trainer.uid == requested => {
                patch.trainer_id = Some(trainer.uid.clone());
                patch.trainer_name = Some(trainer.name.clone());
                patch.trainer_email = Some(trainer.email.clone());
            }
            _ => {}
        }

        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_patch_serializes_only_status() {
        let patch = BookingPatch {
            status: Some(BookingStatus::Cancelled),
            ..Default::default()
        };

        assert_eq!(patch.field_paths(), vec!["status"]);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "status": "cancelled" })
        );
    }

    #[test]
    fn test_patch_reads_back_from_stored_fields() {
        // The update call returns the written fields as the patch type.
        let patch: BookingPatch = serde_json::from_value(serde_json::json!({
            "status": "completed",
            "sessionLog": "Warm-up, squats, lunges and planks"
        }))
        .unwrap();

        assert_eq!(patch.status, Some(BookingStatus::Completed));
        assert!(patch.trainer_id.is_none());
        assert_eq!(patch.field_paths(), vec!["status", "sessionLog"]);
    }

    #[test]
    fn test_empty_patch() {
        assert!(BookingPatch::default().is_empty());
    }

    #[test]
    fn test_booking_deserializes_web_client_document() {
        // Documents written by the web client lack the optional fields.
        let doc = serde_json::json!({
            "id": "b1",
            "userId": "u1",
            "category": "Pro Training",
            "date": "2026-10-19",
            "time": "05:30 PM",
            "status": "confirmed",
            "price": 399,
            "address": "123 HSR Layout",
            "userName": "Asha",
            "userPhone": "9876543210",
            "paymentId": "pay_1",
            "createdAt": 1_760_000_000_000_i64
        });

        let booking: Booking = serde_json::from_value(doc).unwrap();
        assert_eq!(booking.trainer_name, UNASSIGNED_TRAINER);
        assert_eq!(booking.trainer_id, None);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.session_log.is_empty());
    }

    fn trainer(uid: &str) -> Trainer {
        Trainer {
            uid: uid.to_string(),
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: String::new(),
            specialties: vec![],
            bio: String::new(),
            active: true,
        }
    }

    fn confirmed_booking() -> Booking {
        serde_json::from_value(serde_json::json!({
            "id": "b1",
            "userId": "u1",
            "category": "Pro Training",
            "date": "2026-10-19",
            "time": "05:30 PM",
            "status": "confirmed",
            "price": 399,
            "address": "123 HSR Layout",
            "userName": "Asha",
            "userPhone": "9876543210",
            "paymentId": "pay_1",
            "createdAt": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_quick_edit_unchanged_fields_are_dropped() {
        let edit = BookingQuickEdit {
            status: Some(BookingStatus::Confirmed),
            trainer_id: None,
        };
        assert!(edit.diff(&confirmed_booking(), None).is_empty());
    }

    #[test]
    fn test_quick_edit_assigns_trainer() {
        let edit = BookingQuickEdit {
            status: None,
            trainer_id: Some("t1".to_string()),
        };
        let booking = confirmed_booking();
        assert_eq!(edit.trainer_change(&booking), Some("t1"));

        let patch = edit.diff(&booking, Some(&trainer("t1")));
        assert_eq!(
            patch.field_paths(),
            vec!["trainerId", "trainerName", "trainerEmail"]
        );

        let mut updated = booking;
        patch.apply_to(&mut updated);
        assert!(updated.is_assigned_to("t1"));
        assert_eq!(edit.trainer_change(&updated), None);
    }

    #[test]
    fn test_quick_edit_unassign() {
        let mut booking = confirmed_booking();
        booking.trainer_id = Some("t1".to_string());
        booking.trainer_name = "Ravi".to_string();

        let edit = BookingQuickEdit {
            status: None,
            trainer_id: Some(String::new()),
        };
        let patch = edit.diff(&booking, None);
        assert_eq!(patch.trainer_name.as_deref(), Some(UNASSIGNED_TRAINER));

        patch.apply_to(&mut booking);
        assert_eq!(booking.trainer_id, None);
        assert!(!booking.is_assigned_to(""));
    }
}
