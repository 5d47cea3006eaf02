// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Session log appended to a client's history when a trainer closes a session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One completed training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    /// Booking this log closes
    #[serde(default)]
    pub booking_id: String,
    /// Session date
    pub date: NaiveDate,
    #[serde(default)]
    pub trainer_id: String,
    pub trainer_name: String,
    pub completed: bool,
    /// Client comfort, 1 (struggled) to 5 (very comfortable)
    pub comfort_level: u8,
    pub activities_done: String,
    #[serde(default)]
    pub focus_for_next: String,
    #[serde(default)]
    pub notes: String,
    /// When the trainer submitted the log (ISO 8601)
    #[serde(default)]
    pub logged_at: String,
}
