// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod assessment;
pub mod booking;
pub mod catalog;
pub mod session_log;
pub mod trainer;
pub mod user;
pub mod zone;

pub use assessment::{AssessmentData, AssessmentSection};
pub use booking::{Booking, BookingPatch, BookingQuickEdit, BookingStatus};
pub use catalog::{PackageOffer, SessionCategory};
pub use session_log::SessionLog;
pub use trainer::Trainer;
pub use user::{UserPackage, UserProfile, UserProfilePatch};
pub use zone::{Coordinates, Zone};
