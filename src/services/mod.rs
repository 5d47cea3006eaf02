// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod analytics;
pub mod booking;
pub mod geocoding;
pub mod geofence;
pub mod payment;
pub mod slots;
pub mod trainer_session;
pub mod wizard;

pub use analytics::{AnalyticsEvent, AnalyticsWebhook};
pub use geocoding::GeocodingClient;
pub use geofence::{GeofenceChecker, GeofenceVerdict, ZoneService};
pub use payment::PaymentBridge;
pub use wizard::{BookingWizard, WizardStore};
