// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics webhook that mirrors business events into a spreadsheet.
//!
//! Notifications are fire-and-forget: they run on a detached task and the
//! response is never inspected, so delivery failures are only logged.

use crate::models::{Booking, SessionLog, UserPackage, UserProfile};
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Action-tagged payload accepted by the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AnalyticsEvent {
    CreateBooking {
        booking_id: String,
        user_id: String,
        user_name: String,
        user_phone: String,
        category: String,
        date: String,
        time: String,
        price: u32,
        address: String,
        payment_id: String,
        timestamp: String,
    },
    UpdateProfile {
        user_id: String,
        name: String,
        email: String,
        phone_number: String,
        address: String,
        gender: String,
        timestamp: String,
    },
    CompleteSession {
        booking_id: String,
        user_id: String,
        trainer_name: String,
        activities_done: String,
        comfort_level: u8,
        focus_for_next: String,
        timestamp: String,
    },
    PurchasePackage {
        user_id: String,
        package_id: String,
        package_name: String,
        price: u32,
        total_sessions: u32,
        expiry_date: String,
        payment_id: String,
        timestamp: String,
    },
}

impl AnalyticsEvent {
    pub fn booking_created(booking: &Booking) -> Self {
        AnalyticsEvent::CreateBooking {
            booking_id: booking.id.clone(),
            user_id: booking.user_id.clone(),
            user_name: booking.user_name.clone(),
            user_phone: booking.user_phone.clone(),
            category: booking.category.clone(),
            date: booking.date.to_string(),
            time: booking.time.clone(),
            price: booking.price,
            address: booking.address.clone(),
            payment_id: booking.payment_id.clone(),
            timestamp: now(),
        }
    }

    pub fn profile_updated(profile: &UserProfile) -> Self {
        AnalyticsEvent::UpdateProfile {
            user_id: profile.uid.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone_number: profile.phone_number.clone(),
            address: profile.address.clone(),
            gender: profile.gender.clone(),
            timestamp: now(),
        }
    }

    pub fn session_completed(booking: &Booking, log: &SessionLog) -> Self {
        AnalyticsEvent::CompleteSession {
            booking_id: booking.id.clone(),
            user_id: booking.user_id.clone(),
            trainer_name: log.trainer_name.clone(),
            activities_done: log.activities_done.clone(),
            comfort_level: log.comfort_level,
            focus_for_next: log.focus_for_next.clone(),
            timestamp: now(),
        }
    }

    pub fn package_purchased(user_id: &str, package: &UserPackage) -> Self {
        AnalyticsEvent::PurchasePackage {
            user_id: user_id.to_string(),
            package_id: package.id.clone(),
            package_name: package.name.clone(),
            price: package.price,
            total_sessions: package.total_sessions,
            expiry_date: format_utc_rfc3339(package.expiry_date),
            payment_id: package.payment_id.clone().unwrap_or_default(),
            timestamp: now(),
        }
    }

    /// Action tag, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            AnalyticsEvent::CreateBooking { .. } => "create_booking",
            AnalyticsEvent::UpdateProfile { .. } => "update_profile",
            AnalyticsEvent::CompleteSession { .. } => "complete_session",
            AnalyticsEvent::PurchasePackage { .. } => "purchase_package",
        }
    }
}

fn now() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Webhook client. Disabled when no URL is configured.
#[derive(Clone)]
pub struct AnalyticsWebhook {
    http: reqwest::Client,
    url: Option<String>,
}

impl AnalyticsWebhook {
    pub fn new(url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client for analytics");
                reqwest::Client::new()
            });
        Self { http, url }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Send an event on a detached task and return immediately.
    pub fn notify(&self, event: AnalyticsEvent) {
        if !self.is_enabled() {
            tracing::debug!(action = event.action(), "Analytics webhook disabled, skipping");
            return;
        }

        let webhook = self.clone();
        tokio::spawn(async move {
            webhook.send(event).await;
        });
    }

    /// Deliver an event, ignoring the outcome apart from logging.
    pub async fn send(&self, event: AnalyticsEvent) {
        let Some(url) = self.url.as_deref() else {
            return;
        };

        let action = event.action();
        match self.http.post(url).json(&event).send().await {
            Ok(response) => {
                tracing::debug!(action, status = %response.status(), "Analytics event sent");
            }
            Err(e) => {
                tracing::warn!(action, error = %e, "Analytics event delivery failed");
            }
        }
    }
}
