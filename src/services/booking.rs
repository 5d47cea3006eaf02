// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisting a paid wizard.
//!
//! Exactly one path runs per successful payment: a session writes one
//! booking, a package writes the profile's active package. Each fires one
//! analytics event after its write succeeds.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::services::analytics::{AnalyticsEvent, AnalyticsWebhook};
use crate::services::wizard::Finalization;
use serde::Serialize;

/// Where the client lands after paying.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Confirmation {
    Booking { booking_id: String, redirect: String },
    Package { package_id: String, redirect: String },
}

pub const MY_BOOKINGS_PATH: &str = "/my-bookings";
pub const MY_PACKAGE_PATH: &str = "/my-package";

/// Write the finalized record and notify analytics.
pub async fn finalize(
    db: &FirestoreDb,
    analytics: &AnalyticsWebhook,
    finalization: Finalization,
) -> Result<Confirmation, AppError> {
    match finalization {
        Finalization::Booking(booking) => {
            db.create_booking(&booking).await?;
            tracing::info!(
                booking_id = %booking.id,
                user_id = %booking.user_id,
                category = %booking.category,
                date = %booking.date,
                time = %booking.time,
                "Booking confirmed"
            );
            analytics.notify(AnalyticsEvent::booking_created(&booking));

            Ok(Confirmation::Booking {
                booking_id: booking.id,
                redirect: MY_BOOKINGS_PATH.to_string(),
            })
        }
        Finalization::Package { user_id, package } => {
            db.set_active_package(&user_id, &package).await?;
            tracing::info!(
                user_id = %user_id,
                package_id = %package.id,
                expiry = %package.expiry_date,
                "Package purchased"
            );
            analytics.notify(AnalyticsEvent::package_purchased(&user_id, &package));

            Ok(Confirmation::Package {
                package_id: package.id,
                redirect: MY_PACKAGE_PATH.to_string(),
            })
        }
    }
}
