// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Fixed offset for the service timezone, falling back to UTC when the
/// configured offset is out of range.
pub fn service_offset(offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Current wall-clock time in the service timezone.
pub fn now_in_service_tz(offset_minutes: i32) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&service_offset(offset_minutes))
}

/// Milliseconds since the Unix epoch, the unit stored in `createdAt`.
pub fn epoch_millis<Tz: chrono::TimeZone>(date: &DateTime<Tz>) -> i64 {
    date.timestamp_millis()
}
