// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bookable time slots for a calendar date.
//!
//! Slots are a pure calendar function: fixed morning and evening windows at
//! 30-minute steps. There is no capacity or trainer availability model, so
//! any number of bookings may share a slot.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const SLOT_MINUTES: i64 = 30;
const LABEL_FORMAT: &str = "%I:%M %p";

/// Half-open `[start, end)` window in which slots start.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: (u32, u32),
    end: (u32, u32),
}

const MORNING: Window = Window {
    start: (5, 0),
    end: (10, 0),
};
const EVENING: Window = Window {
    start: (17, 0),
    end: (20, 0),
};

/// A slot start time, displayed as a 12-hour label ("05:30 PM").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn start(&self) -> NaiveTime {
        self.0
    }

    pub fn label(&self) -> String {
        self.0.format(LABEL_FORMAT).to_string()
    }

    /// Parse a display label back into a slot.
    ///
    /// Accepts the 12-hour label ("05:30 PM", "5:30 pm") or 24-hour "17:30".
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_uppercase();
        NaiveTime::parse_from_str(&label, LABEL_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&label, "%H:%M"))
            .ok()
            .filter(|t| t.second() == 0)
            .map(TimeSlot)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Available slots for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DaySlots {
    #[cfg_attr(feature = "binding-generation", ts(type = "string[]"))]
    pub morning: Vec<TimeSlot>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string[]"))]
    pub evening: Vec<TimeSlot>,
}

impl DaySlots {
    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.evening.is_empty()
    }

    /// Whether the label names one of these slots.
    pub fn contains(&self, label: &str) -> bool {
        TimeSlot::parse(label).is_some_and(|slot| self.all().any(|s| *s == slot))
    }

    /// Earliest remaining slot of the day.
    pub fn first_available(&self) -> Option<TimeSlot> {
        self.all().next().copied()
    }

    fn all(&self) -> impl Iterator<Item = &TimeSlot> {
        self.morning.iter().chain(self.evening.iter())
    }
}

/// Generate the slots for `date` as seen at wall-clock time `now`.
///
/// - future dates: every slot
/// - today: slots starting strictly before `now` are dropped
/// - past dates: nothing
pub fn generate_slots(date: NaiveDate, now: NaiveDateTime) -> DaySlots {
    let today = now.date();
    if date < today {
        return DaySlots::default();
    }

    let cutoff = (date == today).then(|| now.time());
    DaySlots {
        morning: window_slots(MORNING, cutoff),
        evening: window_slots(EVENING, cutoff),
    }
}

fn window_slots(window: Window, cutoff: Option<NaiveTime>) -> Vec<TimeSlot> {
    let (Some(start), Some(end)) = (
        NaiveTime::from_hms_opt(window.start.0, window.start.1, 0),
        NaiveTime::from_hms_opt(window.end.0, window.end.1, 0),
    ) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    let mut time = start;
    while time < end {
        if cutoff.is_none_or(|now| time >= now) {
            slots.push(TimeSlot(time));
        }
        time += Duration::minutes(SLOT_MINUTES);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn labels(slots: &[TimeSlot]) -> Vec<String> {
        slots.iter().map(TimeSlot::label).collect()
    }

    #[test]
    fn test_future_date_has_all_slots() {
        let slots = generate_slots(day().succ_opt().unwrap(), at(day(), 23, 59));
        assert_eq!(slots.morning.len(), 10);
        assert_eq!(slots.evening.len(), 6);
        assert_eq!(slots.morning.first().unwrap().label(), "05:00 AM");
        assert_eq!(slots.morning.last().unwrap().label(), "09:30 AM");
        assert_eq!(slots.evening.first().unwrap().label(), "05:00 PM");
        assert_eq!(slots.evening.last().unwrap().label(), "07:30 PM");
    }

    #[test]
    fn test_today_excludes_elapsed_slots() {
        let slots = generate_slots(day(), at(day(), 18, 10));
        assert!(slots.morning.is_empty());
        assert_eq!(labels(&slots.evening), vec!["06:30 PM", "07:00 PM", "07:30 PM"]);
    }

    #[test]
    fn test_slot_starting_now_is_kept() {
        let slots = generate_slots(day(), at(day(), 17, 0));
        assert_eq!(slots.evening.first().unwrap().label(), "05:00 PM");
    }

    #[test]
    fn test_elapsed_evening_slots_never_offered_today() {
        for hour in 0..24 {
            for minute in [0, 15, 30, 45] {
                let now = at(day(), hour, minute);
                let slots = generate_slots(day(), now);
                assert!(slots
                    .evening
                    .iter()
                    .chain(slots.morning.iter())
                    .all(|s| s.start() >= now.time()));
            }
        }
    }

    #[test]
    fn test_past_date_has_no_slots() {
        let slots = generate_slots(day().pred_opt().unwrap(), at(day(), 4, 0));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_parse_and_contains() {
        assert_eq!(TimeSlot::parse("5:30 pm").unwrap().label(), "05:30 PM");
        assert_eq!(TimeSlot::parse("17:30").unwrap().label(), "05:30 PM");
        assert!(TimeSlot::parse("teatime").is_none());

        let slots = generate_slots(day(), at(day(), 6, 0));
        assert!(slots.contains("06:00 AM"));
        assert!(!slots.contains("05:30 AM"));
        assert!(!slots.contains("10:00 AM"));
        assert_eq!(slots.first_available().unwrap().label(), "06:00 AM");
    }

    #[test]
    fn test_serializes_labels() {
        let slots = generate_slots(day(), at(day(), 19, 1));
        assert_eq!(
            serde_json::to_value(&slots).unwrap(),
            serde_json::json!({ "morning": [], "evening": ["07:30 PM"] })
        );
    }
}
