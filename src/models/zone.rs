// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Service zone model.

use geo::Point;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A named circular service area around a centroid.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Zone name (e.g., "HSR Layout")
    pub name: String,
    /// Centroid (x = longitude, y = latitude)
    pub centroid: Point<f64>,
    /// Lowercased area-name keywords accepted as a text match
    pub keywords: Vec<String>,
}

/// Summary of a zone for API responses.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ZoneSummary {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Zone> for ZoneSummary {
    fn from(zone: &Zone) -> Self {
        Self {
            name: zone.name.clone(),
            latitude: zone.centroid.y(),
            longitude: zone.centroid.x(),
        }
    }
}

/// A latitude/longitude pair as sent by clients and stored on bookings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Within the valid latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(c: Coordinates) -> Self {
        Point::new(c.longitude, c.latitude)
    }
}
