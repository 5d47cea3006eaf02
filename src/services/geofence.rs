// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Service zone loading and serviceability checks.
//!
//! An address is serviceable when either
//! - its coordinates lie within the shared radius of any zone centroid, or
//! - its text contains one of the zones' area-name keywords.
//!
//! The keyword path keeps bookings working when geocoding is down, at the
//! cost of occasional false positives.

use crate::models::zone::ZoneSummary;
use crate::models::{Coordinates, Zone};
use crate::services::geocoding::GeocodingClient;
use geo::{Distance, Haversine, Point};
use geojson::GeoJson;
use serde::Serialize;
use std::fs;
use std::path::Path;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_RADIUS_KM: f64 = 1.0;

/// Loaded service zones and the radius they share.
#[derive(Clone, Debug)]
pub struct ZoneService {
    zones: Vec<Zone>,
    radius_km: f64,
}

impl Default for ZoneService {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

/// How an address was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Distance,
    Keyword,
}

/// Outcome of a serviceability check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeofenceVerdict {
    pub serviceable: bool,
    pub matched_by: Option<MatchKind>,
    /// Zone that matched, or the nearest zone when nothing matched
    pub zone: Option<String>,
    /// Distance to `zone` when coordinates were known
    pub distance_km: Option<f64>,
    /// Coordinates used for the distance check
    pub coordinates: Option<Coordinates>,
}

impl ZoneService {
    /// Load zones from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P, radius_km: f64) -> Result<Self, ZoneError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| ZoneError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data, radius_km)
    }

    /// Load zones from a GeoJSON string of Point features.
    pub fn load_from_json(json_data: &str, radius_km: f64) -> Result<Self, ZoneError> {
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(ZoneError::InvalidRadius(radius_km));
        }

        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| ZoneError::ParseError(e.to_string()))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(ZoneError::ParseError(
                "expected a FeatureCollection".to_string(),
            ));
        };

        let mut zones = Vec::new();

        for feature in collection.features {
            let name = feature
                .property("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string();

            let keywords: Vec<String> = feature
                .property("keywords")
                .and_then(|v| v.as_array())
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(|k| k.trim().to_lowercase())
                        .filter(|k| !k.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            let Some(geom) = feature.geometry else {
                tracing::warn!(zone = %name, "Skipping zone without geometry");
                continue;
            };

            let centroid: Point<f64> = geom
                .value
                .try_into()
                .map_err(|_| ZoneError::UnsupportedGeometry(name.clone()))?;

            zones.push(Zone {
                name,
                centroid,
                keywords,
            });
        }

        tracing::info!(count = zones.len(), radius_km, "Loaded service zones");
        Ok(Self { zones, radius_km })
    }

    /// Get the list of zones.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn summaries(&self) -> Vec<ZoneSummary> {
        self.zones.iter().map(ZoneSummary::from).collect()
    }

    /// Closest zone to a point with its great-circle distance in km.
    pub fn nearest_zone(&self, point: Point<f64>) -> Option<(&Zone, f64)> {
        self.zones
            .iter()
            .map(|zone| (zone, distance_km(zone.centroid, point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Closest zone if the point lies within the service radius.
    pub fn zone_within_radius(&self, point: Point<f64>) -> Option<(&Zone, f64)> {
        self.nearest_zone(point)
            .filter(|(_, distance)| *distance <= self.radius_km)
    }

    /// Zone whose keyword appears in the address (case-insensitive).
    pub fn keyword_match(&self, address: &str) -> Option<&Zone> {
        let address = address.to_lowercase();
        self.zones
            .iter()
            .find(|zone| zone.keywords.iter().any(|k| address.contains(k.as_str())))
    }

    /// Combine the distance and keyword checks.
    pub fn decide(&self, address: &str, coordinates: Option<Coordinates>) -> GeofenceVerdict {
        let point = coordinates.map(Point::from);

        if let Some((zone, distance)) = point.and_then(|p| self.zone_within_radius(p)) {
            return GeofenceVerdict {
                serviceable: true,
                matched_by: Some(MatchKind::Distance),
                zone: Some(zone.name.clone()),
                distance_km: Some(distance),
                coordinates,
            };
        }

        if let Some(zone) = self.keyword_match(address) {
            return GeofenceVerdict {
                serviceable: true,
                matched_by: Some(MatchKind::Keyword),
                zone: Some(zone.name.clone()),
                distance_km: None,
                coordinates,
            };
        }

        let nearest = point.and_then(|p| self.nearest_zone(p));
        GeofenceVerdict {
            serviceable: false,
            matched_by: None,
            zone: nearest.map(|(zone, _)| zone.name.clone()),
            distance_km: nearest.map(|(_, d)| d),
            coordinates,
        }
    }
}

/// Great-circle distance between two points in kilometres.
pub fn distance_km(a: Point<f64>, b: Point<f64>) -> f64 {
    Haversine.distance(a, b) / 1000.0
}

/// Serviceability checker combining zones with forward geocoding.
#[derive(Clone)]
pub struct GeofenceChecker {
    zones: ZoneService,
    geocoder: GeocodingClient,
}

impl GeofenceChecker {
    pub fn new(zones: ZoneService, geocoder: GeocodingClient) -> Self {
        Self { zones, geocoder }
    }

    pub fn zones(&self) -> &ZoneService {
        &self.zones
    }

    pub fn geocoder(&self) -> &GeocodingClient {
        &self.geocoder
    }

    /// Check an address, using device coordinates when the client has them
    /// and forward geocoding otherwise.
    pub async fn check(&self, address: &str, coordinates: Option<Coordinates>) -> GeofenceVerdict {
        let coordinates = match coordinates.filter(Coordinates::is_valid) {
            Some(c) => Some(c),
            None => match self.geocoder.forward(address).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(error = %e, "Geocoding failed, relying on keyword match");
                    None
                }
            },
        };

        let verdict = self.zones.decide(address, coordinates);
        tracing::debug!(
            serviceable = verdict.serviceable,
            matched_by = ?verdict.matched_by,
            zone = ?verdict.zone,
            "Geofence check"
        );
        verdict
    }
}

/// Errors from zone loading.
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Zone {0} is not a Point")]
    UnsupportedGeometry(String),

    #[error("Zone radius must be positive, got {0}")]
    InvalidRadius(f64),
}
