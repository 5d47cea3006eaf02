// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geocoding client over two chained public providers.
//!
//! - Primary (Nominatim-compatible): forward search and reverse lookup
//! - Fallback (BigDataCloud-compatible): coordinate-to-locality lookup
//!
//! Neither provider needs credentials. Failures are never fatal to callers:
//! forward lookups report an error the geofence treats as "no coordinates",
//! reverse lookups degrade to the raw coordinate string.

use crate::models::Coordinates;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = concat!("homefit-booking/", env!("CARGO_PKG_VERSION"));

/// Geocoding API client.
#[derive(Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: String,
}

/// Place returned by the primary provider's search endpoint.
#[derive(Debug, Deserialize)]
struct SearchPlace {
    lat: String,
    lon: String,
}

/// Primary provider reverse lookup.
#[derive(Debug, Deserialize)]
struct ReversePlace {
    display_name: Option<String>,
}

/// Fallback provider reverse lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalityLookup {
    #[serde(default)]
    locality: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    principal_subdivision: String,
}

impl GeocodingClient {
    pub fn new(primary_url: &str, fallback_url: &str) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        Ok(Self {
            http,
            primary_url: primary_url.trim_end_matches('/').to_string(),
            fallback_url: fallback_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a free-text address to coordinates.
    ///
    /// Returns `Ok(None)` when the provider has no match.
    pub async fn forward(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!("{}/search", self.primary_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let places: Vec<SearchPlace> = check_response_json(response).await?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("latitude {:?}: {}", place.lat, e)))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("longitude {:?}: {}", place.lon, e)))?;

        let coordinates = Coordinates::new(latitude, longitude);
        if !coordinates.is_valid() {
            return Err(GeocodeError::Parse(format!(
                "coordinates out of range: {}, {}",
                latitude, longitude
            )));
        }

        Ok(Some(coordinates))
    }

    /// Describe device coordinates as a human-readable address.
    ///
    /// Tries the primary provider, then the fallback locality lookup, and
    /// finally returns the raw coordinates.
    pub async fn reverse(&self, coordinates: Coordinates) -> String {
        match self.reverse_primary(coordinates).await {
            Ok(Some(name)) => return name,
            Ok(None) => tracing::debug!("Primary reverse geocoder returned no name"),
            Err(e) => tracing::warn!(error = %e, "Primary reverse geocoding failed"),
        }

        match self.reverse_fallback(coordinates).await {
            Ok(Some(name)) => return name,
            Ok(None) => tracing::debug!("Fallback reverse geocoder returned no locality"),
            Err(e) => tracing::warn!(error = %e, "Fallback reverse geocoding failed"),
        }

        format_coordinates(coordinates)
    }

    async fn reverse_primary(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/reverse", self.primary_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let place: ReversePlace = check_response_json(response).await?;
        Ok(place.display_name.filter(|n| !n.trim().is_empty()))
    }

    async fn reverse_fallback(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/data/reverse-geocode-client", self.fallback_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let lookup: LocalityLookup = check_response_json(response).await?;

        let parts: Vec<&str> = [
            lookup.locality.as_str(),
            lookup.city.as_str(),
            lookup.principal_subdivision.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .fold(Vec::new(), |mut acc, part| {
            if !acc.contains(&part) {
                acc.push(part);
            }
            acc
        });

        if parts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parts.join(", ")))
        }
    }
}

/// Raw coordinate string used when no provider can name a place.
pub fn format_coordinates(coordinates: Coordinates) -> String {
    format!("{:.6}, {:.6}", coordinates.latitude, coordinates.longitude)
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, GeocodeError> {
    let status = response.status();
    if !status.is_success() {
        return Err(GeocodeError::Status(status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| GeocodeError::Parse(e.to_string()))
}

/// Errors from geocoding providers.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(String),

    #[error("Geocoding provider returned HTTP {0}")]
    Status(u16),

    #[error("Unexpected geocoding response: {0}")]
    Parse(String),
}
