// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment, so they
//! are read once at startup and cached in memory.

use std::env;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_GEOCODER_PRIMARY_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_GEOCODER_FALLBACK_URL: &str = "https://api.bigdatacloud.net";
const DEFAULT_ZONES_PATH: &str = "data/service_zones.geojson";
const DEFAULT_ZONE_RADIUS_KM: f64 = 1.0;
/// India Standard Time (UTC+05:30).
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Spreadsheet analytics webhook. Notifications are skipped when unset.
    pub analytics_webhook_url: Option<String>,
    /// Base URL of the primary (Nominatim-compatible) geocoder
    pub geocoder_primary_url: String,
    /// Base URL of the fallback (coordinate-to-locality) geocoder
    pub geocoder_fallback_url: String,
    /// GeoJSON file with the service zone centroids
    pub zones_path: String,
    /// Radius shared by every service zone
    pub zone_radius_km: f64,
    /// Offset of the service timezone used for "today" in slot generation
    pub service_utc_offset_minutes: i32,
    /// Checkout currency (ISO 4217)
    pub payment_currency: String,
    /// Merchant name shown in the checkout widget
    pub merchant_name: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Publishable key handed to the checkout widget
    pub payment_key_id: String,
}

impl Config {
    /// Config for tests only.
    ///
    /// Geocoder URLs point at a closed local port so lookups fail fast.
    pub fn test_default() -> Self {
        Self {
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            analytics_webhook_url: None,
            geocoder_primary_url: "http://127.0.0.1:9".to_string(),
            geocoder_fallback_url: "http://127.0.0.1:9".to_string(),
            zones_path: DEFAULT_ZONES_PATH.to_string(),
            zone_radius_km: DEFAULT_ZONE_RADIUS_KM,
            service_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            payment_currency: "INR".to_string(),
            merchant_name: "HomeFit".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            payment_key_id: "rzp_test_key".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// For local development, a `.env` file is honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let zone_radius_km = match env::var("ZONE_RADIUS_KM") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|r| *r > 0.0)
                .ok_or(ConfigError::Invalid("ZONE_RADIUS_KM"))?,
            Err(_) => DEFAULT_ZONE_RADIUS_KM,
        };

        let service_utc_offset_minutes = match env::var("SERVICE_UTC_OFFSET_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|m| m.abs() < 24 * 60)
                .ok_or(ConfigError::Invalid("SERVICE_UTC_OFFSET_MINUTES"))?,
            Err(_) => DEFAULT_UTC_OFFSET_MINUTES,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            analytics_webhook_url: env::var("ANALYTICS_WEBHOOK_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            geocoder_primary_url: env::var("GEOCODER_PRIMARY_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_PRIMARY_URL.to_string()),
            geocoder_fallback_url: env::var("GEOCODER_FALLBACK_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_FALLBACK_URL.to_string()),
            zones_path: env::var("ZONES_PATH").unwrap_or_else(|_| DEFAULT_ZONES_PATH.to_string()),
            zone_radius_km,
            service_utc_offset_minutes,
            payment_currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            merchant_name: env::var("MERCHANT_NAME").unwrap_or_else(|_| "HomeFit".to_string()),

            // Secrets - injected by the deployment
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            payment_key_id: env::var("PAYMENT_KEY_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PAYMENT_KEY_ID"))?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
