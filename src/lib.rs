// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! HomeFit: book at-home personal training sessions
//!
//! This crate provides the backend API for the booking wizard, the payment
//! handoff, the trainer session workspace and the admin console.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use chrono::{DateTime, FixedOffset};
use config::Config;
use db::FirestoreDb;
use services::{
    AnalyticsWebhook, GeocodingClient, GeofenceChecker, PaymentBridge, WizardStore, ZoneService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub geofence: GeofenceChecker,
    pub payments: PaymentBridge,
    pub analytics: AnalyticsWebhook,
    pub wizards: WizardStore,
}

impl AppState {
    /// Wire the services described by `config` around a database and zones.
    pub fn new(config: Config, db: FirestoreDb, zones: ZoneService) -> anyhow::Result<Self> {
        let geocoder =
            GeocodingClient::new(&config.geocoder_primary_url, &config.geocoder_fallback_url)?;
        let payments = PaymentBridge::new(
            &config.payment_key_id,
            &config.payment_currency,
            &config.merchant_name,
        );
        let analytics = AnalyticsWebhook::new(config.analytics_webhook_url.clone());

        Ok(Self {
            geofence: GeofenceChecker::new(zones, geocoder),
            payments,
            analytics,
            wizards: WizardStore::new(),
            db,
            config,
        })
    }

    /// Current wall-clock time in the service timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        time_utils::now_in_service_tz(self.config.service_utc_offset_minutes)
    }
}
