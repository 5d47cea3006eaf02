// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use homefit::config::Config;
use homefit::db::FirestoreDb;
use homefit::middleware::auth::{create_jwt, Role};
use homefit::routes::create_router;
use homefit::services::ZoneService;
use homefit::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Zones shipped with the service.
#[allow(dead_code)]
pub fn test_zones() -> ZoneService {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/service_zones.geojson");
    ZoneService::load_from_file(path, 1.0).expect("Failed to load service zones")
}

/// Build state around a config and database.
#[allow(dead_code)]
pub fn test_state_with(config: Config, db: FirestoreDb) -> Arc<AppState> {
    Arc::new(AppState::new(config, db, test_zones()).expect("Failed to build app state"))
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state_with(Config::test_default(), test_db_offline());
    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state_with(Config::test_default(), test_db().await);
    (create_router(state.clone()), state)
}

/// Create a session token signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, role: Role) -> String {
    let config = Config::test_default();
    create_jwt(
        uid,
        role,
        Some(&format!("{}@example.com", uid)),
        Some("Test User"),
        &config.jwt_signing_key,
    )
    .expect("Failed to sign test token")
}

/// Unique id for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
