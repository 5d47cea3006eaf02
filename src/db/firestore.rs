// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (client profiles, embedded package, assessment and history)
//! - Bookings (paid sessions)
//! - Trainers (staff records)
//!
//! There is no referential integrity between collections and no
//! multi-document transaction: callers join and sequence writes themselves.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    AssessmentData, Booking, BookingPatch, SessionLog, Trainer, UserPackage, UserProfile,
    UserProfilePatch,
};
use firestore::FirestoreWritePrecondition;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a client profile by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a client profile.
    pub async fn upsert_user(&self, user: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Merge the `Some` fields of a patch into a profile.
    ///
    /// An empty patch is a no-op and issues no write.
    pub async fn update_user_fields(
        &self,
        uid: &str,
        patch: &UserProfilePatch,
    ) -> Result<(), AppError> {
        let paths = patch.field_paths();
        if paths.is_empty() {
            return Ok(());
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths)
            .in_col(collections::USERS)
            .document_id(uid)
            .object(patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(uid, fields = ?patch.field_paths(), "Updated user fields");
        Ok(())
    }

    /// All client profiles.
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append a session log to the client's history.
    ///
    /// Server-side array append, so concurrent closures for the same client
    /// do not overwrite each other. The profile must already exist.
    pub async fn append_session_log(&self, uid: &str, log: &SessionLog) -> Result<(), AppError> {
        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(uid)
            .transforms(|t| {
                t.fields([t
                    .field("sessionHistory")
                    .append_missing_elements([log])])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add session log to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Session log append failed: {}", e)))?;

        tracing::debug!(uid, booking_id = %log.booking_id, "Appended session log");
        Ok(())
    }

    /// Store the client's latest assessment.
    pub async fn save_assessment(
        &self,
        uid: &str,
        assessment: &AssessmentData,
    ) -> Result<(), AppError> {
        self.update_user_fields(
            uid,
            &UserProfilePatch {
                latest_assessment: Some(assessment.clone()),
                ..Default::default()
            },
        )
        .await
    }

    /// Replace the client's active package.
    pub async fn set_active_package(
        &self,
        uid: &str,
        package: &UserPackage,
    ) -> Result<(), AppError> {
        self.update_user_fields(
            uid,
            &UserProfilePatch {
                active_package: Some(package.clone()),
                ..Default::default()
            },
        )
        .await
    }

    // ─── Booking Operations ──────────────────────────────────────

    /// Store a new booking under its own ID.
    pub async fn create_booking(&self, booking: &Booking) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BOOKINGS)
            .document_id(&booking.id)
            .object(booking)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BOOKINGS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All bookings, newest first.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, AppError> {
        let bookings: Vec<Booking> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BOOKINGS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(newest_first(bookings))
    }

    /// Bookings made by one client, newest first.
    pub async fn bookings_for_user(&self, uid: &str) -> Result<Vec<Booking>, AppError> {
        self.bookings_where("userId", uid).await
    }

    /// Bookings assigned to one trainer, newest first.
    pub async fn bookings_for_trainer(&self, trainer_uid: &str) -> Result<Vec<Booking>, AppError> {
        self.bookings_where("trainerId", trainer_uid).await
    }

    async fn bookings_where(&self, field: &str, value: &str) -> Result<Vec<Booking>, AppError> {
        let field = field.to_string();
        let value = value.to_string();

        // Sorted in memory: ordering by createdAt would need a composite index.
        let bookings: Vec<Booking> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BOOKINGS)
            .filter(move |q| q.for_all([q.field(&field).eq(value.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(newest_first(bookings))
    }

    /// Merge the `Some` fields of a patch into a booking.
    ///
    /// An empty patch is a no-op and issues no write.
    pub async fn update_booking_fields(&self, id: &str, patch: &BookingPatch) -> Result<(), AppError> {
        let paths = patch.field_paths();
        if paths.is_empty() {
            return Ok(());
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths)
            .in_col(collections::BOOKINGS)
            .document_id(id)
            .object(patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(booking_id = id, fields = ?patch.field_paths(), "Updated booking fields");
        Ok(())
    }

    pub async fn delete_booking(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::BOOKINGS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Trainer Operations ──────────────────────────────────────

    pub async fn get_trainer(&self, uid: &str) -> Result<Option<Trainer>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TRAINERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All trainers sorted by name.
    pub async fn list_trainers(&self) -> Result<Vec<Trainer>, AppError> {
        let mut trainers: Vec<Trainer> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::TRAINERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        trainers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(trainers)
    }

    pub async fn upsert_trainer(&self, trainer: &Trainer) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TRAINERS)
            .document_id(&trainer.uid)
            .object(trainer)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Sort bookings by creation time, newest first.
pub fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    bookings
}
