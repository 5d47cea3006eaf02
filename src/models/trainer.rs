//! Trainer record model.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Trainer stored in Firestore (`trainers/{uid}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    /// Auth provider uid of the trainer (also used as document ID)
    pub uid: String,
    #[validate(length(min = 1, message = "Trainer name is required"))]
    pub name: String,
    #[validate(email(message = "Trainer email is invalid"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub bio: String,
    /// Inactive trainers are hidden from the public listing
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
