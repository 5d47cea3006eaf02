//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Client profiles (keyed by uid)
    pub const USERS: &str = "users";
    pub const BOOKINGS: &str = "bookings";
    /// Trainer records (keyed by uid)
    pub const TRAINERS: &str = "trainers";
}
