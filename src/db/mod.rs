//! Remote record store (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{RemoteMatchRecord, RemoteTeamProfile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Team profiles (keyed by team number)
    pub const TEAM_PROFILES: &str = "team_profiles";
    /// Match records (keyed by team_match_device)
    pub const MATCH_RECORDS: &str = "match_records";
    /// Shared station settings (admin password, ...)
    pub const APP_SETTINGS: &str = "app_settings";
}

/// Shared backend that every station syncs against.
///
/// Upserts are keyed by each entity's natural identifier, so repeating one is
/// harmless.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert or overwrite a profile (conflict key: team number).
    async fn upsert_profile(&self, profile: &RemoteTeamProfile) -> Result<(), AppError>;

    /// Insert or overwrite a record (conflict key: team, match, device).
    async fn upsert_record(&self, record: &RemoteMatchRecord) -> Result<(), AppError>;

    /// Delete one team's profile.
    async fn delete_profile(&self, team_number: u32) -> Result<(), AppError>;

    /// Delete every match record. Returns the number deleted.
    async fn delete_all_records(&self) -> Result<usize, AppError>;

    /// All profiles, ordered by team number.
    async fn fetch_profiles(&self) -> Result<Vec<RemoteTeamProfile>, AppError>;

    /// All records, ordered by match number.
    async fn fetch_records(&self) -> Result<Vec<RemoteMatchRecord>, AppError>;

    /// A shared setting value, if set.
    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, AppError>;
}
