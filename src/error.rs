// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the remote services and the station API.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Admin password required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Station is offline")]
    Offline,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Asset storage error: {0}")]
    AssetStorage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when the Firestore client was created in offline mode.
    pub const DATABASE_OFFLINE: &'static str = "Database not connected (offline mode)";

    /// Check if this error means the remote store was never reachable,
    /// as opposed to rejecting a specific write.
    pub fn is_connectivity_error(&self) -> bool {
        match self {
            AppError::Offline => true,
            AppError::Database(msg) => msg == Self::DATABASE_OFFLINE,
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

