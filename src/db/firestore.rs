// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Team profiles (pit scouting)
//! - Match records (one document per team/match/device)
//! - App settings (shared operator configuration)

use crate::db::{collections, RemoteStore};
use crate::error::AppError;
use crate::models::{RemoteMatchRecord, RemoteTeamProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Setting document in `app_settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppSetting {
    value: String,
}

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

    /// Create a disconnected client (offline mode).
    ///
    /// Every operation fails with a connectivity error, which leaves all
    /// local changes pending.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database(AppError::DATABASE_OFFLINE.to_string()))
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    /// Store a shared setting (e.g. provisioning the admin password).
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::APP_SETTINGS)
            .document_id(key)
            .object(&AppSetting {
                value: value.to_string(),
            })
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FirestoreDb {
    // ─── Team Profile Operations ─────────────────────────────────

    async fn upsert_profile(&self, profile: &RemoteTeamProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TEAM_PROFILES)
            .document_id(profile.team_number.to_string())
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_profile(&self, team_number: u32) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TEAM_PROFILES)
            .document_id(team_number.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn fetch_profiles(&self) -> Result<Vec<RemoteTeamProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TEAM_PROFILES)
            .order_by([(
                "team_number",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Match Record Operations ─────────────────────────────────

    async fn upsert_record(&self, record: &RemoteMatchRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MATCH_RECORDS)
            .document_id(record.key().document_id())
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_all_records(&self) -> Result<usize, AppError> {
        let records: Vec<RemoteMatchRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MATCH_RECORDS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = records.len();
        self.batch_delete(
            &records,
            collections::MATCH_RECORDS,
            |record: &RemoteMatchRecord| record.key().document_id(),
        )
        .await?;

        tracing::info!(count, "Deleted all remote match records");
        Ok(count)
    }

    async fn fetch_records(&self) -> Result<Vec<RemoteMatchRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MATCH_RECORDS)
            .order_by([(
                "match_number",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Settings ────────────────────────────────────────────────

    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        let setting: Option<AppSetting> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::APP_SETTINGS)
            .obj()
            .one(key)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(setting.map(|s| s.value))
    }
}
