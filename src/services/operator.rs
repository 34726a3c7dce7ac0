// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password-gated destructive actions.

use crate::db::RemoteStore;
use crate::error::AppError;
use crate::store::LocalStore;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Setting key holding the shared admin password.
pub const ADMIN_PASSWORD_SETTING: &str = "admin_password";

/// Check a candidate against the shared admin password.
///
/// Returns `Ok(false)` on mismatch or when no password is configured.
pub async fn verify_admin_password(
    remote: &dyn RemoteStore,
    candidate: &str,
) -> Result<bool, AppError> {
    let Some(expected) = remote.fetch_setting(ADMIN_PASSWORD_SETTING).await? else {
        tracing::warn!("No admin password configured");
        return Ok(false);
    };

    Ok(bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())))
}

/// Summary of a new-event reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub local_records: usize,
    /// `None` if the remote delete failed
    pub remote_records: Option<usize>,
}

/// Operator actions that remove data.
pub struct OperatorActions {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteStore>,
}

impl OperatorActions {
    pub fn new(store: Arc<LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { store, remote }
    }

    async fn authorize(&self, password: &str) -> Result<(), AppError> {
        if verify_admin_password(self.remote.as_ref(), password).await? {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// Delete a team's profile on this station and remotely.
    ///
    /// The local delete stands even if the remote one fails.
    pub async fn delete_team(&self, password: &str, team_number: u32) -> Result<bool, AppError> {
        self.authorize(password).await?;

        let existed = self.store.delete_team_profile(team_number);
        if let Err(e) = self.remote.delete_profile(team_number).await {
            tracing::warn!(team = team_number, error = %e, "Failed to delete remote profile");
        }

        tracing::info!(team = team_number, existed, "Team profile deleted");
        Ok(existed)
    }

    /// Wipe match data and the active event before scouting a new event.
    /// Team profiles are kept.
    pub async fn clear_for_new_event(&self, password: &str) -> Result<ClearReport, AppError> {
        self.authorize(password).await?;

        let local_records = self.store.clear_all_match_records();
        self.store.clear_current_event();

        let remote_records = match self.remote.delete_all_records().await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear remote match records");
                None
            }
        };

        tracing::info!(local_records, ?remote_records, "Cleared data for new event");
        Ok(ClearReport {
            local_records,
            remote_records,
        })
    }
}
