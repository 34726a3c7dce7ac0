// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync engine: drains the pending-change set into the remote store.
//!
//! A pass works through a snapshot of the pending set one entity at a time
//! and clears each entry as soon as its upsert is confirmed. An interrupted
//! pass therefore leaves finished entities cleared, and the next pass only
//! redoes the remainder. Upserts are keyed by natural identifiers, so redoing
//! an entity is harmless.

use crate::db::RemoteStore;
use crate::error::AppError;
use crate::models::{
    PendingEntry, PendingSync, ProfileImage, RecordKey, RemoteMatchRecord, RemoteTeamProfile,
};
use crate::services::assets::{photo_object_name, AssetStore};
use crate::services::connectivity::ConnectivityMonitor;
use crate::services::merge::{merge_remote_profiles, MergeReport};
use crate::store::LocalStore;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Observable sync state for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStatus {
    pub online: bool,
    pub syncing: bool,
    pub has_pending: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Why a sync request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    AlreadyRunning,
    NothingPending,
}

/// Result of a completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub profiles_synced: usize,
    pub records_synced: usize,
    pub images_uploaded: usize,
    /// Upload failures that did not stop the pass
    pub image_failures: usize,
    /// Pending entries whose entity no longer exists locally
    pub stale_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Completed(SyncReport),
}

/// A pass aborted on a failed upsert.
#[derive(Debug, thiserror::Error)]
#[error("Sync of {entry} failed: {source}")]
pub struct SyncError {
    pub entry: PendingEntry,
    #[source]
    pub source: AppError,
    /// Work confirmed before the failure
    pub partial: SyncReport,
}

/// Releases the in-flight flag when a pass ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum EntitySync {
    Synced,
    Stale,
}

/// Sync engine for one station.
pub struct SyncEngine {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteStore>,
    assets: Arc<dyn AssetStore>,
    connectivity: ConnectivityMonitor,
    in_flight: AtomicBool,
    status: watch::Sender<SyncStatus>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteStore>,
        assets: Arc<dyn AssetStore>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            store,
            remote,
            assets,
            connectivity,
            in_flight: AtomicBool::new(false),
            status,
        }
    }

    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Current status, with connectivity and pending flags read fresh.
    pub fn status(&self) -> SyncStatus {
        let mut status = self.status.borrow().clone();
        status.online = self.connectivity.is_online();
        status.has_pending = self.store.has_pending_data();
        status
    }

    /// Receiver that wakes whenever a pass starts or finishes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    fn publish(&self, update: impl FnOnce(&mut SyncStatus)) {
        let online = self.connectivity.is_online();
        let has_pending = self.store.has_pending_data();
        self.status.send_modify(|status| {
            update(status);
            status.online = online;
            status.has_pending = has_pending;
        });
    }

    /// Manual trigger from the UI. Same as [`sync_all`](Self::sync_all).
    pub async fn sync_now(&self) -> Result<SyncOutcome, SyncError> {
        self.sync_all().await
    }

    /// Push every pending entity to the remote store.
    ///
    /// Does nothing while offline, while another pass is running (the request
    /// is dropped, not queued), or when nothing is pending.
    pub async fn sync_all(&self) -> Result<SyncOutcome, SyncError> {
        if !self.connectivity.is_online() {
            tracing::debug!("Offline, skipping sync");
            return Ok(SyncOutcome::Skipped(SkipReason::Offline));
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync already in flight, dropping request");
            return Ok(SyncOutcome::Skipped(SkipReason::AlreadyRunning));
        };

        let pending = self.store.pending_snapshot();
        if pending.is_empty() {
            return Ok(SyncOutcome::Skipped(SkipReason::NothingPending));
        }

        tracing::info!(
            profiles = pending.team_profiles.len(),
            records = pending.match_records.len(),
            "Starting sync pass"
        );
        self.publish(|s| {
            s.syncing = true;
            s.last_error = None;
        });

        let result = self.run_pass(&pending).await;

        match &result {
            Ok(report) => {
                tracing::info!(
                    profiles = report.profiles_synced,
                    records = report.records_synced,
                    images = report.images_uploaded,
                    "Sync pass complete"
                );
                self.publish(|s| {
                    s.syncing = false;
                    s.last_sync_at = Some(Utc::now());
                    s.last_error = None;
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Sync pass aborted");
                let message = e.to_string();
                self.publish(|s| {
                    s.syncing = false;
                    s.last_error = Some(message);
                });
            }
        }

        result.map(SyncOutcome::Completed)
    }

    async fn run_pass(&self, pending: &PendingSync) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        // Profiles first, so photos are uploaded before any record lands.
        for &team_number in &pending.team_profiles {
            match self.sync_profile(team_number, &mut report).await {
                Ok(EntitySync::Synced) => report.profiles_synced += 1,
                Ok(EntitySync::Stale) => report.stale_entries += 1,
                Err(source) => {
                    return Err(SyncError {
                        entry: PendingEntry::Profile(team_number),
                        source,
                        partial: report,
                    })
                }
            }
        }

        for key in &pending.match_records {
            match self.sync_record(key).await {
                Ok(EntitySync::Synced) => report.records_synced += 1,
                Ok(EntitySync::Stale) => report.stale_entries += 1,
                Err(source) => {
                    return Err(SyncError {
                        entry: PendingEntry::Record(key.clone()),
                        source,
                        partial: report,
                    })
                }
            }
        }

        Ok(report)
    }

    async fn sync_profile(
        &self,
        team_number: u32,
        report: &mut SyncReport,
    ) -> Result<EntitySync, AppError> {
        let Some(mut profile) = self.store.team_profile(team_number) else {
            tracing::debug!(team = team_number, "Pending profile no longer exists");
            self.store.clear_pending(&PendingEntry::Profile(team_number));
            return Ok(EntitySync::Stale);
        };

        // Step 1: photo upload. Failure stays here and does not block the
        // profile upsert below.
        if let ProfileImage::Inline {
            bytes,
            content_type,
        } = &profile.image
        {
            let key = photo_object_name(team_number, content_type);
            match self.assets.upload(&key, bytes, content_type).await {
                Ok(url) => {
                    let image = ProfileImage::Remote { url };
                    self.store
                        .replace_profile_image(team_number, profile.updated_at, image.clone());
                    profile.image = image;
                    report.images_uploaded += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        team = team_number,
                        error = %e,
                        "Photo upload failed, syncing profile without it"
                    );
                    report.image_failures += 1;
                }
            }
        }

        // Step 2: profile upsert. Failure aborts the pass.
        self.remote
            .upsert_profile(&RemoteTeamProfile::from(&profile))
            .await?;
        self.store
            .clear_pending_profile_if_unchanged(team_number, profile.updated_at);

        tracing::debug!(team = team_number, "Profile synced");
        Ok(EntitySync::Synced)
    }

    async fn sync_record(&self, key: &RecordKey) -> Result<EntitySync, AppError> {
        // Re-resolve: the record may have been edited since it was marked.
        let Some(record) = self.store.match_record(key) else {
            tracing::debug!(record = %key, "Pending record no longer exists");
            self.store.clear_pending(&PendingEntry::Record(key.clone()));
            return Ok(EntitySync::Stale);
        };

        self.remote
            .upsert_record(&RemoteMatchRecord::from(&record))
            .await?;
        self.store
            .clear_pending_record_if_unchanged(key, record.created_at);

        tracing::debug!(record = %key, "Record synced");
        Ok(EntitySync::Synced)
    }

    // ─── Pull ────────────────────────────────────────────────────

    /// Fetch remote profiles and merge them into the local store.
    pub async fn pull_profiles(&self) -> Result<MergeReport, AppError> {
        if !self.connectivity.is_online() {
            return Err(AppError::Offline);
        }

        let remote_profiles = self.remote.fetch_profiles().await?;
        let report = merge_remote_profiles(&self.store, &remote_profiles);
        tracing::info!(
            fetched = remote_profiles.len(),
            replaced = report.replaced.len(),
            kept = report.kept.len(),
            "Pulled remote profiles"
        );
        Ok(report)
    }

    /// All remote match records (every station), ordered by match number.
    pub async fn fetch_remote_records(&self) -> Result<Vec<RemoteMatchRecord>, AppError> {
        if !self.connectivity.is_online() {
            return Err(AppError::Offline);
        }
        self.remote.fetch_records().await
    }
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("syncing", &self.is_syncing())
            .finish_non_exhaustive()
    }
}

/// Run a sync pass whenever connectivity comes back with data pending.
///
/// Also runs once at startup if the station is already online.
pub fn spawn_auto_sync(engine: Arc<SyncEngine>) -> JoinHandle<()> {
    let mut rx = engine.connectivity.subscribe();

    tokio::spawn(async move {
        let mut was_online = *rx.borrow_and_update();
        if was_online && engine.store.has_pending_data() {
            run_triggered_sync(&engine, "startup").await;
        }

        while rx.changed().await.is_ok() {
            let online = *rx.borrow_and_update();
            if online && !was_online && engine.store.has_pending_data() {
                run_triggered_sync(&engine, "reconnect").await;
            }
            was_online = online;
        }
    })
}

async fn run_triggered_sync(engine: &SyncEngine, trigger: &'static str) {
    match engine.sync_all().await {
        Ok(outcome) => tracing::debug!(trigger, ?outcome, "Automatic sync finished"),
        Err(e) => tracing::warn!(trigger, error = %e, "Automatic sync failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
