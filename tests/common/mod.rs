// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use pitscout_sync::db::{FirestoreDb, RemoteStore};
use pitscout_sync::error::AppError;
use pitscout_sync::models::{
    MatchRecordDraft, RemoteMatchRecord, RemoteTeamProfile, TeamProfileDraft,
};
use pitscout_sync::services::{AssetStore, ConnectivityMonitor, SyncEngine};
use pitscout_sync::store::LocalStore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

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

// ─── Fake Remote Store ───────────────────────────────────────────

/// Pauses the first upsert until released.
#[allow(dead_code)]
pub struct UpsertGate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory remote store with scripted failures.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeRemote {
    pub profiles: Mutex<BTreeMap<u32, RemoteTeamProfile>>,
    pub records: Mutex<BTreeMap<String, RemoteMatchRecord>>,
    pub settings: Mutex<BTreeMap<String, String>>,
    /// Every upsert attempt, including failed ones
    pub upsert_calls: AtomicUsize,
    /// Fail the Nth upsert attempt (1-based)
    fail_on_call: Mutex<Option<usize>>,
    /// Fail every operation
    pub unreachable: AtomicBool,
    gate: Mutex<Option<Arc<UpsertGate>>>,
}

#[allow(dead_code)]
impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on_upsert(&self, call: usize) {
        *self.fail_on_call.lock().unwrap() = Some(call);
    }

    pub fn set_setting(&self, key: &str, value: &str) {
        self.settings
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Install a one-shot gate on the next upsert.
    pub fn install_gate(&self) -> Arc<UpsertGate> {
        let gate = Arc::new(UpsertGate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn profile(&self, team_number: u32) -> Option<RemoteTeamProfile> {
        self.profiles.lock().unwrap().get(&team_number).cloned()
    }

    fn check_reachable(&self) -> Result<(), AppError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(AppError::Database("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    async fn begin_upsert(&self) -> Result<(), AppError> {
        let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.check_reachable()?;
        if *self.fail_on_call.lock().unwrap() == Some(call) {
            return Err(AppError::Database(format!("scripted failure on call {}", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn upsert_profile(&self, profile: &RemoteTeamProfile) -> Result<(), AppError> {
        self.begin_upsert().await?;
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.team_number, profile.clone());
        Ok(())
    }

    async fn upsert_record(&self, record: &RemoteMatchRecord) -> Result<(), AppError> {
        self.begin_upsert().await?;
        self.records
            .lock()
            .unwrap()
            .insert(record.key().document_id(), record.clone());
        Ok(())
    }

    async fn delete_profile(&self, team_number: u32) -> Result<(), AppError> {
        self.check_reachable()?;
        self.profiles.lock().unwrap().remove(&team_number);
        Ok(())
    }

    async fn delete_all_records(&self) -> Result<usize, AppError> {
        self.check_reachable()?;
        let mut records = self.records.lock().unwrap();
        let count = records.len();
        records.clear();
        Ok(count)
    }

    async fn fetch_profiles(&self) -> Result<Vec<RemoteTeamProfile>, AppError> {
        self.check_reachable()?;
        Ok(self.profiles.lock().unwrap().values().cloned().collect())
    }

    async fn fetch_records(&self) -> Result<Vec<RemoteMatchRecord>, AppError> {
        self.check_reachable()?;
        let mut records: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
        records.sort_by_key(|r| r.match_number);
        Ok(records)
    }

    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        self.check_reachable()?;
        Ok(self.settings.lock().unwrap().get(key).cloned())
    }
}

// ─── Fake Asset Store ────────────────────────────────────────────

#[allow(dead_code)]
#[derive(Default)]
pub struct FakeAssets {
    pub uploads: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl FakeAssets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn upload(
        &self,
        key: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::AssetStorage("bucket unavailable".to_string()));
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(format!("https://assets.test/{}", key))
    }
}

// ─── Builders ────────────────────────────────────────────────────

/// Engine over an in-memory store and the given fakes.
#[allow(dead_code)]
pub fn test_engine(
    remote: Arc<FakeRemote>,
    assets: Arc<FakeAssets>,
    online: bool,
) -> (Arc<SyncEngine>, Arc<LocalStore>) {
    let store = Arc::new(LocalStore::in_memory());
    let engine = Arc::new(SyncEngine::new(
        store.clone(),
        remote,
        assets,
        ConnectivityMonitor::new(online),
    ));
    (engine, store)
}

#[allow(dead_code)]
pub fn profile_draft(team_number: u32, description: &str) -> TeamProfileDraft {
    TeamProfileDraft {
        team_number,
        description: description.to_string(),
        balls_per_second: Some(3.5),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn record_draft(team_number: u32, match_number: u32) -> MatchRecordDraft {
    MatchRecordDraft {
        team_number,
        match_number,
        auto_firing_seconds: 1.25,
        auto_accuracy: 60,
        teleop_firing_seconds: 12.5,
        teleop_accuracy: 80,
        ..Default::default()
    }
}
