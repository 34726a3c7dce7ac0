// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable local store.
//!
//! Typed accessors over five slots:
//! - Team profiles (map keyed by team number)
//! - Match records (list, deduplicated by composite key)
//! - Pending-change set
//! - Device identity
//! - Active event snapshot
//!
//! Reads never fail: a missing or unreadable slot yields its default.
//! Writes are best-effort and only logged on failure.

pub mod pending;
pub mod storage;

pub use storage::{FileStorage, MemoryStorage, Slot, SlotStorage, StoreError};

use crate::error::AppError;
use crate::models::{
    ActiveEvent, MatchRecord, MatchRecordDraft, PendingEntry, PendingSync, ProfileImage,
    RecordKey, TeamProfile, TeamProfileDraft,
};
use crate::time_utils::monotonic_now;
use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use validator::Validate;

/// Number of random bytes in a generated device id.
const DEVICE_ID_BYTES: usize = 6;

/// Team profiles keyed by team number.
pub type TeamProfiles = BTreeMap<u32, TeamProfile>;

/// Local store over a pluggable slot backend.
pub struct LocalStore {
    storage: Arc<dyn SlotStorage>,
    /// Serializes read-modify-write cycles across slots.
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Open a file-backed store in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(FileStorage::open(dir)?)))
    }

    /// Create a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ─── Slot Access ─────────────────────────────────────────────

    fn load_opt<T: DeserializeOwned>(&self, slot: Slot) -> Option<T> {
        let raw = match self.storage.read(slot) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(slot = slot.key(), error = %e, "Failed to read slot, using default");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(slot = slot.key(), error = %e, "Corrupt slot, using default");
                None
            }
        }
    }

    fn load<T: DeserializeOwned + Default>(&self, slot: Slot) -> T {
        self.load_opt(slot).unwrap_or_default()
    }

    fn persist<T: Serialize>(&self, slot: Slot, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|json| self.storage.write(slot, &json));

        if let Err(e) = result {
            tracing::warn!(slot = slot.key(), error = %e, "Failed to persist slot");
        }
    }

    fn erase(&self, slot: Slot) {
        if let Err(e) = self.storage.remove(slot) {
            tracing::warn!(slot = slot.key(), error = %e, "Failed to remove slot");
        }
    }

    // ─── Device Identity ─────────────────────────────────────────

    /// Identifier of this station, generated and persisted on first access.
    pub fn device_id(&self) -> String {
        let _guard = self.lock();
        self.device_id_locked()
    }

    fn device_id_locked(&self) -> String {
        if let Some(id) = self.load_opt::<String>(Slot::DeviceId) {
            return id;
        }

        let id = generate_device_id();
        self.persist(Slot::DeviceId, &id);
        tracing::info!(device_id = %id, "Generated station device id");
        id
    }

    // ─── Team Profiles ───────────────────────────────────────────

    pub fn team_profiles(&self) -> TeamProfiles {
        self.load(Slot::TeamProfiles)
    }

    pub fn team_profile(&self, team_number: u32) -> Option<TeamProfile> {
        self.team_profiles().remove(&team_number)
    }

    /// Save a pit scouting submission, replacing any existing profile for the
    /// team, and mark it pending.
    pub fn save_team_profile(&self, draft: TeamProfileDraft) -> Result<TeamProfile, AppError> {
        draft.validate()?;

        let _guard = self.lock();
        let mut profiles: TeamProfiles = self.load(Slot::TeamProfiles);
        let previous = profiles.get(&draft.team_number).map(|p| p.updated_at);

        let profile = TeamProfile {
            team_number: draft.team_number,
            description: draft.description,
            balls_per_second: draft.balls_per_second,
            image: draft.image,
            updated_at: monotonic_now(previous),
        };

        profiles.insert(profile.team_number, profile.clone());
        self.persist(Slot::TeamProfiles, &profiles);
        self.mark_pending_locked(PendingEntry::Profile(profile.team_number));

        tracing::debug!(team = profile.team_number, "Saved team profile");
        Ok(profile)
    }

    /// Delete a profile and its pending entry. Returns `true` if one existed.
    pub fn delete_team_profile(&self, team_number: u32) -> bool {
        let _guard = self.lock();
        let mut profiles: TeamProfiles = self.load(Slot::TeamProfiles);
        let existed = profiles.remove(&team_number).is_some();

        if existed {
            self.persist(Slot::TeamProfiles, &profiles);
        }
        self.clear_pending_locked(&PendingEntry::Profile(team_number));

        existed
    }

    /// Swap a profile's photo without counting as a local edit.
    ///
    /// Only applied if the profile still carries `expected_updated_at`; a
    /// profile edited in the meantime keeps its newer content.
    pub(crate) fn replace_profile_image(
        &self,
        team_number: u32,
        expected_updated_at: DateTime<Utc>,
        image: ProfileImage,
    ) -> bool {
        let _guard = self.lock();
        let mut profiles: TeamProfiles = self.load(Slot::TeamProfiles);

        match profiles.get_mut(&team_number) {
            Some(profile) if profile.updated_at == expected_updated_at => {
                profile.image = image;
                self.persist(Slot::TeamProfiles, &profiles);
                true
            }
            _ => false,
        }
    }

    /// Apply `f` to the profile map and persist the result.
    pub(crate) fn update_team_profiles<R>(&self, f: impl FnOnce(&mut TeamProfiles) -> R) -> R {
        let _guard = self.lock();
        let mut profiles: TeamProfiles = self.load(Slot::TeamProfiles);
        let result = f(&mut profiles);
        self.persist(Slot::TeamProfiles, &profiles);
        result
    }

    // ─── Match Records ───────────────────────────────────────────

    pub fn match_records(&self) -> Vec<MatchRecord> {
        self.load(Slot::MatchRecords)
    }

    pub fn match_record(&self, key: &RecordKey) -> Option<MatchRecord> {
        self.match_records()
            .into_iter()
            .find(|record| record.matches_key(key))
    }

    /// Save a match scouting submission under this station's device id.
    ///
    /// A record with the same (team, match, device) key is replaced in place.
    pub fn save_match_record(&self, draft: MatchRecordDraft) -> Result<MatchRecord, AppError> {
        draft.validate()?;

        let _guard = self.lock();
        let device_id = self.device_id_locked();
        let mut records: Vec<MatchRecord> = self.load(Slot::MatchRecords);

        let key = RecordKey::new(draft.team_number, draft.match_number, device_id.clone());
        let existing = records.iter().position(|r| r.matches_key(&key));
        let previous = existing.map(|i| records[i].created_at);

        let record = draft.into_record(device_id, monotonic_now(previous));
        match existing {
            Some(index) => records[index] = record.clone(),
            None => records.push(record.clone()),
        }

        self.persist(Slot::MatchRecords, &records);
        self.mark_pending_locked(PendingEntry::Record(key));

        tracing::debug!(
            team = record.team_number,
            match_number = record.match_number,
            replaced = existing.is_some(),
            "Saved match record"
        );
        Ok(record)
    }

    /// Delete a record and its pending entry. Returns `true` if one existed.
    pub fn delete_match_record(&self, key: &RecordKey) -> bool {
        let _guard = self.lock();
        let mut records: Vec<MatchRecord> = self.load(Slot::MatchRecords);
        let before = records.len();
        records.retain(|r| !r.matches_key(key));
        let existed = records.len() != before;

        if existed {
            self.persist(Slot::MatchRecords, &records);
        }
        self.clear_pending_locked(&PendingEntry::Record(key.clone()));

        existed
    }

    /// Drop every local match record and all pending record entries.
    /// Team profiles are kept.
    pub fn clear_all_match_records(&self) -> usize {
        let _guard = self.lock();
        let records: Vec<MatchRecord> = self.load(Slot::MatchRecords);
        self.persist(Slot::MatchRecords, &Vec::<MatchRecord>::new());

        let mut pending: PendingSync = self.load(Slot::PendingSync);
        pending.match_records.clear();
        self.persist(Slot::PendingSync, &pending);

        records.len()
    }

    /// Suggested match number for the next scouting session.
    pub fn next_match_number(&self) -> u32 {
        self.match_records()
            .iter()
            .map(|r| r.match_number)
            .max()
            .map_or(1, |max| max + 1)
    }

    // ─── Active Event ────────────────────────────────────────────

    pub fn current_event(&self) -> Option<ActiveEvent> {
        self.load_opt(Slot::CurrentEvent)
    }

    /// Replace the active event snapshot.
    pub fn set_current_event(&self, event: &ActiveEvent) {
        let _guard = self.lock();
        self.persist(Slot::CurrentEvent, event);
    }

    pub fn clear_current_event(&self) {
        let _guard = self.lock();
        self.erase(Slot::CurrentEvent);
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

/// `device_` followed by random hex.
fn generate_device_id() -> String {
    let mut bytes = [0u8; DEVICE_ID_BYTES];
    if SystemRandom::new().fill(&mut bytes).is_err() {
        // The system RNG is unavailable; fall back to the clock so the
        // station still gets a usable id.
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        bytes.copy_from_slice(&nanos.to_le_bytes()[..DEVICE_ID_BYTES]);
    }
    format!("device_{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_device_id_shape() {
        let id = generate_device_id();
        assert!(id.starts_with("device_"));
        assert_eq!(id.len(), "device_".len() + DEVICE_ID_BYTES * 2);
    }

    #[test]
    fn test_next_match_number() {
        let store = LocalStore::in_memory();
        assert_eq!(store.next_match_number(), 1);

        store
            .save_match_record(MatchRecordDraft {
                team_number: 254,
                match_number: 12,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.next_match_number(), 13);
    }

    #[test]
    fn test_resaving_profile_advances_updated_at() {
        let store = LocalStore::in_memory();
        let draft = TeamProfileDraft {
            team_number: 107,
            ..Default::default()
        };
        let first = store.save_team_profile(draft.clone()).unwrap();
        let second = store.save_team_profile(draft).unwrap();
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn test_replace_image_skipped_after_edit() {
        let store = LocalStore::in_memory();
        let first = store
            .save_team_profile(TeamProfileDraft {
                team_number: 107,
                ..Default::default()
            })
            .unwrap();
        store
            .save_team_profile(TeamProfileDraft {
                team_number: 107,
                description: "edited".to_string(),
                ..Default::default()
            })
            .unwrap();

        let swapped = store.replace_profile_image(
            107,
            first.updated_at,
            ProfileImage::Remote {
                url: "https://example.com/107.jpg".to_string(),
            },
        );
        assert!(!swapped);
        assert_eq!(store.team_profile(107).unwrap().image, ProfileImage::None);
    }
}
