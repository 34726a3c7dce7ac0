// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pending-change tracking.
//!
//! Both the save paths and the sync engine go through these primitives, so
//! there is a single view of what still needs to reach the remote store.

use super::{LocalStore, Slot, TeamProfiles};
use crate::models::{MatchRecord, PendingEntry, PendingSync, RecordKey};
use chrono::{DateTime, Utc};

impl LocalStore {
    /// Mark an entity as having unsynced local changes. Idempotent.
    pub fn mark_pending(&self, entry: PendingEntry) {
        let _guard = self.lock();
        self.mark_pending_locked(entry);
    }

    /// Remove an entity from the pending set. Idempotent.
    pub fn clear_pending(&self, entry: &PendingEntry) {
        let _guard = self.lock();
        self.clear_pending_locked(entry);
    }

    /// `true` if any profile or record awaits sync.
    pub fn has_pending_data(&self) -> bool {
        !self.pending_snapshot().is_empty()
    }

    /// Copy of the current pending set.
    pub fn pending_snapshot(&self) -> PendingSync {
        self.load(Slot::PendingSync)
    }

    /// Clear a profile's pending entry after the version stamped
    /// `synced_version` was confirmed remotely.
    ///
    /// A profile edited after that version stays pending. A profile deleted
    /// in the meantime is cleared. Returns `true` if the entry was cleared.
    pub fn clear_pending_profile_if_unchanged(
        &self,
        team_number: u32,
        synced_version: DateTime<Utc>,
    ) -> bool {
        let _guard = self.lock();
        let profiles: TeamProfiles = self.load(Slot::TeamProfiles);

        match profiles.get(&team_number) {
            Some(profile) if profile.updated_at != synced_version => {
                tracing::debug!(team = team_number, "Profile edited during sync, keeping pending");
                false
            }
            _ => {
                self.clear_pending_locked(&PendingEntry::Profile(team_number));
                true
            }
        }
    }

    /// Record counterpart of [`clear_pending_profile_if_unchanged`](Self::clear_pending_profile_if_unchanged).
    pub fn clear_pending_record_if_unchanged(
        &self,
        key: &RecordKey,
        synced_version: DateTime<Utc>,
    ) -> bool {
        let _guard = self.lock();
        let records: Vec<MatchRecord> = self.load(Slot::MatchRecords);

        match records.iter().find(|r| r.matches_key(key)) {
            Some(record) if record.created_at != synced_version => {
                tracing::debug!(record = %key, "Record edited during sync, keeping pending");
                false
            }
            _ => {
                self.clear_pending_locked(&PendingEntry::Record(key.clone()));
                true
            }
        }
    }

    pub(super) fn mark_pending_locked(&self, entry: PendingEntry) {
        let mut pending: PendingSync = self.load(Slot::PendingSync);
        if pending.insert(entry) {
            self.persist(Slot::PendingSync, &pending);
        }
    }

    pub(super) fn clear_pending_locked(&self, entry: &PendingEntry) {
        let mut pending: PendingSync = self.load(Slot::PendingSync);
        if pending.remove(entry) {
            self.persist(Slot::PendingSync, &pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{MatchRecordDraft, PendingEntry, TeamProfileDraft};
    use crate::store::LocalStore;

    #[test]
    fn test_save_marks_pending() {
        let store = LocalStore::in_memory();
        assert!(!store.has_pending_data());

        store
            .save_team_profile(TeamProfileDraft {
                team_number: 107,
                ..Default::default()
            })
            .unwrap();

        let pending = store.pending_snapshot();
        assert_eq!(pending.team_profiles, vec![107]);
        assert!(pending.match_records.is_empty());
    }

    #[test]
    fn test_clear_pending_record_if_unchanged() {
        let store = LocalStore::in_memory();
        let first = store
            .save_match_record(MatchRecordDraft {
                team_number: 107,
                match_number: 3,
                ..Default::default()
            })
            .unwrap();
        let key = first.key();

        store
            .save_match_record(MatchRecordDraft {
                team_number: 107,
                match_number: 3,
                notes: "second look".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert!(!store.clear_pending_record_if_unchanged(&key, first.created_at));
        assert!(store.pending_snapshot().contains(&PendingEntry::Record(key.clone())));

        let current = store.match_record(&key).unwrap();
        assert!(store.clear_pending_record_if_unchanged(&key, current.created_at));
        assert!(!store.has_pending_data());
    }
}
