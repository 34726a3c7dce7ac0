// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identifiers of entities with local edits not yet confirmed remotely.

use crate::models::RecordKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One outstanding entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendingEntry {
    Profile(u32),
    Record(RecordKey),
}

impl fmt::Display for PendingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingEntry::Profile(team) => write!(f, "profile for team {}", team),
            PendingEntry::Record(key) => write!(f, "record for {}", key),
        }
    }
}

/// Pending-change set. Each identifier appears at most once per list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSync {
    #[serde(default)]
    pub team_profiles: Vec<u32>,
    #[serde(default)]
    pub match_records: Vec<RecordKey>,
}

impl PendingSync {
    pub fn is_empty(&self) -> bool {
        self.team_profiles.is_empty() && self.match_records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.team_profiles.len() + self.match_records.len()
    }

    pub fn contains(&self, entry: &PendingEntry) -> bool {
        match entry {
            PendingEntry::Profile(team) => self.team_profiles.contains(team),
            PendingEntry::Record(key) => self.match_records.contains(key),
        }
    }

    /// Returns `true` if the entry was not already present.
    pub fn insert(&mut self, entry: PendingEntry) -> bool {
        if self.contains(&entry) {
            return false;
        }
        match entry {
            PendingEntry::Profile(team) => self.team_profiles.push(team),
            PendingEntry::Record(key) => self.match_records.push(key),
        }
        true
    }

    /// Returns `true` if the entry was present.
    pub fn remove(&mut self, entry: &PendingEntry) -> bool {
        let before = self.len();
        match entry {
            PendingEntry::Profile(team) => self.team_profiles.retain(|t| t != team),
            PendingEntry::Record(key) => self.match_records.retain(|k| k != key),
        }
        self.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut pending = PendingSync::default();
        assert!(pending.insert(PendingEntry::Profile(107)));
        assert!(!pending.insert(PendingEntry::Profile(107)));
        assert_eq!(pending.team_profiles, vec![107]);
    }

    #[test]
    fn test_remove_only_touches_matching_kind() {
        let key = RecordKey::new(107, 3, "d1");
        let mut pending = PendingSync::default();
        pending.insert(PendingEntry::Profile(107));
        pending.insert(PendingEntry::Record(key.clone()));

        assert!(pending.remove(&PendingEntry::Profile(107)));
        assert!(!pending.remove(&PendingEntry::Profile(107)));
        assert!(!pending.is_empty());
        assert!(pending.contains(&PendingEntry::Record(key)));
    }
}
