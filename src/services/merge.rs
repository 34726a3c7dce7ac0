// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciliation of remote profile snapshots into the local store.
//!
//! Last-writer-wins per team: a remote snapshot replaces the local profile
//! only if there is no local profile or the remote one is strictly newer.
//! Ties keep the local copy. There is no field-level merge.

use crate::models::RemoteTeamProfile;
use crate::store::LocalStore;

/// Outcome of a merge, by team number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Teams whose local profile now equals the remote snapshot
    pub replaced: Vec<u32>,
    /// Teams whose local profile was left untouched
    pub kept: Vec<u32>,
}

/// Merge remote snapshots into the local profile map.
///
/// Never marks anything pending: the merged content already lives remotely.
pub fn merge_remote_profiles(store: &LocalStore, remote: &[RemoteTeamProfile]) -> MergeReport {
    store.update_team_profiles(|profiles| {
        let mut report = MergeReport::default();

        for snapshot in remote {
            let team_number = snapshot.team_number;

            let Some(remote_updated_at) = snapshot.updated_at_utc() else {
                tracing::warn!(
                    team = team_number,
                    updated_at = %snapshot.updated_at,
                    "Remote profile has unparseable timestamp, keeping local"
                );
                report.kept.push(team_number);
                continue;
            };

            let remote_wins = match profiles.get(&team_number) {
                None => true,
                Some(local) => remote_updated_at > local.updated_at,
            };

            if remote_wins {
                profiles.insert(
                    team_number,
                    snapshot.clone().into_local(remote_updated_at),
                );
                report.replaced.push(team_number);
            } else {
                report.kept.push(team_number);
            }
        }

        report
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamProfileDraft;

    fn snapshot(team_number: u32, description: &str, updated_at: &str) -> RemoteTeamProfile {
        RemoteTeamProfile {
            team_number,
            description: description.to_string(),
            balls_per_second: None,
            photo_url: None,
            updated_at: updated_at.to_string(),
        }
    }

    #[test]
    fn test_missing_local_takes_remote() {
        let store = LocalStore::in_memory();
        let report = merge_remote_profiles(&store, &[snapshot(254, "B", "2026-01-02T00:00:00Z")]);

        assert_eq!(report.replaced, vec![254]);
        assert_eq!(store.team_profile(254).unwrap().description, "B");
        assert!(!store.has_pending_data());
    }

    #[test]
    fn test_unparseable_timestamp_never_wins() {
        let store = LocalStore::in_memory();
        store
            .save_team_profile(TeamProfileDraft {
                team_number: 254,
                description: "local".to_string(),
                ..Default::default()
            })
            .unwrap();

        let report = merge_remote_profiles(&store, &[snapshot(254, "remote", "not a date")]);
        assert_eq!(report.kept, vec![254]);
        assert_eq!(store.team_profile(254).unwrap().description, "local");
    }
}
