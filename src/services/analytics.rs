// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-team aggregates computed on demand from local match records and
//! profiles.

use crate::models::{MatchRecord, TeamProfile};
use crate::store::LocalStore;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Averages for one team across its scouted matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamStats {
    pub team_number: u32,
    pub matches: usize,
    pub avg_auto_firing_seconds: f64,
    pub avg_teleop_firing_seconds: f64,
    pub avg_auto_accuracy: f64,
    pub avg_teleop_accuracy: f64,

    // ─── Estimated Fuel ──────────────────────────────────────────
    // Present only when the team's profile has a firing rate.
    pub auto_fuel: Option<f64>,
    pub teleop_fuel: Option<f64>,
    pub total_fuel: Option<f64>,

    /// Average over matches where defense was played; 0 if none
    pub avg_defense: f64,
    pub has_pit_data: bool,
}

/// Sort key for [`rank_teams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    TeamNumber,
    Matches,
    AutoFuel,
    TeleopFuel,
    TotalFuel,
    Defense,
}

/// Teams the station reports on: the active event's roster if one is
/// loaded, otherwise every team with at least one match record.
pub fn team_universe(store: &LocalStore) -> Vec<u32> {
    if let Some(event) = store.current_event().filter(|e| !e.teams.is_empty()) {
        return event.team_numbers();
    }

    store
        .match_records()
        .iter()
        .map(|r| r.team_number)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn team_stats(store: &LocalStore, team_number: u32) -> TeamStats {
    let records = store.match_records();
    let profile = store.team_profile(team_number);
    compute_stats(team_number, &records, profile.as_ref())
}

/// Teams in [`team_universe`] that nobody has pit scouted yet.
pub fn teams_missing_pit_data(store: &LocalStore) -> Vec<u32> {
    let profiles = store.team_profiles();
    team_universe(store)
        .into_iter()
        .filter(|team| !profiles.contains_key(team))
        .collect()
}

/// Stats for every team in the universe, best first by `rank_by`
/// (ascending for [`RankBy::TeamNumber`]).
pub fn rank_teams(store: &LocalStore, rank_by: RankBy) -> Vec<TeamStats> {
    let records = store.match_records();
    let profiles = store.team_profiles();

    let mut stats: Vec<TeamStats> = team_universe(store)
        .into_iter()
        .map(|team| compute_stats(team, &records, profiles.get(&team)))
        .collect();

    let value = |s: &TeamStats| -> f64 {
        match rank_by {
            RankBy::TeamNumber => f64::from(s.team_number),
            RankBy::Matches => s.matches as f64,
            RankBy::AutoFuel => s.auto_fuel.unwrap_or(0.0),
            RankBy::TeleopFuel => s.teleop_fuel.unwrap_or(0.0),
            RankBy::TotalFuel => s.total_fuel.unwrap_or(0.0),
            RankBy::Defense => s.avg_defense,
        }
    };

    stats.sort_by(|a, b| {
        let ord = value(a).partial_cmp(&value(b)).unwrap_or(Ordering::Equal);
        let ord = if rank_by == RankBy::TeamNumber {
            ord
        } else {
            ord.reverse()
        };
        ord.then(a.team_number.cmp(&b.team_number))
    });
    stats
}

fn compute_stats(
    team_number: u32,
    records: &[MatchRecord],
    profile: Option<&TeamProfile>,
) -> TeamStats {
    let rate = profile.and_then(|p| p.balls_per_second).filter(|r| *r > 0.0);
    let mut stats = TeamStats {
        team_number,
        has_pit_data: profile.is_some(),
        ..Default::default()
    };

    let team_records: Vec<&MatchRecord> = records
        .iter()
        .filter(|r| r.team_number == team_number)
        .collect();
    if team_records.is_empty() {
        return stats;
    }

    let mut auto_fuel = 0.0;
    let mut teleop_fuel = 0.0;
    let mut defense_total = 0u32;
    let mut defense_count = 0u32;

    for r in &team_records {
        stats.avg_auto_firing_seconds += r.auto_firing_seconds;
        stats.avg_teleop_firing_seconds += r.teleop_firing_seconds;
        stats.avg_auto_accuracy += f64::from(r.auto_accuracy);
        stats.avg_teleop_accuracy += f64::from(r.teleop_accuracy);

        if let Some(rate) = rate {
            auto_fuel += r.auto_firing_seconds * rate * f64::from(r.auto_accuracy) / 100.0;
            teleop_fuel += r.teleop_firing_seconds * rate * f64::from(r.teleop_accuracy) / 100.0;
        }

        if r.defense_rating > 0 {
            defense_total += u32::from(r.defense_rating);
            defense_count += 1;
        }
    }

    let n = team_records.len() as f64;
    stats.matches = team_records.len();
    stats.avg_auto_firing_seconds /= n;
    stats.avg_teleop_firing_seconds /= n;
    stats.avg_auto_accuracy /= n;
    stats.avg_teleop_accuracy /= n;

    if rate.is_some() {
        stats.auto_fuel = Some(auto_fuel / n);
        stats.teleop_fuel = Some(teleop_fuel / n);
        stats.total_fuel = Some((auto_fuel + teleop_fuel) / n);
    }

    if defense_count > 0 {
        stats.avg_defense = f64::from(defense_total) / f64::from(defense_count);
    }

    stats
}
