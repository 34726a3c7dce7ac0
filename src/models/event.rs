// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Active event roster cached on the device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The event this station is currently scouting.
///
/// Loading another event replaces this value wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEvent {
    /// Event key (e.g., "2026miket")
    pub key: String,
    /// Display name
    pub name: String,
    /// Teams attending, sorted by team number
    #[serde(default)]
    pub teams: Vec<EventTeam>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// When the roster was fetched
    pub loaded_at: DateTime<Utc>,
}

impl ActiveEvent {
    /// Team numbers attending, ascending.
    pub fn team_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.teams.iter().map(|t| t.team_number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}

/// A team on the event roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTeam {
    pub team_number: u32,
    pub nickname: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state_prov: String,
}
