// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The Blue Alliance API client for event rosters.
//!
//! Handles:
//! - Team list for an event
//! - Event name, dates and location
//! - Loading an event into the station's active-event slot

use crate::models::{ActiveEvent, EventTeam};
use crate::store::LocalStore;
use serde::Deserialize;

/// Default TBA API endpoint.
pub const DEFAULT_TBA_BASE_URL: &str = "https://www.thebluealliance.com/api/v3";

/// Roster lookup failures, categorized for display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("TBA API key not configured. Set TBA_API_KEY.")]
    NotConfigured,

    #[error("Please enter an event key")]
    EmptyKey,

    #[error("Event \"{0}\" not found. Check the event key format (e.g., 2026miket).")]
    NotFound(String),

    #[error("Invalid TBA API key. Check TBA_API_KEY.")]
    Unauthorized,

    #[error("Roster request failed: {0}")]
    Other(String),
}

/// Event details from the roster service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventInfo {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_prov: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Team entry from `/event/{key}/teams/simple`.
#[derive(Debug, Clone, Deserialize)]
struct TbaTeamSimple {
    team_number: u32,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state_prov: Option<String>,
}

impl From<TbaTeamSimple> for EventTeam {
    fn from(team: TbaTeamSimple) -> Self {
        Self {
            nickname: team
                .nickname
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Team {}", team.team_number)),
            team_number: team.team_number,
            city: team.city.unwrap_or_default(),
            state_prov: team.state_prov.unwrap_or_default(),
        }
    }
}

/// Roster API client.
#[derive(Clone)]
pub struct RosterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RosterClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Teams attending an event, sorted by team number.
    pub async fn fetch_event_teams(&self, event_key: &str) -> Result<Vec<EventTeam>, RosterError> {
        let url = format!(
            "{}/event/{}/teams/simple",
            self.base_url,
            urlencoding::encode(event_key)
        );
        let teams: Vec<TbaTeamSimple> = self.get_json(&url, event_key).await?;

        let mut teams: Vec<EventTeam> = teams.into_iter().map(EventTeam::from).collect();
        teams.sort_by_key(|t| t.team_number);
        Ok(teams)
    }

    /// Event name, dates and location.
    pub async fn fetch_event_info(&self, event_key: &str) -> Result<EventInfo, RosterError> {
        let url = format!(
            "{}/event/{}/simple",
            self.base_url,
            urlencoding::encode(event_key)
        );
        self.get_json(&url, event_key).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        event_key: &str,
    ) -> Result<T, RosterError> {
        let api_key = self.api_key.as_deref().ok_or(RosterError::NotConfigured)?;

        let response = self
            .http
            .get(url)
            .header("X-TBA-Auth-Key", api_key)
            .send()
            .await
            .map_err(|e| RosterError::Other(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                404 => RosterError::NotFound(event_key.to_string()),
                401 => RosterError::Unauthorized,
                _ => {
                    let reason = status.canonical_reason().unwrap_or("unknown status");
                    RosterError::Other(format!("HTTP {} {}", status.as_u16(), reason))
                }
            });
        }

        response
            .json()
            .await
            .map_err(|e| RosterError::Other(format!("JSON parse error: {}", e)))
    }
}

/// Fetch an event's info and roster and make it the station's active event.
///
/// The previous active event is replaced only if both lookups succeed.
pub async fn load_event(
    store: &LocalStore,
    client: &RosterClient,
    event_key: &str,
) -> Result<ActiveEvent, RosterError> {
    let event_key = event_key.trim();
    if event_key.is_empty() {
        return Err(RosterError::EmptyKey);
    }

    let (info, teams) = tokio::try_join!(
        client.fetch_event_info(event_key),
        client.fetch_event_teams(event_key),
    )?;

    let event = ActiveEvent {
        key: info.key,
        name: info.name,
        teams,
        start_date: info.start_date,
        end_date: info.end_date,
        loaded_at: chrono::Utc::now(),
    };
    store.set_current_event(&event);

    tracing::info!(
        event = %event.key,
        teams = event.teams.len(),
        "Loaded event roster"
    );
    Ok(event)
}
