// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-match performance record collected during match scouting.

use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Composite identity of a match record.
///
/// The device id is part of the key: several stations may scout the same
/// team in the same match, and each observation is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub team_number: u32,
    pub match_number: u32,
    pub device_id: String,
}

impl RecordKey {
    pub fn new(team_number: u32, match_number: u32, device_id: impl Into<String>) -> Self {
        Self {
            team_number,
            match_number,
            device_id: device_id.into(),
        }
    }

    /// Remote document ID. Encodes the whole conflict key so re-upserting the
    /// same record overwrites instead of duplicating.
    pub fn document_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.team_number,
            self.match_number,
            urlencoding::encode(&self.device_id)
        )
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "team {} match {} ({})",
            self.team_number, self.match_number, self.device_id
        )
    }
}

/// Alliance the scouted robot played on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    #[default]
    Red,
    Blue,
}

/// Climb result, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClimbLevel {
    #[default]
    None,
    L1,
    L2,
    L3,
}

impl ClimbLevel {
    pub const ALL: [ClimbLevel; 4] = [
        ClimbLevel::None,
        ClimbLevel::L1,
        ClimbLevel::L2,
        ClimbLevel::L3,
    ];

    /// Only the first rung is reachable during the autonomous period.
    pub fn allowed_in_auto(self) -> bool {
        matches!(self, ClimbLevel::None | ClimbLevel::L1)
    }
}

/// Match record as stored on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub team_number: u32,
    pub match_number: u32,
    pub alliance_color: Alliance,
    /// Seconds spent firing during autonomous
    pub auto_firing_seconds: f64,
    /// Accuracy percentage during autonomous (0-100, step 5)
    pub auto_accuracy: u8,
    pub auto_climb: ClimbLevel,
    /// Seconds spent firing during teleop
    pub teleop_firing_seconds: f64,
    /// Accuracy percentage during teleop (0-100, step 5)
    pub teleop_accuracy: u8,
    pub teleop_climb: ClimbLevel,
    /// 0 = no defense played, otherwise 1-5
    pub defense_rating: u8,
    #[serde(default)]
    pub notes: String,
    /// Station that scouted this record
    pub scouter_device_id: String,
    /// Refreshed whenever the record is re-saved
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(
            self.team_number,
            self.match_number,
            self.scouter_device_id.clone(),
        )
    }

    pub fn matches_key(&self, key: &RecordKey) -> bool {
        self.team_number == key.team_number
            && self.match_number == key.match_number
            && self.scouter_device_id == key.device_id
    }
}

/// Match scouting form submission.
#[derive(Debug, Clone, Default, Validate)]
#[validate(schema(function = "validate_finite_durations"))]
pub struct MatchRecordDraft {
    #[validate(range(min = 1, max = 99999))]
    pub team_number: u32,
    #[validate(range(min = 1))]
    pub match_number: u32,
    pub alliance_color: Alliance,
    #[validate(range(min = 0.0))]
    pub auto_firing_seconds: f64,
    #[validate(range(max = 100), custom(function = "validate_accuracy_step"))]
    pub auto_accuracy: u8,
    #[validate(custom(function = "validate_auto_climb"))]
    pub auto_climb: ClimbLevel,
    #[validate(range(min = 0.0))]
    pub teleop_firing_seconds: f64,
    #[validate(range(max = 100), custom(function = "validate_accuracy_step"))]
    pub teleop_accuracy: u8,
    pub teleop_climb: ClimbLevel,
    #[validate(range(max = 5))]
    pub defense_rating: u8,
    #[validate(length(max = 4000))]
    pub notes: String,
}

impl MatchRecordDraft {
    pub(crate) fn into_record(self, device_id: String, created_at: DateTime<Utc>) -> MatchRecord {
        MatchRecord {
            team_number: self.team_number,
            match_number: self.match_number,
            alliance_color: self.alliance_color,
            auto_firing_seconds: self.auto_firing_seconds,
            auto_accuracy: self.auto_accuracy,
            auto_climb: self.auto_climb,
            teleop_firing_seconds: self.teleop_firing_seconds,
            teleop_accuracy: self.teleop_accuracy,
            teleop_climb: self.teleop_climb,
            defense_rating: self.defense_rating,
            notes: self.notes,
            scouter_device_id: device_id,
            created_at,
        }
    }
}

fn validate_accuracy_step(value: u8) -> Result<(), ValidationError> {
    if value % 5 == 0 {
        Ok(())
    } else {
        Err(ValidationError::new("accuracy_step"))
    }
}

/// Non-finite floats serialize as JSON `null` and would not load back.
fn validate_finite_durations(draft: &MatchRecordDraft) -> Result<(), ValidationError> {
    if draft.auto_firing_seconds.is_finite() && draft.teleop_firing_seconds.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("non_finite_duration"))
    }
}

fn validate_auto_climb(value: &ClimbLevel) -> Result<(), ValidationError> {
    if value.allowed_in_auto() {
        Ok(())
    } else {
        Err(ValidationError::new("auto_climb_level"))
    }
}

/// Match record row in the shared remote store.
///
/// Keyed by `(team_number, match_number, scouter_device_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMatchRecord {
    pub team_number: u32,
    pub match_number: u32,
    pub alliance_color: Alliance,
    pub auto_firing_seconds: f64,
    pub auto_accuracy: u8,
    pub auto_climb: ClimbLevel,
    pub teleop_firing_seconds: f64,
    pub teleop_accuracy: u8,
    pub teleop_climb: ClimbLevel,
    pub defense_rating: u8,
    #[serde(default)]
    pub notes: String,
    pub scouter_device_id: String,
    #[serde(default)]
    pub created_at: String,
}

impl RemoteMatchRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(
            self.team_number,
            self.match_number,
            self.scouter_device_id.clone(),
        )
    }
}

impl From<&MatchRecord> for RemoteMatchRecord {
    fn from(record: &MatchRecord) -> Self {
        Self {
            team_number: record.team_number,
            match_number: record.match_number,
            alliance_color: record.alliance_color,
            auto_firing_seconds: record.auto_firing_seconds,
            auto_accuracy: record.auto_accuracy,
            auto_climb: record.auto_climb,
            teleop_firing_seconds: record.teleop_firing_seconds,
            teleop_accuracy: record.teleop_accuracy,
            teleop_climb: record.teleop_climb,
            defense_rating: record.defense_rating,
            notes: record.notes.clone(),
            scouter_device_id: record.scouter_device_id.clone(),
            created_at: format_utc_rfc3339(record.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> MatchRecordDraft {
        MatchRecordDraft {
            team_number: 107,
            match_number: 3,
            auto_accuracy: 50,
            teleop_accuracy: 75,
            ..Default::default()
        }
    }

    #[test]
    fn test_document_id_encodes_device() {
        let key = RecordKey::new(107, 3, "device one");
        assert_eq!(key.document_id(), "107_3_device%20one");
    }

    #[test]
    fn test_climb_levels_are_ordered() {
        assert!(ClimbLevel::L3 > ClimbLevel::L2);
        assert!(ClimbLevel::None < ClimbLevel::L1);
        assert!(ClimbLevel::L1.allowed_in_auto());
        assert!(!ClimbLevel::L2.allowed_in_auto());
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_accuracy_must_be_step_of_five() {
        let mut d = draft();
        d.auto_accuracy = 33;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_defense_rating_capped_at_five() {
        let mut d = draft();
        d.defense_rating = 6;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_auto_climb_limited_to_first_level() {
        let mut d = draft();
        d.auto_climb = ClimbLevel::L3;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.teleop_climb = ClimbLevel::L3;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_negative_firing_time_rejected() {
        let mut d = draft();
        d.teleop_firing_seconds = -1.0;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_non_finite_firing_time_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut d = draft();
            d.auto_firing_seconds = bad;
            assert!(d.validate().is_err(), "auto {} accepted", bad);

            let mut d = draft();
            d.teleop_firing_seconds = bad;
            assert!(d.validate().is_err(), "teleop {} accepted", bad);
        }
    }

    #[test]
    fn test_alliance_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Alliance::Blue).unwrap(), "\"blue\"");
        assert_eq!(serde_json::to_string(&ClimbLevel::L2).unwrap(), "\"L2\"");
    }
}
