// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team capability profile collected during pit scouting.

use crate::error::AppError;
use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Team profile as stored on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProfile {
    /// Team number (unique key)
    pub team_number: u32,
    /// Free-text robot description
    #[serde(default)]
    pub description: String,
    /// Firing rate, used for fuel estimates
    #[serde(default)]
    pub balls_per_second: Option<f64>,
    /// Robot photo
    #[serde(default)]
    pub image: ProfileImage,
    /// Refreshed on every local write
    pub updated_at: DateTime<Utc>,
}

/// Robot photo attached to a profile.
///
/// A freshly captured photo is held inline until the sync engine uploads it
/// and swaps in the public URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileImage {
    #[default]
    None,
    Inline {
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
        content_type: String,
    },
    Remote {
        url: String,
    },
}

impl ProfileImage {
    /// Build an inline image from a `data:<mime>;base64,<payload>` URL, the
    /// format produced by the camera capture widget.
    pub fn from_data_url(data_url: &str) -> Result<Self, AppError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| AppError::BadRequest("Photo is not a data URL".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| AppError::BadRequest("Malformed photo data URL".to_string()))?;
        let content_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| AppError::BadRequest("Photo data URL must be base64".to_string()))?;

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| AppError::BadRequest(format!("Invalid photo encoding: {}", e)))?;

        Ok(ProfileImage::Inline {
            bytes,
            content_type: if content_type.is_empty() {
                "image/jpeg".to_string()
            } else {
                content_type.to_string()
            },
        })
    }

    /// Public URL once the photo has been uploaded.
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            ProfileImage::Remote { url } => Some(url),
            _ => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ProfileImage::Inline { .. })
    }
}

/// Pit scouting form submission. Overwrites any existing profile for the team.
#[derive(Debug, Clone, Default, Validate)]
#[validate(schema(function = "validate_finite_rate"))]
pub struct TeamProfileDraft {
    #[validate(range(min = 1, max = 99999))]
    pub team_number: u32,
    #[validate(length(max = 4000))]
    pub description: String,
    #[validate(range(min = 0.0, max = 10.0))]
    pub balls_per_second: Option<f64>,
    pub image: ProfileImage,
}

fn validate_finite_rate(draft: &TeamProfileDraft) -> Result<(), ValidationError> {
    match draft.balls_per_second {
        Some(rate) if !rate.is_finite() => Err(ValidationError::new("non_finite_rate")),
        _ => Ok(()),
    }
}

/// Profile row in the shared remote store (keyed by team number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTeamProfile {
    pub team_number: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub balls_per_second: Option<f64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Last local modification (RFC3339)
    pub updated_at: String,
}

impl RemoteTeamProfile {
    /// Parsed `updated_at`, or `None` if the remote value is malformed.
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_utc_rfc3339(&self.updated_at)
    }

    /// Convert into a local profile stamped with the given modification time.
    pub fn into_local(self, updated_at: DateTime<Utc>) -> TeamProfile {
        TeamProfile {
            team_number: self.team_number,
            description: self.description,
            balls_per_second: self.balls_per_second,
            image: self
                .photo_url
                .map(|url| ProfileImage::Remote { url })
                .unwrap_or_default(),
            updated_at,
        }
    }
}

impl From<&TeamProfile> for RemoteTeamProfile {
    /// Inline photos are never sent; only an uploaded URL is.
    fn from(profile: &TeamProfile) -> Self {
        Self {
            team_number: profile.team_number,
            description: profile.description.clone(),
            balls_per_second: profile.balls_per_second,
            photo_url: profile.image.remote_url().map(str::to_string),
            updated_at: format_utc_rfc3339(profile.updated_at),
        }
    }
}

mod base64_bytes {
    use super::BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_data_url() {
        let image = ProfileImage::from_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(
            image,
            ProfileImage::Inline {
                bytes: b"hello".to_vec(),
                content_type: "image/png".to_string(),
            }
        );
    }

    #[test]
    fn test_from_data_url_rejects_plain_url() {
        let err = ProfileImage::from_data_url("https://example.com/robot.jpg").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_inline_image_serializes_as_base64() {
        let image = ProfileImage::Inline {
            bytes: vec![0xff, 0xd8, 0xff],
            content_type: "image/jpeg".to_string(),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["kind"], "inline");
        assert_eq!(json["bytes"], "/9j/");

        let back: ProfileImage = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_remote_row_omits_inline_photo() {
        let profile = TeamProfile {
            team_number: 107,
            description: "Swerve".to_string(),
            balls_per_second: Some(2.5),
            image: ProfileImage::Inline {
                bytes: vec![1, 2, 3],
                content_type: "image/jpeg".to_string(),
            },
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };

        let row = RemoteTeamProfile::from(&profile);
        assert_eq!(row.photo_url, None);
        assert_eq!(row.updated_at, "2026-01-01T00:00:00Z");
        assert_eq!(row.updated_at_utc(), Some(profile.updated_at));
    }

    #[test]
    fn test_draft_validation_rejects_out_of_range_rate() {
        let draft = TeamProfileDraft {
            team_number: 107,
            balls_per_second: Some(42.0),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_validation_rejects_nan_rate() {
        let draft = TeamProfileDraft {
            team_number: 107,
            balls_per_second: Some(f64::NAN),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }
}
