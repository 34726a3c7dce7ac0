// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod event;
pub mod pending;
pub mod profile;
pub mod record;

pub use event::{ActiveEvent, EventTeam};
pub use pending::{PendingEntry, PendingSync};
pub use profile::{ProfileImage, RemoteTeamProfile, TeamProfile, TeamProfileDraft};
pub use record::{
    Alliance, ClimbLevel, MatchRecord, MatchRecordDraft, RecordKey, RemoteMatchRecord,
};
