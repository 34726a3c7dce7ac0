// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - sync, reconciliation and scouting logic.

pub mod analytics;
pub mod assets;
pub mod connectivity;
pub mod merge;
pub mod operator;
pub mod roster;
pub mod sync;
pub mod timer;

pub use analytics::{rank_teams, team_stats, team_universe, teams_missing_pit_data, RankBy, TeamStats};
pub use assets::{AssetStore, CloudStorageAssets};
pub use connectivity::ConnectivityMonitor;
pub use merge::{merge_remote_profiles, MergeReport};
pub use operator::{verify_admin_password, ClearReport, OperatorActions};
pub use roster::{load_event, EventInfo, RosterClient, RosterError};
pub use sync::{spawn_auto_sync, SkipReason, SyncEngine, SyncError, SyncOutcome, SyncReport, SyncStatus};
pub use timer::{FiringTimer, Phase};
