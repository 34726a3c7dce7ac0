// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PitScout-Sync: offline-first data layer for FRC scouting stations
//!
//! This crate keeps pit and match scouting data durable on each station and
//! reconciles it with a shared remote store whenever connectivity allows.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use db::RemoteStore;
use services::{AssetStore, ConnectivityMonitor, OperatorActions, RosterClient, SyncEngine};
use std::sync::Arc;
use store::LocalStore;

/// Shared station state.
pub struct Station {
    pub config: Config,
    pub store: Arc<LocalStore>,
    pub connectivity: ConnectivityMonitor,
    pub sync: Arc<SyncEngine>,
    pub roster: RosterClient,
    pub operator: OperatorActions,
}

impl Station {
    pub fn new(
        config: Config,
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteStore>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let connectivity = ConnectivityMonitor::new(false);
        let sync = Arc::new(SyncEngine::new(
            store.clone(),
            remote.clone(),
            assets,
            connectivity.clone(),
        ));
        let roster = RosterClient::new(&config.tba_base_url, config.tba_api_key.clone());
        let operator = OperatorActions::new(store.clone(), remote);

        Self {
            config,
            store,
            connectivity,
            sync,
            roster,
            operator,
        }
    }
}
