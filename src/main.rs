// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PitScout-Sync station runner
//!
//! Usage:
//!   pitscout-sync                  pull remote profiles, then push pending changes
//!   pitscout-sync load-event KEY   load an event roster, then sync

use anyhow::Context;
use pitscout_sync::{
    config::Config,
    db::FirestoreDb,
    services::{load_event, CloudStorageAssets, SyncOutcome},
    store::LocalStore,
    Station,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(data_dir = %config.data_dir.display(), "Starting PitScout-Sync");

    // Open the durable local store
    let store = Arc::new(
        LocalStore::open(&config.data_dir)
            .with_context(|| format!("Failed to open store at {}", config.data_dir.display()))?,
    );
    tracing::info!(device_id = %store.device_id(), "Local store ready");

    // Connect to Firestore. A failed connection leaves the station offline
    // with every change still pending.
    let (remote, online) = match FirestoreDb::new(&config.gcp_project_id).await {
        Ok(db) => (db, true),
        Err(e) => {
            tracing::warn!(error = %e, "Remote store unreachable, running offline");
            (FirestoreDb::new_mock(), false)
        }
    };

    let assets = CloudStorageAssets::new(
        &config.asset_base_url,
        &config.asset_bucket,
        config.asset_access_token.clone(),
    );

    let station = Station::new(config, store, Arc::new(remote), Arc::new(assets));
    station.connectivity.set_online(online);

    if let Some(event_key) = event_key_arg()? {
        match load_event(&station.store, &station.roster, &event_key).await {
            Ok(event) => tracing::info!(event = %event.key, name = %event.name, "Event loaded"),
            Err(e) => tracing::error!(error = %e, "Failed to load event"),
        }
    }

    if !station.connectivity.is_online() {
        let pending = station.store.pending_snapshot();
        tracing::info!(pending = pending.len(), "Offline, nothing synced");
        return Ok(());
    }

    match station.sync.pull_profiles().await {
        Ok(report) => tracing::info!(
            replaced = report.replaced.len(),
            kept = report.kept.len(),
            "Profiles reconciled"
        ),
        Err(e) => tracing::warn!(error = %e, "Profile pull failed"),
    }

    match station.sync.sync_now().await? {
        SyncOutcome::Skipped(reason) => tracing::info!(?reason, "Sync skipped"),
        SyncOutcome::Completed(report) => tracing::info!(
            profiles = report.profiles_synced,
            records = report.records_synced,
            images = report.images_uploaded,
            image_failures = report.image_failures,
            "Sync complete"
        ),
    }

    Ok(())
}

/// Event key from `load-event KEY`, if given.
fn event_key_arg() -> anyhow::Result<Option<String>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(None),
        Some("load-event") => args
            .next()
            .map(Some)
            .context("load-event requires an event key"),
        Some(other) => anyhow::bail!("Unknown command: {}", other),
    }
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pitscout_sync=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
