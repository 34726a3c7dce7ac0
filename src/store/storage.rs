// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Slot storage backends.
//!
//! A slot holds one serialized value and is always replaced whole. Backends
//! must guarantee that a reader sees either the old or the new value, never a
//! partial write.

use dashmap::DashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Addressable slots of the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    TeamProfiles,
    MatchRecords,
    PendingSync,
    DeviceId,
    CurrentEvent,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::TeamProfiles,
        Slot::MatchRecords,
        Slot::PendingSync,
        Slot::DeviceId,
        Slot::CurrentEvent,
    ];

    /// Storage key for this slot.
    pub fn key(self) -> &'static str {
        match self {
            Slot::TeamProfiles => "team_profiles",
            Slot::MatchRecords => "match_records",
            Slot::PendingSync => "pending_sync",
            Slot::DeviceId => "device_id",
            Slot::CurrentEvent => "current_event",
        }
    }
}

/// Storage errors. These never leave the store: reads degrade to defaults
/// and writes are logged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Raw key-value persistence for store slots.
pub trait SlotStorage: Send + Sync {
    /// Read a slot. `Ok(None)` if it was never written.
    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError>;

    /// Replace a slot. Durable before returning.
    fn write(&self, slot: Slot, value: &str) -> Result<(), StoreError>;

    /// Remove a slot. Removing a missing slot is not an error.
    fn remove(&self, slot: Slot) -> Result<(), StoreError>;
}

/// One JSON file per slot inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the data directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::debug!(path = %dir.display(), "Opened local store directory");
        Ok(Self { dir })
    }

    fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{}.json", slot.key()))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        // Write a sibling then rename over the slot file, so readers never
        // observe a half-written value.
        let path = self.slot_path(slot);
        let tmp_path = self.dir.join(format!("{}.json.tmp", slot.key()));

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slots, for tests and throwaway stations.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: DashMap<Slot, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(&slot).map(|v| v.value().clone()))
    }

    fn write(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        self.slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        self.slots.remove(&slot);
        Ok(())
    }
}
