//! Caller-driven durability for the journal table.
//!
//! A snapshot is the full set of rows encoded as MessagePack. Writes go to a
//! temp sibling file, are fsynced, then renamed into place, so a crash mid-
//! write leaves the previous snapshot intact.

use crate::core::{JournalError, JournalRecord, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalSnapshot {
    pub version: u32,
    pub records: Vec<JournalRecord>,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created_at: DateTime<Utc>,
    pub record_count: usize,
}

impl JournalSnapshot {
    pub fn new(records: Vec<JournalRecord>) -> Self {
        let record_count = records.len();
        Self {
            version: SNAPSHOT_VERSION,
            records,
            metadata: SnapshotMetadata {
                created_at: Utc::now(),
                record_count,
            },
        }
    }
}

pub struct SnapshotManager {
    snapshot_path: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    pub fn save(&self, snapshot: &JournalSnapshot) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                JournalError::Persistence(format!("Failed to create snapshot directory: {}", e))
            })?;
        }
        let temp_path = self.snapshot_path.with_extension("tmp");
        let temp_file = File::create(&temp_path)
            .map_err(|e| JournalError::Persistence(format!("Failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(temp_file);
        let serialized = rmp_serde::to_vec(snapshot).map_err(|e| {
            JournalError::Persistence(format!("Failed to serialize snapshot: {}", e))
        })?;
        writer
            .write_all(&serialized)
            .map_err(|e| JournalError::Persistence(format!("Failed to write snapshot: {}", e)))?;
        writer
            .flush()
            .map_err(|e| JournalError::Persistence(format!("Failed to flush snapshot: {}", e)))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| JournalError::Persistence(format!("Failed to sync snapshot: {}", e)))?;
        fs::rename(&temp_path, &self.snapshot_path).map_err(|e| {
            warn!("snapshot rename failed, previous snapshot kept: {}", e);
            JournalError::Persistence(format!("Failed to rename snapshot: {}", e))
        })?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<JournalSnapshot>> {
        if !self.snapshot_path.exists() {
            return Ok(None);
        }
        let mut file = File::open(&self.snapshot_path)
            .map_err(|e| JournalError::Persistence(format!("Failed to open snapshot: {}", e)))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| JournalError::Persistence(format!("Failed to read snapshot: {}", e)))?;
        let snapshot: JournalSnapshot = rmp_serde::from_slice(&data).map_err(|e| {
            JournalError::Persistence(format!("Failed to deserialize snapshot: {}", e))
        })?;
        Ok(Some(snapshot))
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path.exists()
    }

    pub fn delete(&self) -> Result<()> {
        if self.snapshot_path.exists() {
            fs::remove_file(&self.snapshot_path).map_err(|e| {
                JournalError::Persistence(format!("Failed to delete snapshot: {}", e))
            })?;
        }
        Ok(())
    }
}
