//! Single-slot index snapshot.
//!
//! One serialized snapshot of the index structure lives under a fixed slot;
//! each save overwrites the previous one. A JSON manifest sits next to the
//! bincode blob for human inspection.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorIndexError};
use crate::store::codec;

/// Fixed slot key recorded in the manifest.
pub const SNAPSHOT_KEY: &str = "main-index";

/// An opaque serialized snapshot of the index structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub blob: Vec<u8>,
    pub timestamp_ms: u64,
    pub entry_count: u64,
}

/// Manages the single snapshot slot on disk.
pub struct SnapshotManager {
    dir: PathBuf,
}

impl SnapshotManager {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join("snapshot.bin")
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join("manifest.json")
    }

    /// Save a snapshot, overwriting the slot. The blob write is atomic:
    /// temp file, then rename.
    pub fn save(&self, snapshot: &IndexSnapshot) -> Result<()> {
        let data = codec::to_bincode(snapshot)?;

        let temp_path = self.snapshot_path().with_extension("tmp");
        if let Err(e) = fs::write(&temp_path, &data) {
            let _ = fs::remove_file(&temp_path);
            return Err(VectorIndexError::IoError(e));
        }
        fs::rename(&temp_path, self.snapshot_path())?;

        let manifest = serde_json::json!({
            "key": SNAPSHOT_KEY,
            "timestamp_ms": snapshot.timestamp_ms,
            "entry_count": snapshot.entry_count,
            "blob_bytes": snapshot.blob.len(),
        });
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| VectorIndexError::SerializationError(e.to_string()))?;
        fs::write(self.manifest_path(), &manifest_bytes)?;

        Ok(())
    }

    /// Load the snapshot from the slot, or None if the slot is empty.
    /// An undecodable snapshot is a `SerializationError` for the caller to
    /// absorb.
    pub fn load(&self) -> Result<Option<IndexSnapshot>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        let snapshot: IndexSnapshot = codec::from_bincode(&data)?;
        Ok(Some(snapshot))
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }

    /// Remove the snapshot slot and its manifest.
    pub fn clear(&self) -> Result<()> {
        for path in [self.snapshot_path(), self.manifest_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
