//! Durable storage: document mirror, snapshot slot, and sync queue.
//!
//! Three logical stores live under one data directory:
//! - `documents.log`: append-only mirror of the stored entries
//! - `sync-queue.log`: append-only record of pending mutations
//! - `snapshot.bin` / `manifest.json`: the single-slot index snapshot
//!
//! Every write is a framed, fsynced append (or an atomic rename for the
//! snapshot), so a commit is either fully on disk or discarded at replay.
//! Opening the store is best-effort from the engine's point of view: when it
//! fails, the index keeps running without durability.

pub mod codec;
pub mod log;
pub mod snapshot;

pub use log::MutationLog;
pub use snapshot::{IndexSnapshot, SnapshotManager, SNAPSHOT_KEY};

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entry::VectorEntry;
use crate::error::{Result, VectorIndexError};
use crate::queue::QueueItem;

/// A record in the document mirror log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentLogEntry {
    Put { entry: VectorEntry },
    Delete { id: String },
}

/// A record in the sync-queue log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueueLogEntry {
    Upsert(QueueItem),
    Remove { document_id: String },
}

/// Scoped durable storage for one index instance.
pub struct PersistentStore {
    dir: PathBuf,
    documents: MutationLog<DocumentLogEntry>,
    queue: MutationLog<QueueLogEntry>,
    snapshots: SnapshotManager,
}

impl PersistentStore {
    /// Open (or create) the store under the given directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            VectorIndexError::StorageError(format!("cannot open {}: {}", dir.display(), e))
        })?;

        Ok(Self {
            documents: MutationLog::open(dir.join("documents.log"))?,
            queue: MutationLog::open(dir.join("sync-queue.log"))?,
            snapshots: SnapshotManager::new(&dir)?,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fold the document log into the current set of entries, sorted by id.
    pub fn load_documents(&self) -> Result<Vec<VectorEntry>> {
        let mut table: BTreeMap<String, VectorEntry> = BTreeMap::new();
        for record in self.documents.replay()? {
            match record {
                DocumentLogEntry::Put { entry } => {
                    table.insert(entry.id.clone(), entry);
                }
                DocumentLogEntry::Delete { id } => {
                    table.remove(&id);
                }
            }
        }
        Ok(table.into_values().collect())
    }

    /// Write-through for a stored entry.
    pub fn put_document(&mut self, entry: &VectorEntry) -> Result<()> {
        self.documents.append(&DocumentLogEntry::Put {
            entry: entry.clone(),
        })
    }

    /// Write-through for a removal.
    pub fn delete_document(&mut self, id: &str) -> Result<()> {
        self.documents.append(&DocumentLogEntry::Delete {
            id: id.to_string(),
        })
    }

    /// Fold the queue log into the pending items, in drain order
    /// (ascending timestamp, then ascending id). Replay order makes the
    /// last write for each document id win.
    pub fn load_queue(&self) -> Result<Vec<QueueItem>> {
        let mut pending: HashMap<String, QueueItem> = HashMap::new();
        for record in self.queue.replay()? {
            match record {
                QueueLogEntry::Upsert(item) => {
                    pending.insert(item.document_id.clone(), item);
                }
                QueueLogEntry::Remove { document_id } => {
                    pending.remove(&document_id);
                }
            }
        }

        let mut items: Vec<QueueItem> = pending.into_values().collect();
        items.sort_by(|a, b| {
            a.timestamp_ms
                .cmp(&b.timestamp_ms)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        Ok(items)
    }

    /// Record a pending mutation (overwrites any earlier one for the id at
    /// replay time).
    pub fn enqueue(&mut self, item: &QueueItem) -> Result<()> {
        self.queue.append(&QueueLogEntry::Upsert(item.clone()))
    }

    /// Drop the pending mutation for a document after it was reconciled.
    pub fn dequeue(&mut self, document_id: &str) -> Result<()> {
        self.queue.append(&QueueLogEntry::Remove {
            document_id: document_id.to_string(),
        })
    }

    pub fn load_snapshot(&self) -> Result<Option<IndexSnapshot>> {
        self.snapshots.load()
    }

    pub fn save_snapshot(&self, snapshot: &IndexSnapshot) -> Result<()> {
        self.snapshots.save(snapshot)
    }

    /// Rewrite both logs from live state, dropping superseded records.
    pub fn compact(&mut self, entries: &[VectorEntry], queue: &[QueueItem]) -> Result<()> {
        let documents: Vec<DocumentLogEntry> = entries
            .iter()
            .cloned()
            .map(|entry| DocumentLogEntry::Put { entry })
            .collect();
        self.documents.rewrite(&documents)?;

        let items: Vec<QueueLogEntry> = queue
            .iter()
            .cloned()
            .map(QueueLogEntry::Upsert)
            .collect();
        self.queue.rewrite(&items)?;

        Ok(())
    }

    /// Drop all stored entries and the snapshot slot. Pending queue items
    /// are left in place.
    pub fn clear_documents(&mut self) -> Result<()> {
        self.documents.rewrite(&[])?;
        self.snapshots.clear()
    }
}
