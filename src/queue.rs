//! Pending-mutation queue
//!
//! Every local mutation produces a queue item destined for the remote
//! endpoint. The queue holds at most one item per document id: a newer
//! mutation for the same id overwrites the pending one (last-write-wins).
//! Draining is FIFO by timestamp, with ascending id as the deterministic
//! tie-break.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::entry::Metadata;

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Kind of mutation awaiting reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Add,
    Update,
    Delete,
}

/// Content carried by a queued mutation. Opaque to the queue and the
/// transport; the remote side interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MutationPayload {
    /// Full document content for add/update mutations.
    Document { vector: Vec<f32>, metadata: Metadata },
    /// Deletes carry no content.
    Empty,
}

/// One not-yet-reconciled local mutation, keyed by document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub kind: MutationKind,
    pub document_id: String,
    pub payload: MutationPayload,
    pub timestamp_ms: u64,
}

/// In-memory view of the pending queue.
#[derive(Debug, Default)]
pub struct SyncQueue {
    items: HashMap<String, QueueItem>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Replace the queue contents, e.g. when restoring from the durable
    /// store at startup.
    pub fn load(&mut self, items: Vec<QueueItem>) {
        self.items = items
            .into_iter()
            .map(|item| (item.document_id.clone(), item))
            .collect();
    }

    /// Insert a mutation, overwriting any pending item for the same id.
    pub fn upsert(&mut self, item: QueueItem) {
        self.items.insert(item.document_id.clone(), item);
    }

    /// Remove the pending item for a document, if any.
    pub fn remove(&mut self, document_id: &str) -> Option<QueueItem> {
        self.items.remove(document_id)
    }

    pub fn get(&self, document_id: &str) -> Option<&QueueItem> {
        self.items.get(document_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pending items in drain order: ascending timestamp, then ascending id.
    pub fn drain_order(&self) -> Vec<QueueItem> {
        let mut items: Vec<QueueItem> = self.items.values().cloned().collect();
        items.sort_by(|a, b| {
            a.timestamp_ms
                .cmp(&b.timestamp_ms)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: MutationKind, id: &str, timestamp_ms: u64) -> QueueItem {
        QueueItem {
            kind,
            document_id: id.to_string(),
            payload: MutationPayload::Empty,
            timestamp_ms,
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut queue = SyncQueue::new();
        queue.upsert(item(MutationKind::Add, "a", 1));
        queue.upsert(item(MutationKind::Delete, "a", 2));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get("a").unwrap().kind, MutationKind::Delete);
    }

    #[test]
    fn test_drain_order_fifo_by_timestamp() {
        let mut queue = SyncQueue::new();
        queue.upsert(item(MutationKind::Add, "late", 30));
        queue.upsert(item(MutationKind::Add, "early", 10));
        queue.upsert(item(MutationKind::Add, "middle", 20));

        let ids: Vec<String> = queue
            .drain_order()
            .into_iter()
            .map(|i| i.document_id)
            .collect();
        assert_eq!(ids, vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_drain_order_ties_break_by_id() {
        let mut queue = SyncQueue::new();
        queue.upsert(item(MutationKind::Add, "b", 5));
        queue.upsert(item(MutationKind::Add, "a", 5));
        queue.upsert(item(MutationKind::Add, "c", 5));

        let ids: Vec<String> = queue
            .drain_order()
            .into_iter()
            .map(|i| i.document_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove() {
        let mut queue = SyncQueue::new();
        queue.upsert(item(MutationKind::Add, "a", 1));
        assert!(queue.remove("a").is_some());
        assert!(queue.remove("a").is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_kind_wire_names() {
        let serialized = serde_json::to_string(&MutationKind::Delete).unwrap();
        assert_eq!(serialized, "\"delete\"");
    }

    #[test]
    fn test_item_bincode_roundtrip() {
        let original = QueueItem {
            kind: MutationKind::Add,
            document_id: "a".to_string(),
            payload: MutationPayload::Document {
                vector: vec![0.6, 0.8],
                metadata: Metadata::new(),
            },
            timestamp_ms: 99,
        };
        let bytes = bincode::serialize(&original).unwrap();
        let decoded: QueueItem = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, original);
    }
}
