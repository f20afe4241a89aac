//! Client-resident vector index.
//!
//! `ClientVectorIndex` owns the in-memory table of normalized vectors,
//! answers nearest-neighbor queries with an exact linear cosine scan, mirrors
//! every mutation into the durable store (best-effort), and queues mutations
//! for eventual reconciliation with a remote endpoint. Local operations keep
//! working when durability and connectivity are both unavailable.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::entry::{Metadata, SearchResult, VectorEntry};
use crate::error::{Result, VectorIndexError};
use crate::math::{self, VectorMath};
use crate::metrics::MetricsCollector;
use crate::queue::{unix_millis, MutationKind, MutationPayload, QueueItem, SyncQueue};
use crate::store::{IndexSnapshot, PersistentStore};
use crate::store::codec;
use crate::sync::{HttpTransport, SyncReport, SyncTransport};

/// Yield to the executor after this many scanned entries so a large scan
/// cannot starve other tasks on the same runtime.
const SCAN_YIELD_INTERVAL: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

/// Snapshot of the index's externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub count: usize,
    pub initialized: bool,
}

/// Offline-first similarity index over a fixed-dimension vector space.
///
/// Lifecycle: construct with [`ClientVectorIndex::new`], call `initialize`
/// once, use the mutation and query operations, and `dispose` when done.
/// Mutating operations take `&mut self`; exclusive access is what makes a
/// `search` issued after `add_document` observe the new entry. Hosts that
/// share one index across tasks wrap it in their own lock.
pub struct ClientVectorIndex {
    config: IndexConfig,
    math_override: Option<Arc<dyn VectorMath>>,
    math: Option<Arc<dyn VectorMath>>,
    transport: Option<Arc<dyn SyncTransport>>,
    store: Option<PersistentStore>,
    table: HashMap<String, VectorEntry>,
    queue: SyncQueue,
    metrics: MetricsCollector,
    state: LifecycleState,
}

impl ClientVectorIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            math_override: None,
            math: None,
            transport: None,
            store: None,
            table: HashMap::new(),
            queue: SyncQueue::new(),
            metrics: MetricsCollector::new(),
            state: LifecycleState::Uninitialized,
        }
    }

    /// Inject a math backend instead of resolving one from the config.
    pub fn with_math_backend(mut self, backend: Arc<dyn VectorMath>) -> Self {
        self.math_override = Some(backend);
        self
    }

    /// Inject a sync transport instead of building one from the config.
    pub fn with_transport(mut self, transport: Arc<dyn SyncTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Bring the index to the `Ready` state.
    ///
    /// Idempotent while ready. A math backend that fails to load is fatal;
    /// a durable store that fails to open only degrades the index to
    /// in-memory operation.
    pub async fn initialize(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Ready => return Ok(()),
            LifecycleState::Disposed => return Err(VectorIndexError::Disposed),
            _ => {}
        }
        self.state = LifecycleState::Initializing;

        let loaded = match &self.math_override {
            Some(backend) => math::self_check(backend.as_ref()).map(|_| backend.clone()),
            None => math::load_backend(self.config.backend),
        };
        let math = match loaded {
            Ok(backend) => backend,
            Err(e) => {
                self.state = LifecycleState::Uninitialized;
                return Err(e);
            }
        };
        debug!(backend = math.name(), "math backend loaded");

        let store = match &self.config.data_dir {
            Some(dir) => match PersistentStore::open(dir) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(error = %e, "durable store unavailable, continuing in memory only");
                    None
                }
            },
            None => None,
        };

        self.table.clear();
        self.queue = SyncQueue::new();

        if let Some(store) = &store {
            self.restore(store);
            match store.load_queue() {
                Ok(items) => self.queue.load(items),
                Err(e) => warn!(error = %e, "pending queue unreadable, starting with empty queue"),
            }
        }

        if self.transport.is_none() {
            if let Some(sync) = &self.config.sync {
                match HttpTransport::new(sync) {
                    Ok(transport) => self.transport = Some(Arc::new(transport)),
                    Err(e) => warn!(error = %e, "sync transport unavailable, sync disabled"),
                }
            }
        }

        self.math = Some(math);
        self.store = store;
        self.state = LifecycleState::Ready;
        info!(
            count = self.table.len(),
            queued = self.queue.len(),
            "vector index ready"
        );
        Ok(())
    }

    /// Restore the table from the snapshot slot, falling back to the
    /// document mirror when the slot is empty or unreadable.
    fn restore(&mut self, store: &PersistentStore) {
        match store.load_snapshot() {
            Ok(Some(snapshot)) => match codec::from_bincode::<Vec<VectorEntry>>(&snapshot.blob) {
                Ok(entries) => {
                    for entry in entries {
                        self.table.insert(entry.id.clone(), entry);
                    }
                    debug!(count = self.table.len(), "restored index from snapshot");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "snapshot blob undecodable, rebuilding from document mirror");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "snapshot unreadable, rebuilding from document mirror");
            }
        }

        match store.load_documents() {
            Ok(entries) => {
                for entry in entries {
                    self.table.insert(entry.id.clone(), entry);
                }
                debug!(count = self.table.len(), "restored index from document mirror");
            }
            Err(e) => {
                warn!(error = %e, "document mirror unreadable, starting empty");
            }
        }
    }

    /// Insert or replace a document vector.
    ///
    /// The vector is normalized before storage; the durable write-through is
    /// best-effort. Any pending queue item for the id is overwritten with a
    /// fresh `add` mutation.
    pub async fn add_document(
        &mut self,
        id: impl Into<String>,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> Result<()> {
        self.ensure_ready()?;
        let id = id.into();

        if vector.len() != self.config.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }

        let math = self.math()?.clone();
        let entry = VectorEntry {
            id: id.clone(),
            vector: math.normalize(&vector),
            metadata,
        };

        let payload = MutationPayload::Document {
            vector: entry.vector.clone(),
            metadata: entry.metadata.clone(),
        };

        if let Some(store) = &mut self.store {
            if let Err(e) = store.put_document(&entry) {
                warn!(id = %id, error = %e, "durable write-through failed");
            }
        }
        self.table.insert(id.clone(), entry);

        self.push_queue_item(QueueItem {
            kind: MutationKind::Add,
            document_id: id,
            payload,
            timestamp_ms: unix_millis(),
        });
        self.metrics.record_insert();
        Ok(())
    }

    /// Remove a document by id and queue a delete for the remote side.
    ///
    /// Removing an id the index never saw still queues the delete; the
    /// server may hold state for it, and the remote operation is idempotent.
    pub async fn remove_vector(&mut self, id: &str) -> Result<()> {
        self.ensure_ready()?;

        self.table.remove(id);
        if let Some(store) = &mut self.store {
            if let Err(e) = store.delete_document(id) {
                warn!(id = %id, error = %e, "durable delete failed");
            }
        }

        self.push_queue_item(QueueItem {
            kind: MutationKind::Delete,
            document_id: id.to_string(),
            payload: MutationPayload::Empty,
            timestamp_ms: unix_millis(),
        });
        self.metrics.record_remove();
        Ok(())
    }

    /// Exact linear scan: normalize the query, score every entry, filter by
    /// `threshold`, and return the top `k` by descending score. Equal scores
    /// order by ascending id so results are reproducible.
    pub async fn search(
        &mut self,
        query: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        self.ensure_ready()?;

        if query.len() != self.config.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.config.dimension,
                actual: query.len(),
            });
        }

        let started = Instant::now();
        let math = self.math()?.clone();
        let normalized = math.normalize(query);

        let mut hits = Vec::new();
        for (scanned, entry) in self.table.values().enumerate() {
            if scanned > 0 && scanned % SCAN_YIELD_INTERVAL == 0 {
                tokio::task::yield_now().await;
            }
            let score = math.cosine_similarity(&normalized, &entry.vector)?;
            if score >= threshold {
                hits.push(SearchResult {
                    id: entry.id.clone(),
                    score,
                    metadata: entry.metadata.clone(),
                });
            }
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);

        self.metrics.record_search(started.elapsed());
        Ok(hits)
    }

    /// Serialize the current table into the single snapshot slot and compact
    /// the mutation logs. Write failures are logged and absorbed.
    pub async fn persist(&mut self) -> Result<()> {
        self.ensure_ready()?;

        let store = match self.store.as_mut() {
            Some(store) => store,
            None => {
                debug!("no durable store, persist skipped");
                return Ok(());
            }
        };

        let mut entries: Vec<VectorEntry> = self.table.values().cloned().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));

        let blob = match codec::to_bincode(&entries) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "snapshot serialization failed");
                return Ok(());
            }
        };

        let snapshot = IndexSnapshot {
            blob,
            timestamp_ms: unix_millis(),
            entry_count: entries.len() as u64,
        };
        if let Err(e) = store.save_snapshot(&snapshot) {
            warn!(error = %e, "snapshot write failed");
            return Ok(());
        }

        let queued = self.queue.drain_order();
        if let Err(e) = store.compact(&entries, &queued) {
            warn!(error = %e, "log compaction failed");
        }

        debug!(count = entries.len(), "index persisted");
        Ok(())
    }

    /// Drain the pending queue against the remote endpoint.
    ///
    /// A no-op when no transport is configured or the host reports offline.
    /// Items are pushed in FIFO order; a failed item stays queued for the
    /// next pass and never aborts the rest of the drain.
    pub async fn sync_with_server(&mut self) -> Result<SyncReport> {
        self.ensure_ready()?;

        let transport = match &self.transport {
            Some(transport) => transport.clone(),
            None => {
                debug!("no sync transport configured");
                return Ok(SyncReport::default());
            }
        };
        if !transport.is_online() {
            debug!("offline, sync deferred");
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        for item in self.queue.drain_order() {
            match transport.reconcile(&item).await {
                Ok(()) => {
                    self.queue.remove(&item.document_id);
                    if let Some(store) = &mut self.store {
                        if let Err(e) = store.dequeue(&item.document_id) {
                            warn!(id = %item.document_id, error = %e, "durable dequeue failed");
                        }
                    }
                    report.synced += 1;
                }
                Err(e) => {
                    warn!(id = %item.document_id, error = %e, "mutation failed to sync, kept for retry");
                    report.failed += 1;
                }
            }
        }

        self.metrics.record_sync(report.synced as u64, report.failed as u64);
        info!(synced = report.synced, failed = report.failed, "sync pass finished");
        Ok(report)
    }

    /// Drop every local entry, the durable mirror, and the snapshot slot.
    /// Pending queue items are kept: clearing is a local cache reset, not a
    /// remote mutation.
    pub async fn clear(&mut self) -> Result<()> {
        self.ensure_ready()?;

        self.table.clear();
        if let Some(store) = &mut self.store {
            if let Err(e) = store.clear_documents() {
                warn!(error = %e, "durable clear failed");
            }
        }
        Ok(())
    }

    /// Bulk-apply server-provided entries locally without queueing, so
    /// server data never echoes back to the server. Entries with the wrong
    /// dimension are skipped and counted out.
    pub async fn hydrate(
        &mut self,
        entries: Vec<(String, Vec<f32>, Metadata)>,
    ) -> Result<usize> {
        self.ensure_ready()?;
        let math = self.math()?.clone();

        let mut applied = 0;
        for (id, vector, metadata) in entries {
            if vector.len() != self.config.dimension {
                warn!(id = %id, len = vector.len(), "skipping server entry with wrong dimension");
                continue;
            }
            let entry = VectorEntry {
                id: id.clone(),
                vector: math.normalize(&vector),
                metadata,
            };
            if let Some(store) = &mut self.store {
                if let Err(e) = store.put_document(&entry) {
                    warn!(id = %id, error = %e, "durable write-through failed");
                }
            }
            self.table.insert(id, entry);
            applied += 1;
        }
        Ok(applied)
    }

    /// Persist current state (best-effort), release the backend and the
    /// store, and transition to the terminal `Disposed` state. Subsequent
    /// operations fail with `Disposed`.
    pub async fn dispose(&mut self) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        if self.state == LifecycleState::Ready {
            if let Err(e) = self.persist().await {
                warn!(error = %e, "persist on dispose failed");
            }
        }

        self.math = None;
        self.transport = None;
        self.store = None;
        self.table.clear();
        self.queue = SyncQueue::new();
        self.state = LifecycleState::Disposed;
        info!("vector index disposed");
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            count: self.table.len(),
            initialized: self.state == LifecycleState::Ready,
        }
    }

    /// Stored document ids, ascending.
    pub fn document_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.table.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of mutations awaiting reconciliation.
    pub fn queued_mutations(&self) -> usize {
        self.queue.len()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            LifecycleState::Ready => Ok(()),
            LifecycleState::Disposed => Err(VectorIndexError::Disposed),
            _ => Err(VectorIndexError::NotInitialized),
        }
    }

    fn math(&self) -> Result<&Arc<dyn VectorMath>> {
        self.math.as_ref().ok_or(VectorIndexError::NotInitialized)
    }

    fn push_queue_item(&mut self, item: QueueItem) {
        if let Some(store) = &mut self.store {
            if let Err(e) = store.enqueue(&item) {
                warn!(id = %item.document_id, error = %e, "failed to persist queued mutation");
            }
        }
        self.queue.upsert(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::MathBackend;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn ready_config(dimension: usize) -> IndexConfig {
        IndexConfig::new(dimension).with_backend(MathBackend::Reference)
    }

    async fn ready_index(dimension: usize) -> ClientVectorIndex {
        let mut index = ClientVectorIndex::new(ready_config(dimension));
        index.initialize().await.unwrap();
        index
    }

    #[tokio::test]
    async fn test_operations_require_initialize() {
        let mut index = ClientVectorIndex::new(ready_config(3));
        let result = index
            .add_document("a", vec![1.0, 0.0, 0.0], Metadata::new())
            .await;
        assert!(matches!(result, Err(VectorIndexError::NotInitialized)));

        let result = index.search(&[1.0, 0.0, 0.0], 1, 0.0).await;
        assert!(matches!(result, Err(VectorIndexError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let mut index = ready_index(3).await;
        index
            .add_document("a", vec![1.0, 0.0, 0.0], Metadata::new())
            .await
            .unwrap();

        index.initialize().await.unwrap();
        assert_eq!(index.stats().count, 1);
    }

    #[tokio::test]
    async fn test_read_your_writes() {
        let mut index = ready_index(3).await;
        index
            .add_document("a", vec![2.0, 0.0, 0.0], Metadata::new())
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], 1, 0.0).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
        assert_relative_eq!(hits[0].score, 1.0, epsilon = 1e-5);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_leaves_index_unchanged() {
        let mut index = ready_index(3).await;
        let result = index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await;
        assert!(matches!(
            result,
            Err(VectorIndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(index.stats().count, 0);
        assert_eq!(index.queued_mutations(), 0);
    }

    #[tokio::test]
    async fn test_remove_vector() {
        let mut index = ready_index(3).await;
        index
            .add_document("a", vec![1.0, 0.0, 0.0], Metadata::new())
            .await
            .unwrap();
        index.remove_vector("a").await.unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], 10, 0.0).await.unwrap();
        assert!(hits.iter().all(|h| h.id != "a"));
        assert_eq!(index.stats().count, 0);
    }

    #[tokio::test]
    async fn test_search_threshold_filters() {
        let mut index = ready_index(2).await;
        index
            .add_document("close", vec![1.0, 0.1], Metadata::new())
            .await
            .unwrap();
        index
            .add_document("far", vec![-1.0, 0.0], Metadata::new())
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 10, 0.5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "close");
    }

    #[tokio::test]
    async fn test_equal_scores_order_by_ascending_id() {
        let mut index = ready_index(4).await;
        index
            .add_document("b", vec![0.0, 1.0, 0.0, 0.0], Metadata::new())
            .await
            .unwrap();
        index
            .add_document("a", vec![1.0, 0.0, 0.0, 0.0], Metadata::new())
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0, 0.0], 1, 0.0).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
        assert_relative_eq!(hits[0].score, 1.0, epsilon = 1e-5);

        let hits = index
            .search(&[0.7, 0.7, 0.0, 0.0], 2, 0.0)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "b");
        assert_relative_eq!(hits[0].score, 0.70710677, epsilon = 1e-4);
        assert_relative_eq!(hits[1].score, 0.70710677, epsilon = 1e-4);
    }

    #[tokio::test]
    async fn test_repeated_add_queues_single_mutation() {
        let mut index = ready_index(2).await;
        index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();
        index
            .add_document("a", vec![0.0, 1.0], Metadata::new())
            .await
            .unwrap();

        assert_eq!(index.stats().count, 1);
        assert_eq!(index.queued_mutations(), 1);
    }

    #[tokio::test]
    async fn test_add_then_delete_queues_single_delete() {
        let mut index = ready_index(2).await;
        index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();
        index.remove_vector("a").await.unwrap();

        assert_eq!(index.queued_mutations(), 1);
    }

    #[tokio::test]
    async fn test_hydrate_does_not_queue() {
        let mut index = ready_index(2).await;
        let applied = index
            .hydrate(vec![
                ("a".to_string(), vec![1.0, 0.0], Metadata::new()),
                ("b".to_string(), vec![0.0, 1.0], Metadata::new()),
                ("bad".to_string(), vec![1.0], Metadata::new()),
            ])
            .await
            .unwrap();

        assert_eq!(applied, 2);
        assert_eq!(index.stats().count, 2);
        assert_eq!(index.queued_mutations(), 0);
    }

    #[tokio::test]
    async fn test_clear_keeps_queue() {
        let mut index = ready_index(2).await;
        index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();
        index.clear().await.unwrap();

        assert_eq!(index.stats().count, 0);
        assert_eq!(index.queued_mutations(), 1);
    }

    #[tokio::test]
    async fn test_disposed_rejects_operations() {
        let mut index = ready_index(2).await;
        index.dispose().await;

        assert!(!index.stats().initialized);
        assert!(matches!(
            index.add_document("a", vec![1.0, 0.0], Metadata::new()).await,
            Err(VectorIndexError::Disposed)
        ));
        assert!(matches!(
            index.initialize().await,
            Err(VectorIndexError::Disposed)
        ));

        // Repeated dispose is a no-op
        index.dispose().await;
    }

    #[tokio::test]
    async fn test_backend_failure_is_fatal() {
        struct NanMath;

        impl VectorMath for NanMath {
            fn name(&self) -> &'static str {
                "nan"
            }
            fn normalize(&self, v: &[f32]) -> Vec<f32> {
                vec![f32::NAN; v.len()]
            }
            fn dot_product(&self, _a: &[f32], _b: &[f32]) -> Result<f32> {
                Ok(f32::NAN)
            }
            fn cosine_similarity(&self, _a: &[f32], _b: &[f32]) -> Result<f32> {
                Ok(f32::NAN)
            }
            fn add_vectors(&self, a: &[f32], _b: &[f32]) -> Result<Vec<f32>> {
                Ok(a.to_vec())
            }
        }

        let mut index =
            ClientVectorIndex::new(ready_config(2)).with_math_backend(Arc::new(NanMath));
        let result = index.initialize().await;
        assert!(matches!(
            result,
            Err(VectorIndexError::BackendUnavailable(_))
        ));

        // State rolls back to uninitialized, not disposed
        assert!(!index.stats().initialized);
        assert!(matches!(
            index.search(&[1.0, 0.0], 1, 0.0).await,
            Err(VectorIndexError::NotInitialized)
        ));
    }

    struct FlakyTransport {
        fail_ids: Mutex<HashSet<String>>,
        delivered: Mutex<Vec<String>>,
        online: bool,
    }

    impl FlakyTransport {
        fn new(fail_ids: &[&str], online: bool) -> Self {
            Self {
                fail_ids: Mutex::new(fail_ids.iter().map(|s| s.to_string()).collect()),
                delivered: Mutex::new(Vec::new()),
                online,
            }
        }
    }

    #[async_trait]
    impl SyncTransport for FlakyTransport {
        fn is_online(&self) -> bool {
            self.online
        }

        async fn reconcile(&self, item: &QueueItem) -> Result<()> {
            if self.fail_ids.lock().unwrap().contains(&item.document_id) {
                return Err(VectorIndexError::TransportError("injected".to_string()));
            }
            self.delivered.lock().unwrap().push(item.document_id.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sync_partial_failure_keeps_failed_item() {
        let transport = Arc::new(FlakyTransport::new(&["b"], true));
        let mut index = ClientVectorIndex::new(ready_config(2))
            .with_transport(transport.clone());
        index.initialize().await.unwrap();

        index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();
        index
            .add_document("b", vec![0.0, 1.0], Metadata::new())
            .await
            .unwrap();
        index
            .add_document("c", vec![1.0, 1.0], Metadata::new())
            .await
            .unwrap();

        let report = index.sync_with_server().await.unwrap();
        assert_eq!(report, SyncReport { synced: 2, failed: 1 });
        assert_eq!(index.queued_mutations(), 1);
        assert_eq!(
            *transport.delivered.lock().unwrap(),
            vec!["a".to_string(), "c".to_string()]
        );

        // Next pass with the failure cleared drains the remaining item
        transport.fail_ids.lock().unwrap().clear();
        let report = index.sync_with_server().await.unwrap();
        assert_eq!(report, SyncReport { synced: 1, failed: 0 });
        assert_eq!(index.queued_mutations(), 0);
    }

    #[tokio::test]
    async fn test_sync_offline_is_noop() {
        let transport = Arc::new(FlakyTransport::new(&[], false));
        let mut index = ClientVectorIndex::new(ready_config(2))
            .with_transport(transport);
        index.initialize().await.unwrap();

        index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();

        let report = index.sync_with_server().await.unwrap();
        assert_eq!(report, SyncReport::default());
        assert_eq!(index.queued_mutations(), 1);
    }

    #[tokio::test]
    async fn test_sync_without_transport_is_noop() {
        let mut index = ready_index(2).await;
        index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();

        let report = index.sync_with_server().await.unwrap();
        assert_eq!(report, SyncReport::default());
    }

    #[tokio::test]
    async fn test_metrics_track_operations() {
        let mut index = ready_index(2).await;
        index
            .add_document("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();
        index.search(&[1.0, 0.0], 1, 0.0).await.unwrap();
        index.remove_vector("a").await.unwrap();

        assert_eq!(index.metrics().total_inserts(), 1);
        assert_eq!(index.metrics().total_searches(), 1);
        assert_eq!(index.metrics().total_removes(), 1);
    }
}
