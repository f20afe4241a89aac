//! # pocketvec
//!
//! An offline-first embedded vector index. Stores embedding vectors and
//! metadata locally, answers nearest-neighbor queries with an exact linear
//! cosine scan, survives restarts through a durable store, and reconciles
//! locally-made changes with a remote endpoint once connectivity is
//! available.
//!
//! This library provides:
//! - A `ClientVectorIndex` engine with an explicit lifecycle
//! - Interchangeable accelerated (ndarray) and reference math backends
//! - A crash-tolerant durable store with a single-slot snapshot
//! - A pending-mutation queue drained against a remote endpoint
//!
//! ## Example
//!
//! ```no_run
//! use pocketvec::{ClientVectorIndex, IndexConfig, Metadata};
//!
//! # async fn demo() -> pocketvec::Result<()> {
//! let mut index = ClientVectorIndex::new(IndexConfig::new(4).with_data_dir("./data"));
//! index.initialize().await?;
//!
//! index
//!     .add_document("a", vec![1.0, 0.0, 0.0, 0.0], Metadata::new())
//!     .await?;
//!
//! let hits = index.search(&[1.0, 0.0, 0.0, 0.0], 1, 0.0).await?;
//! assert_eq!(hits[0].id, "a");
//!
//! index.persist().await?;
//! let report = index.sync_with_server().await?;
//! println!("synced {} mutations", report.synced);
//! index.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod math;
pub mod metrics;
pub mod queue;
pub mod store;
pub mod sync;

pub use config::{IndexConfig, SyncConfig};
pub use entry::{Metadata, MetadataValue, SearchResult, VectorEntry};
pub use error::{Result, VectorIndexError};
pub use index::{ClientVectorIndex, IndexStats};
pub use math::{MathBackend, VectorMath};
pub use queue::{MutationKind, MutationPayload, QueueItem};
pub use sync::{HttpTransport, SyncReport, SyncTransport};
