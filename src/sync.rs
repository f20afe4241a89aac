//! Remote reconciliation transport.
//!
//! The engine pushes one queued mutation per request; any success status
//! confirms the item may be dequeued, any failure (including transport
//! errors) leaves it queued for the next pass.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::error::{Result, VectorIndexError};
use crate::queue::QueueItem;

/// Aggregate outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
}

/// Delivery seam between the queue and the remote endpoint.
///
/// `is_online` carries the host's connectivity signal; when it reports
/// offline the engine skips the pass entirely instead of burning a timeout
/// per item.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    fn is_online(&self) -> bool {
        true
    }

    /// Deliver one queued mutation. `Ok` confirms the item may be dequeued.
    async fn reconcile(&self, item: &QueueItem) -> Result<()>;
}

/// HTTP transport: one POST per queued item, JSON body, bounded by the
/// configured per-attempt timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    online: AtomicBool,
}

impl HttpTransport {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| VectorIndexError::TransportError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            online: AtomicBool::new(true),
        })
    }

    /// Feed the host's connectivity signal into the transport.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    async fn reconcile(&self, item: &QueueItem) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(item)
            .send()
            .await
            .map_err(|e| VectorIndexError::TransportError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VectorIndexError::TransportError(format!(
                "server returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
