//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::math::MathBackend;

/// Configuration for a `ClientVectorIndex`.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Vector dimension every stored and queried vector must have.
    pub dimension: usize,
    /// Math backend to load at initialization.
    pub backend: MathBackend,
    /// Durable-storage directory. `None` runs the index in memory only.
    pub data_dir: Option<PathBuf>,
    /// Remote reconciliation settings. `None` disables syncing.
    pub sync: Option<SyncConfig>,
}

impl IndexConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            backend: MathBackend::default(),
            data_dir: None,
            sync: None,
        }
    }

    pub fn with_backend(mut self, backend: MathBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = Some(sync);
        self
    }
}

/// Remote reconciliation settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Endpoint receiving one POST per queued mutation.
    pub endpoint: String,
    /// Upper bound for a single reconciliation attempt.
    pub request_timeout: Duration,
}

impl SyncConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::new(384);
        assert_eq!(config.dimension, 384);
        assert_eq!(config.backend, MathBackend::Accelerated);
        assert!(config.data_dir.is_none());
        assert!(config.sync.is_none());
    }

    #[test]
    fn test_builder() {
        let config = IndexConfig::new(8)
            .with_backend(MathBackend::Reference)
            .with_data_dir("/tmp/pv")
            .with_sync(SyncConfig::new("http://localhost:3000/vectors/sync"));

        assert_eq!(config.backend, MathBackend::Reference);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/pv")));
        assert_eq!(
            config.sync.unwrap().request_timeout,
            Duration::from_secs(10)
        );
    }
}
