//! Operation metrics: query latency, mutation and sync throughput.

use std::time::Duration;

/// Collects runtime metrics for one index instance.
#[derive(Debug)]
pub struct MetricsCollector {
    query_latencies_us: Vec<f64>,
    total_searches: u64,
    total_inserts: u64,
    total_removes: u64,
    total_synced: u64,
    total_sync_failures: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            query_latencies_us: Vec::new(),
            total_searches: 0,
            total_inserts: 0,
            total_removes: 0,
            total_synced: 0,
            total_sync_failures: 0,
        }
    }

    /// Record a search with its duration.
    pub fn record_search(&mut self, duration: Duration) {
        self.total_searches += 1;
        self.query_latencies_us.push(duration.as_micros() as f64);
    }

    pub fn record_insert(&mut self) {
        self.total_inserts += 1;
    }

    pub fn record_remove(&mut self) {
        self.total_removes += 1;
    }

    /// Record the outcome of one reconciliation pass.
    pub fn record_sync(&mut self, synced: u64, failed: u64) {
        self.total_synced += synced;
        self.total_sync_failures += failed;
    }

    pub fn total_searches(&self) -> u64 {
        self.total_searches
    }

    pub fn total_inserts(&self) -> u64 {
        self.total_inserts
    }

    pub fn total_removes(&self) -> u64 {
        self.total_removes
    }

    pub fn total_synced(&self) -> u64 {
        self.total_synced
    }

    pub fn total_sync_failures(&self) -> u64 {
        self.total_sync_failures
    }

    /// Average query latency in microseconds.
    pub fn avg_query_latency_us(&self) -> f64 {
        if self.query_latencies_us.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.query_latencies_us.iter().sum();
        sum / self.query_latencies_us.len() as f64
    }

    /// Get a percentile of query latency (e.g., 50.0, 95.0, 99.0).
    pub fn percentile_query_latency_us(&self, percentile: f64) -> f64 {
        if self.query_latencies_us.is_empty() {
            return 0.0;
        }

        let mut sorted = self.query_latencies_us.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
