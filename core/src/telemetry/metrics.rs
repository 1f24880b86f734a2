use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters shared by both sweeps.
pub struct IngestMetrics {
    inner: Mutex<MetricsSnapshot>,
}

/// Point-in-time copy of the ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub sweeps_completed: usize,
    pub listing_failures: usize,
    pub records_loaded: usize,
    pub keys_skipped: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_sweep(&self, records: usize, skipped: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.sweeps_completed += 1;
            metrics.records_loaded += records;
            metrics.keys_skipped += skipped;
        }
    }

    pub fn record_listing_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.listing_failures += 1;
        }
    }

    pub fn record_notification(&self, delivered: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            if delivered {
                metrics.notifications_sent += 1;
            } else {
                metrics.notifications_failed += 1;
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_sweeps() {
        let metrics = IngestMetrics::new();
        metrics.record_sweep(3, 1);
        metrics.record_sweep(2, 0);
        metrics.record_listing_failure();
        metrics.record_notification(true);
        metrics.record_notification(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sweeps_completed, 2);
        assert_eq!(snapshot.records_loaded, 5);
        assert_eq!(snapshot.keys_skipped, 1);
        assert_eq!(snapshot.listing_failures, 1);
        assert_eq!(snapshot.notifications_sent, 1);
        assert_eq!(snapshot.notifications_failed, 1);
    }
}
