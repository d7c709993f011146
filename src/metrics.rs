use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default)]
pub struct RelayMetrics {
    pub publish_total: AtomicU64,
    pub publish_sent: AtomicU64,
    pub publish_compensated: AtomicU64,
    pub consume_total: AtomicU64,
    pub delivered: AtomicU64,
    pub skipped_foreign: AtomicU64,
    pub skipped_absent: AtomicU64,
    pub handler_errors: AtomicU64,
    pub cleanup_failures: AtomicU64,
}

#[derive(Serialize, Default, Clone)]
pub struct MetricsSnapshot {
    pub publish_total: u64,
    pub publish_sent: u64,
    pub publish_compensated: u64,
    pub consume_total: u64,
    pub delivered: u64,
    pub skipped_foreign: u64,
    pub skipped_absent: u64,
    pub handler_errors: u64,
    pub cleanup_failures: u64,
}

impl RelayMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            publish_total: self.publish_total.load(Ordering::Relaxed),
            publish_sent: self.publish_sent.load(Ordering::Relaxed),
            publish_compensated: self.publish_compensated.load(Ordering::Relaxed),
            consume_total: self.consume_total.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            skipped_foreign: self.skipped_foreign.load(Ordering::Relaxed),
            skipped_absent: self.skipped_absent.load(Ordering::Relaxed),
            handler_errors: self.handler_errors.load(Ordering::Relaxed),
            cleanup_failures: self.cleanup_failures.load(Ordering::Relaxed),
        }
    }
}
