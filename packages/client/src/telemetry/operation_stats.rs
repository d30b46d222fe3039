//! Operation statistics tracking with cache-padded atomic counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Thread-safe operation statistics.
///
/// Each counter is cache-padded so operations on different driver threads do
/// not contend on one cache line.
#[derive(Debug, Default)]
pub struct OperationStats {
    /// Operations bound to a transport via `setup`
    pub operations_started: CachePadded<AtomicUsize>,
    /// Operations that delivered a success result
    pub operations_succeeded: CachePadded<AtomicUsize>,
    /// Operations that delivered a failure result
    pub operations_failed: CachePadded<AtomicUsize>,
    /// Redirects followed
    pub redirects_followed: CachePadded<AtomicUsize>,
    /// Transfers aborted because no headers arrived in time
    pub header_timeouts: CachePadded<AtomicUsize>,
    /// Sockets obtained from a connection broker
    pub broker_handoffs: CachePadded<AtomicUsize>,
    /// Response body bytes accepted by operations
    pub body_bytes_received: CachePadded<AtomicU64>,
}

/// Immutable snapshot of operation statistics at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationStatsSnapshot {
    pub operations_started: usize,
    pub operations_succeeded: usize,
    pub operations_failed: usize,
    pub redirects_followed: usize,
    pub header_timeouts: usize,
    pub broker_handoffs: usize,
    pub body_bytes_received: u64,
}

impl OperationStats {
    #[inline]
    pub fn record_started(&self) {
        self.operations_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_succeeded(&self) {
        self.operations_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failed(&self) {
        self.operations_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_redirect(&self) {
        self.redirects_followed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_header_timeout(&self) {
        self.header_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_broker_handoff(&self) {
        self.broker_handoffs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_body_bytes(&self, bytes: usize) {
        self.body_bytes_received
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters, read with relaxed ordering.
    #[must_use]
    pub fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot {
            operations_started: self.operations_started.load(Ordering::Relaxed),
            operations_succeeded: self.operations_succeeded.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
            redirects_followed: self.redirects_followed.load(Ordering::Relaxed),
            header_timeouts: self.header_timeouts.load(Ordering::Relaxed),
            broker_handoffs: self.broker_handoffs.load(Ordering::Relaxed),
            body_bytes_received: self.body_bytes_received.load(Ordering::Relaxed),
        }
    }
}

impl OperationStatsSnapshot {
    /// Operations that reached a terminal result.
    #[inline]
    #[must_use]
    pub fn completed(&self) -> usize {
        self.operations_succeeded + self.operations_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = OperationStats::default();
        stats.record_started();
        stats.record_started();
        stats.record_succeeded();
        stats.record_failed();
        stats.record_body_bytes(512);
        stats.record_body_bytes(512);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.operations_started, 2);
        assert_eq!(snapshot.completed(), 2);
        assert_eq!(snapshot.body_bytes_received, 1024);
        assert_eq!(snapshot.redirects_followed, 0);
    }
}
