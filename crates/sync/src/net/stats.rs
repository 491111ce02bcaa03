use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the network thread, readable from anywhere.
#[derive(Debug, Default)]
pub struct SyncStats {
    connections: AtomicU64,
    merges_applied: AtomicU64,
    merges_rejected: AtomicU64,
    disconnects: AtomicU64,
    transport_faults: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStatsSnapshot {
    pub connections: u64,
    pub merges_applied: u64,
    pub merges_rejected: u64,
    pub disconnects: u64,
    pub transport_faults: u64,
}

impl SyncStats {
    pub(crate) fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_merge(&self) {
        self.merges_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.merges_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fault(&self) {
        self.transport_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            connections: self.connections.load(Ordering::Relaxed),
            merges_applied: self.merges_applied.load(Ordering::Relaxed),
            merges_rejected: self.merges_rejected.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            transport_faults: self.transport_faults.load(Ordering::Relaxed),
        }
    }
}
