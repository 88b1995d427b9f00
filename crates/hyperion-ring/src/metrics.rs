use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking ring traffic, one instance per [`crate::RingBuffer`].
///
/// Every field is an independent `AtomicU64` updated with `Relaxed` ordering:
/// these are observability counters, not synchronization, so they ride on top
/// of the write_head/read_head acquire/release protocol rather than
/// participating in it.
#[derive(Debug, Default)]
pub struct Metrics {
    writes_committed: AtomicU64,
    write_rejections: AtomicU64,
    bytes_written: AtomicU64,
    reads_performed: AtomicU64,
    bytes_read: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_write_committed(&self, bytes: usize) {
        self.writes_committed.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_write_rejected(&self) {
        self.write_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self, bytes: usize) {
        self.reads_performed.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn writes_committed(&self) -> u64 {
        self.writes_committed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn write_rejections(&self) -> u64 {
        self.write_rejections.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn reads_performed(&self) -> u64 {
        self.reads_performed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// A point-in-time copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes_committed: self.writes_committed(),
            write_rejections: self.write_rejections(),
            bytes_written: self.bytes_written(),
            reads_performed: self.reads_performed(),
            bytes_read: self.bytes_read(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub writes_committed: u64,
    pub write_rejections: u64,
    pub bytes_written: u64,
    pub reads_performed: u64,
    pub bytes_read: u64,
}
