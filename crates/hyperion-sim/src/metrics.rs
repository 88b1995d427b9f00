use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking one [`crate::Engine`]'s entity lifecycle and
/// overflow handling.
#[derive(Debug, Default)]
pub struct Metrics {
    entities_spawned: AtomicU64,
    entities_despawned: AtomicU64,
    spawn_rejections: AtomicU64,
    overflow_drops: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_spawn(&self) {
        self.entities_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_despawn(&self) {
        self.entities_despawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_spawn_rejected(&self) {
        self.spawn_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overflow_drop(&self) {
        self.overflow_drops.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn entities_spawned(&self) -> u64 {
        self.entities_spawned.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn entities_despawned(&self) -> u64 {
        self.entities_despawned.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn spawn_rejections(&self) -> u64 {
        self.spawn_rejections.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn overflow_drops(&self) -> u64 {
        self.overflow_drops.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entities_spawned: self.entities_spawned(),
            entities_despawned: self.entities_despawned(),
            spawn_rejections: self.spawn_rejections(),
            overflow_drops: self.overflow_drops(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub entities_spawned: u64,
    pub entities_despawned: u64,
    pub spawn_rejections: u64,
    pub overflow_drops: u64,
}
