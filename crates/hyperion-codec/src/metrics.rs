use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking the encode path of one [`crate::Encoder`].
///
/// Shared across `Encoder::clone()`s via `Arc` so every handle writing
/// through the same underlying ring reports into the same totals. The
/// decode path does not get counters of its own here: a failed decode is
/// already fatal and surfaced to the caller through [`crate::DecodeError`],
/// so there is no silent-failure case a counter would need to expose.
#[derive(Debug, Default)]
pub struct Metrics {
    commands_written: AtomicU64,
    write_rejections: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_write(&self, accepted: bool) {
        if accepted {
            self.commands_written.fetch_add(1, Ordering::Relaxed);
        } else {
            self.write_rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn commands_written(&self) -> u64 {
        self.commands_written.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn write_rejections(&self) -> u64 {
        self.write_rejections.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            commands_written: self.commands_written(),
            write_rejections: self.write_rejections(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub commands_written: u64,
    pub write_rejections: u64,
}
