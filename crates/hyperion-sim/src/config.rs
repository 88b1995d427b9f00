use std::sync::Arc;
use std::time::Duration;

/// What happens to a coalescing command that cannot be parked (emits
/// `OverflowDropped`). `RetryQueue` is the default and the only mode the
/// backpressure queue itself implements without bound; `Drop` is handled one
/// layer up, in [`crate::engine::Engine`], by discarding the write and
/// incrementing the ring header's overflow counter instead of queuing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackpressureMode {
    #[default]
    RetryQueue,
    Drop,
}

/// Which bridge topology to run, via capability detection. `Auto` defers
/// to [`crate::bridge::detect_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferredMode {
    #[default]
    Auto,
    FullIsolation,
    PartialIsolation,
    SingleThread,
}

/// Supervisor polling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupervisorConfig {
    /// How often to compare the observed heartbeat against its last value.
    pub check_interval: Duration,
    /// Consecutive unchanged checks before `onTimeout` fires.
    pub miss_threshold: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(1_000),
            miss_threshold: 3,
        }
    }
}

/// A callback invoked from whichever thread detects the event. Callers
/// must not assume a particular thread and must not block inside it.
pub type EventCallback = Arc<dyn Fn() + Send + Sync>;

/// A callback invoked when the bridge's resolved mode changes, carrying the
/// newly active mode.
pub type ModeChangeCallback = Arc<dyn Fn(PreferredMode) + Send + Sync>;

/// Engine-wide configuration: a `Default` matching the documented defaults,
/// named presets, and builder-style `with_*` setters.
#[derive(Clone)]
pub struct EngineConfig {
    pub max_entities: u32,
    pub command_buffer_size: usize,
    pub backpressure: BackpressureMode,
    pub fixed_timestep: f32,
    pub preferred_mode: PreferredMode,
    pub scatter_threshold: f64,
    pub supervisor: SupervisorConfig,
    pub on_timeout: Option<EventCallback>,
    pub on_overflow: Option<EventCallback>,
    pub on_mode_change: Option<ModeChangeCallback>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("max_entities", &self.max_entities)
            .field("command_buffer_size", &self.command_buffer_size)
            .field("backpressure", &self.backpressure)
            .field("fixed_timestep", &self.fixed_timestep)
            .field("preferred_mode", &self.preferred_mode)
            .field("scatter_threshold", &self.scatter_threshold)
            .field("supervisor", &self.supervisor)
            .field("on_timeout", &self.on_timeout.is_some())
            .field("on_overflow", &self.on_overflow.is_some())
            .field("on_mode_change", &self.on_mode_change.is_some())
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// The documented defaults: 100k entities, 64 KiB ring, retry queue,
    /// 1/60s fixed timestep, auto mode, 0.3 scatter threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_entities: 100_000,
            command_buffer_size: 65_536,
            backpressure: BackpressureMode::RetryQueue,
            fixed_timestep: 1.0 / 60.0,
            preferred_mode: PreferredMode::Auto,
            scatter_threshold: 0.3,
            supervisor: SupervisorConfig::default(),
            on_timeout: None,
            on_overflow: None,
            on_mode_change: None,
        }
    }

    /// A smaller ring and tighter supervisor polling, favoring responsiveness
    /// over headroom for bursty command traffic.
    #[must_use]
    pub fn low_latency() -> Self {
        Self {
            command_buffer_size: 16_384,
            supervisor: SupervisorConfig {
                check_interval: Duration::from_millis(250),
                miss_threshold: 3,
            },
            ..Self::new()
        }
    }

    /// A larger ring and looser supervisor polling, favoring sustained
    /// throughput of bulk spawns/mutations over worst-case latency.
    #[must_use]
    pub fn high_throughput() -> Self {
        Self {
            command_buffer_size: 262_144,
            scatter_threshold: 0.5,
            supervisor: SupervisorConfig {
                check_interval: Duration::from_millis(2_000),
                miss_threshold: 5,
            },
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_max_entities(mut self, max_entities: u32) -> Self {
        self.max_entities = max_entities;
        self
    }

    #[must_use]
    pub fn with_command_buffer_size(mut self, bytes: usize) -> Self {
        self.command_buffer_size = bytes;
        self
    }

    #[must_use]
    pub fn with_backpressure(mut self, mode: BackpressureMode) -> Self {
        self.backpressure = mode;
        self
    }

    #[must_use]
    pub fn with_preferred_mode(mut self, mode: PreferredMode) -> Self {
        self.preferred_mode = mode;
        self
    }

    #[must_use]
    pub fn with_scatter_threshold(mut self, threshold: f64) -> Self {
        self.scatter_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_on_timeout(mut self, callback: EventCallback) -> Self {
        self.on_timeout = Some(callback);
        self
    }

    #[must_use]
    pub fn with_on_overflow(mut self, callback: EventCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    #[must_use]
    pub fn with_on_mode_change(mut self, callback: ModeChangeCallback) -> Self {
        self.on_mode_change = Some(callback);
        self
    }
}
