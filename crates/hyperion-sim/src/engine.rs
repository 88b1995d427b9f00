use crate::config::{BackpressureMode, EngineConfig, EventCallback};
use crate::error::HyperionError;
use crate::handle::{EntityHandle, HandlePool};
use crate::immediate::ImmediateOverrideMap;
use crate::metrics::Metrics;
use hyperion_codec::{Command, Encoder};
use hyperion_queue::{BackpressuredProducer, CommandProducer};
use hyperion_ring::RingBuffer;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Producer used under `BackpressureMode::Drop` (emits `OverflowDropped`):
/// attempts a direct write and, on refusal, discards the command and
/// increments the ring header's overflow counter instead of queuing it.
/// Always reports `true` to callers; the drop itself is the handling.
struct DroppingProducer {
    encoder: Encoder,
    metrics: Arc<Metrics>,
    on_overflow: Option<EventCallback>,
}

impl CommandProducer for DroppingProducer {
    fn write(&self, command: Command) -> bool {
        if self.encoder.write(command) {
            return true;
        }
        self.encoder.ring().header().record_overflow();
        self.metrics.record_overflow_drop();
        if let Some(callback) = &self.on_overflow {
            callback();
        }
        true
    }

    fn free_space(&self) -> usize {
        self.encoder.free_space()
    }
}

/// The two producer strategies selectable via `BackpressureMode`. Kept as
/// an enum rather than a bare trait object so `flush()` can reach the
/// queue-backed variant directly while handles still see a uniform
/// `Arc<dyn CommandProducer>`.
enum ProducerKind {
    Retry(Arc<BackpressuredProducer<Encoder>>),
    Drop(Arc<DroppingProducer>),
}

impl ProducerKind {
    fn as_command_producer(&self) -> Arc<dyn CommandProducer> {
        match self {
            Self::Retry(producer) => Arc::clone(producer) as Arc<dyn CommandProducer>,
            Self::Drop(producer) => Arc::clone(producer) as Arc<dyn CommandProducer>,
        }
    }
}

/// Owns the ring, the chosen producer strategy, the handle pool, and the
/// immediate-override map for one simulation instance. Enforces
/// `maxEntities` and destroyed-engine rejection; per-handle lifetime rules
/// live in [`crate::handle`].
pub struct Engine {
    config: EngineConfig,
    ring: Arc<RingBuffer>,
    producer: ProducerKind,
    pool: HandlePool,
    immediate: Rc<RefCell<ImmediateOverrideMap>>,
    metrics: Arc<Metrics>,
    next_id: u32,
    live_count: u32,
    destroyed: bool,
}

impl Engine {
    /// # Panics
    /// If `config.command_buffer_size` is not a positive multiple of four,
    /// surfaced by `RingBuffer::new`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let ring = Arc::new(
            RingBuffer::new(config.command_buffer_size)
                .expect("command_buffer_size must be a positive multiple of four"),
        );
        let encoder = Encoder::new(Arc::clone(&ring));
        let metrics = Arc::new(Metrics::new());

        let producer = match config.backpressure {
            BackpressureMode::RetryQueue => {
                ProducerKind::Retry(Arc::new(BackpressuredProducer::new(encoder)))
            }
            BackpressureMode::Drop => ProducerKind::Drop(Arc::new(DroppingProducer {
                encoder,
                metrics: Arc::clone(&metrics),
                on_overflow: config.on_overflow.clone(),
            })),
        };

        Self {
            pool: HandlePool::with_default_capacity(),
            immediate: Rc::new(RefCell::new(ImmediateOverrideMap::new())),
            next_id: 0,
            live_count: 0,
            destroyed: false,
            ring,
            producer,
            metrics,
            config,
        }
    }

    #[must_use]
    pub fn ring(&self) -> &Arc<RingBuffer> {
        &self.ring
    }

    #[must_use]
    pub fn immediate(&self) -> &Rc<RefCell<ImmediateOverrideMap>> {
        &self.immediate
    }

    /// Entity lifecycle and overflow counters.
    #[must_use]
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    #[must_use]
    pub fn producer(&self) -> Arc<dyn CommandProducer> {
        self.producer.as_command_producer()
    }

    /// Flushes any parked backlog (no-op under `Drop` mode). Intended to be
    /// called at the start of each `tick(dt)`.
    pub fn flush(&self) {
        if let ProducerKind::Retry(queued) = &self.producer {
            queued.flush();
        }
    }

    /// Allocates a monotonically increasing entity id, acquires a handle
    /// from the pool (emitting `spawnEntity`), and counts it against
    /// `maxEntities`.
    pub fn spawn(&mut self) -> Result<EntityHandle, HyperionError> {
        if self.destroyed {
            return Err(HyperionError::EngineDestroyed);
        }
        if self.live_count >= self.config.max_entities {
            self.metrics.record_spawn_rejected();
            return Err(HyperionError::EntityLimitReached { max_entities: self.config.max_entities });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.live_count += 1;
        self.metrics.record_spawn();
        Ok(self.pool.acquire(id, self.producer(), Some(Rc::clone(&self.immediate))))
    }

    /// Destroys `handle` (emitting `despawnEntity` if not already destroyed)
    /// and returns it to the pool, decrementing the live count.
    pub fn despawn(&mut self, handle: EntityHandle) {
        if self.destroyed {
            return;
        }
        if handle.is_alive() {
            self.live_count = self.live_count.saturating_sub(1);
            self.metrics.record_despawn();
        }
        self.pool.release(handle);
    }

    #[must_use]
    pub fn live_count(&self) -> u32 {
        self.live_count
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Idempotent teardown. Further `spawn()` calls fail with
    /// `EngineDestroyed`; in-flight commands not yet on the ring are
    /// discarded.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
