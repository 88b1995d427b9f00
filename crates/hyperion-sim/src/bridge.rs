use crate::abi::{LocalSimulation, RenderConsumer, SimulationAbi};
use crate::config::{EngineConfig, ModeChangeCallback, PreferredMode};
use crate::engine::Engine;
use crate::snapshot::{DirtySet, Snapshot};
use crate::supervisor::Supervisor;
use hyperion_queue::CommandProducer;
use hyperion_ring::RingBuffer;
use std::sync::Arc;
use std::time::Instant;

/// The three execution topologies, chosen once at bridge construction and
/// exposed as `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMode {
    /// Producer on main; simulation on worker 1; renderer on worker 2.
    FullIsolation,
    /// Producer and renderer on main; simulation on worker 1.
    PartialIsolation,
    /// Producer, simulation, and renderer all on main.
    SingleThread,
}

/// Capability-detection rule: shared memory is always available in this
/// in-process implementation, so the choice collapses to whether a
/// worker-owned GPU surface and an off-main-thread canvas-equivalent are
/// both present.
#[must_use]
pub fn detect_mode(has_worker_gpu_surface: bool, has_offmain_canvas: bool) -> BridgeMode {
    if has_worker_gpu_surface && has_offmain_canvas {
        BridgeMode::FullIsolation
    } else if has_worker_gpu_surface || has_offmain_canvas {
        BridgeMode::PartialIsolation
    } else {
        BridgeMode::SingleThread
    }
}

fn resolve_mode(preferred: PreferredMode) -> BridgeMode {
    match preferred {
        PreferredMode::Auto => detect_mode(false, false),
        PreferredMode::FullIsolation => BridgeMode::FullIsolation,
        PreferredMode::PartialIsolation => BridgeMode::PartialIsolation,
        PreferredMode::SingleThread => BridgeMode::SingleThread,
    }
}

struct TickRequest {
    dt: f32,
}

#[derive(Clone)]
struct TickResult {
    tick_count: u64,
    snapshot: Snapshot,
    dirty_set: DirtySet,
}

/// Runs the simulation worker loop for Partial/Full Isolation: pulls decoded
/// commands from the ring, advances the fixed timestep, and posts the
/// resulting snapshot back (and, in Full Isolation, to the render worker
/// too), one blocking `recv()` per tick request.
fn run_simulation_worker(
    ring: Arc<RingBuffer>,
    tick_rx: crossbeam_channel::Receiver<TickRequest>,
    main_tx: crossbeam_channel::Sender<TickResult>,
    render_tx: Option<crossbeam_channel::Sender<TickResult>>,
) {
    let mut sim = LocalSimulation::new();
    sim.engine_init();

    while let Ok(request) = tick_rx.recv() {
        let bytes = ring.extract_unread();
        if !bytes.is_empty() {
            if let Ok(commands) = hyperion_codec::decode_all(&bytes) {
                sim.engine_push_commands(&commands);
            }
        }
        sim.engine_update(request.dt);
        ring.header().tick_heartbeat_w1();

        let result = TickResult {
            tick_count: sim.engine_tick_count(),
            snapshot: sim.snapshot().clone(),
            dirty_set: sim.dirty_set().clone(),
        };
        if let Some(render_tx) = &render_tx {
            let _ = render_tx.send(result.clone());
        }
        if main_tx.send(result).is_err() {
            return;
        }
    }
}

/// Binds the producer, queue, consumer, simulation tick, and render-state
/// handoff into one per-frame step. `tick(dt)` is the only per-frame entry
/// point; its externally observable semantics are the same across all
/// three [`BridgeMode`]s.
pub struct Bridge {
    mode: BridgeMode,
    engine: Engine,
    supervisor: Supervisor,
    on_mode_change: Option<ModeChangeCallback>,
    ready: bool,
    destroyed: bool,
    latest_render_state: Option<TickResult>,
    worker: Option<WorkerHandles>,
    local_sim: Option<LocalSimulation>,
}

struct WorkerHandles {
    tick_tx: crossbeam_channel::Sender<TickRequest>,
    result_rx: crossbeam_channel::Receiver<TickResult>,
    render_rx: Option<crossbeam_channel::Receiver<TickResult>>,
    _sim_thread: std::thread::JoinHandle<()>,
}

impl Bridge {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mode = resolve_mode(config.preferred_mode);
        let on_mode_change = config.on_mode_change.clone();
        let supervisor = Supervisor::new(config.supervisor, config.on_timeout.clone());
        let engine = Engine::new(config);

        let (worker, local_sim) = match mode {
            BridgeMode::SingleThread => (None, Some(LocalSimulation::new())),
            BridgeMode::PartialIsolation | BridgeMode::FullIsolation => {
                let ring = Arc::clone(engine.ring());
                let (tick_tx, tick_rx) = crossbeam_channel::unbounded();
                let (main_tx, result_rx) = crossbeam_channel::unbounded();
                let (render_tx, render_rx) = if mode == BridgeMode::FullIsolation {
                    let (tx, rx) = crossbeam_channel::unbounded();
                    (Some(tx), Some(rx))
                } else {
                    (None, None)
                };
                let sim_thread = std::thread::Builder::new()
                    .name("hyperion-sim-worker".into())
                    .spawn(move || run_simulation_worker(ring, tick_rx, main_tx, render_tx))
                    .expect("failed to spawn simulation worker thread");
                (Some(WorkerHandles { tick_tx, result_rx, render_rx, _sim_thread: sim_thread }), None)
            }
        };

        let mut bridge = Self {
            mode,
            engine,
            supervisor,
            on_mode_change,
            ready: false,
            destroyed: false,
            latest_render_state: None,
            worker,
            local_sim,
        };
        if let Some(callback) = &bridge.on_mode_change {
            callback(match mode {
                BridgeMode::FullIsolation => PreferredMode::FullIsolation,
                BridgeMode::PartialIsolation => PreferredMode::PartialIsolation,
                BridgeMode::SingleThread => PreferredMode::SingleThread,
            });
        }
        bridge.ready();
        bridge
    }

    #[must_use]
    pub fn mode(&self) -> BridgeMode {
        self.mode
    }

    #[must_use]
    pub fn command_producer(&self) -> Arc<dyn CommandProducer> {
        self.engine.producer()
    }

    /// Initial startup suspension point. Workers are already spawned by
    /// [`Bridge::new`]; this just marks readiness and is idempotent so
    /// callers may invoke it defensively.
    pub fn ready(&mut self) -> bool {
        self.ready = true;
        self.ready
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn latest_render_state(&self) -> Option<(&Snapshot, &DirtySet)> {
        self.latest_render_state.as_ref().map(|r| (&r.snapshot, &r.dirty_set))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.latest_render_state.as_ref().map_or(0, |r| r.tick_count)
    }

    /// The per-frame step. Flushes the producer's backlog, then drives the
    /// simulation according to `mode`, and publishes exactly one new
    /// snapshot numbered by a monotonically increasing `tickCount`.
    pub fn tick(&mut self, dt: f32, render: &mut dyn RenderConsumer) {
        if self.destroyed {
            return;
        }
        self.engine.flush();

        match self.mode {
            BridgeMode::SingleThread => {
                let result = {
                    let sim =
                        self.local_sim.as_mut().expect("single-thread mode always owns a simulation");
                    let bytes = self.engine.ring().extract_unread();
                    if !bytes.is_empty() {
                        if let Ok(commands) = hyperion_codec::decode_all(&bytes) {
                            sim.engine_push_commands(&commands);
                        }
                    }
                    sim.engine_update(dt);
                    self.engine.ring().header().tick_heartbeat_w1();

                    TickResult {
                        tick_count: sim.engine_tick_count(),
                        snapshot: sim.snapshot().clone(),
                        dirty_set: sim.dirty_set().clone(),
                    }
                };
                self.publish(result, render);
            }
            BridgeMode::PartialIsolation | BridgeMode::FullIsolation => {
                // Surface whatever the worker already finished; this is the
                // one-frame pipeline latency inherent to isolation mode.
                let finished = {
                    let worker = self.worker.as_ref().expect("isolation modes always spawn a worker");
                    let finished = worker.result_rx.try_recv().ok();
                    let _ = worker.tick_tx.send(TickRequest { dt });
                    finished
                };
                if let Some(result) = finished {
                    self.publish(result, render);
                }
            }
        }

        let heartbeat = self.engine.ring().header().heartbeat_w1();
        self.supervisor.poll(heartbeat, Instant::now());
    }

    /// Applies the main-thread-only immediate override map to a copy of the
    /// freshly ticked snapshot before handing it to the renderer and
    /// storing it as `latest_render_state`.
    fn publish(&mut self, result: TickResult, render: &mut dyn RenderConsumer) {
        let TickResult { tick_count, mut snapshot, dirty_set } = result;
        self.engine.immediate().borrow().apply_to(&mut snapshot);
        render.consume(&snapshot, &dirty_set);
        self.latest_render_state = Some(TickResult { tick_count, snapshot, dirty_set });
    }

    /// Blocks until the worker's next result arrives, for tests that need a
    /// deterministic view of Mode A/B output instead of the best-effort
    /// `try_recv` in `tick`. Test-only helper, not a public API.
    #[cfg(test)]
    fn wait_for_next_result(&self, timeout: std::time::Duration) -> Option<(u64, Snapshot, DirtySet)> {
        let worker = self.worker.as_ref()?;
        worker.result_rx.recv_timeout(timeout).ok().map(|r| (r.tick_count, r.snapshot, r.dirty_set))
    }

    /// Idempotent teardown: drops the channel senders so worker threads
    /// exit on their next `recv()`, without waiting for outstanding ticks.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.engine.destroy();
        self.worker = None;
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
