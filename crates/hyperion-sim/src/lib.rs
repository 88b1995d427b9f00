//! Frame orchestrator: bridge topologies, SoA snapshots, the immediate
//! override map, the heartbeat supervisor, and entity handle lifecycle.
//!
//! Built on [`hyperion_ring`]'s transport and [`hyperion_codec`]'s wire
//! format, wrapped by [`hyperion_queue`]'s backpressure queue. This crate is
//! the layer a host application actually talks to: construct an [`Engine`]
//! or a [`Bridge`], spawn [`EntityHandle`]s, and consume published
//! [`Snapshot`]s each frame.

mod abi;
mod bridge;
mod config;
mod engine;
mod error;
mod handle;
mod immediate;
mod invariants;
mod metrics;
mod snapshot;
mod supervisor;

pub use abi::{LocalSimulation, NullRenderConsumer, RenderConsumer, SimulationAbi};
pub use bridge::{detect_mode, Bridge, BridgeMode};
pub use config::{
    BackpressureMode, EngineConfig, EventCallback, ModeChangeCallback, PreferredMode,
    SupervisorConfig,
};
pub use engine::Engine;
pub use error::HyperionError;
pub use handle::{EntityHandle, HandlePool, DEFAULT_POOL_CAPACITY};
pub use immediate::ImmediateOverrideMap;
pub use metrics::{Metrics, MetricsSnapshot};
pub use snapshot::{
    DirtySet, Snapshot, BOUNDS_FLOATS, PRIM_PARAM_FLOATS, STAGING_WORDS, TRANSFORM_FLOATS,
    TRANSLATION_OFFSET,
};
pub use supervisor::Supervisor;
