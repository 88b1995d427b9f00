//! Overflow parking and the backpressure-wrapped producer.
//!
//! [`BackpressureQueue`] holds commands a ring momentarily refused; critical
//! entries (`SpawnEntity` / `DespawnEntity`) keep their order and are never
//! dropped, while coalescing entries collapse to one per `(entityId, type)`
//! key. [`BackpressuredProducer`] wraps any [`CommandProducer`] with this
//! queue so callers never see a rejected write.

mod invariants;
mod metrics;
mod producer;
mod queue;

pub use metrics::{Metrics, MetricsSnapshot};
pub use producer::{BackpressuredProducer, CommandProducer};
pub use queue::BackpressureQueue;
