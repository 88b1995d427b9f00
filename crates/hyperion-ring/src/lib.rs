//! Hyperion Ring - Lock-Free SPSC Byte Ring Buffer
//!
//! A wait-free single-producer/single-consumer ring buffer over a flat byte
//! region, prefixed by a 32-byte atomic header.
//! Intended as the wire-level transport underneath `hyperion-codec`; one
//! producer thread writes serialized command records, one consumer thread
//! (the simulation worker) drains them once per tick.
//!
//! # Example
//!
//! ```
//! use hyperion_ring::RingBuffer;
//!
//! let ring = RingBuffer::new(4096).unwrap();
//! assert!(ring.write_command(1, 0, &[])); // SpawnEntity(0)
//! let bytes = ring.extract_unread();
//! assert_eq!(bytes, vec![1, 0, 0, 0, 0]);
//! ```

mod error;
mod header;
mod invariants;
mod metrics;
mod ring;

pub use error::RingError;
pub use header::{offset, Header, HEADER_SIZE};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ring::RingBuffer;
