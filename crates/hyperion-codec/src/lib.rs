//! Hyperion Codec - typed mutation calls to/from wire records
//!
//! Sits directly on top of `hyperion-ring`: [`Encoder`] forms
//! `[type][entityId LE][payload…]` records and hands them to the ring
//! writer; [`Decoder`] walks a drained byte stream back into typed
//! [`Command`] values using the type→payload-size table.

mod command;
mod decoder;
mod encoder;
mod error;
mod metrics;

pub use command::{Command, CommandType, NO_PARENT};
pub use decoder::{decode_all, Decoder};
pub use encoder::Encoder;
pub use error::DecodeError;
pub use metrics::{Metrics, MetricsSnapshot};
