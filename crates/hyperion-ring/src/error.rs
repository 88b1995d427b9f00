use thiserror::Error;

/// Construction-time errors for [`crate::RingBuffer`].
///
/// `writeCommand` returning `false` on a full ring is *not* one of these -
/// that is back-pressure, recovered one layer up (see `hyperion-queue`), not
/// a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// `capacity` was zero or not a multiple of four.
    #[error("ring capacity {capacity} is not a positive multiple of 4")]
    CapacityInvalid {
        /// The rejected capacity value.
        capacity: usize,
    },
}
