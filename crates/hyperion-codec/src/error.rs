use thiserror::Error;

/// Wire-format errors. Both are fatal; they indicate stream corruption or a
/// type-table version mismatch, not recoverable backpressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The type byte did not match any entry in the type→payload-size table.
    #[error("unknown command type byte {code:#04x}")]
    UnknownType { code: u8 },

    /// The stream ended in the middle of a record (header or payload).
    #[error("stream truncated at offset {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },
}

impl DecodeError {
    /// Both decode errors are terminal: the extractor's contract guarantees
    /// records are never fragmented across extracts, so either error means
    /// the stream itself is corrupt.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        true
    }
}
