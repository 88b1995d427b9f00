use crate::header::Header;
use crate::invariants::{
    debug_assert_bounded_used, debug_assert_fits_free_space, debug_assert_head_in_range,
    debug_assert_read_not_past_write,
};
use crate::metrics::Metrics;
use crate::RingError;
use std::cell::UnsafeCell;

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// This is an SPSC byte ring: exactly one producer thread calls
// `write_command`, exactly one consumer thread calls `extract_unread`.
//
// Unlike a generic typed ring, `write_head`/`read_head` are bounded indices
// in `[0, capacity)` rather than unbounded sequence numbers: the header is
// meant to be mappable directly onto shared memory with the fixed 32-byte
// layout documented in `header::offset`, so wrap arithmetic happens on every
// access instead of only at the point a cached index is turned into a slot.
//
// Producer: relaxed load of `write_head` (self-owned), acquire load of
// `read_head` only when space is in question, release store of `write_head`
// after the message bytes are written. Consumer: relaxed load of
// `read_head` (self-owned), acquire load of `write_head`, release store of
// `read_head` after the bytes have been copied out. Non-header bytes carry
// no atomicity of their own; the release/acquire pair on the heads is what
// publishes them.
// =============================================================================

/// Wait-free, byte-granular SPSC ring buffer with an explicit header.
///
/// `capacity` is the size in bytes of the data region and must be a
/// multiple of four; it never changes after construction.
pub struct RingBuffer {
    header: Header,
    capacity: usize,
    data: UnsafeCell<Box<[u8]>>,
    metrics: Metrics,
}

// Safety: the SPSC contract guarantees exactly one producer thread and one
// consumer thread ever touch `data`, and the header's acquire/release pairs
// on write_head/read_head establish the happens-before edges that make
// those disjoint accesses safe.
unsafe impl Send for RingBuffer {}
unsafe impl Sync for RingBuffer {}

impl RingBuffer {
    /// Creates a new ring buffer with the given data-region capacity.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::CapacityInvalid`] if `capacity` is zero or not a
    /// multiple of four (required so 32-bit payload fields can be aligned
    /// when checked against the offset table).
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 || capacity % 4 != 0 {
            return Err(RingError::CapacityInvalid { capacity });
        }

        Ok(Self {
            header: Header::new(),
            capacity,
            data: UnsafeCell::new(vec![0u8; capacity].into_boxed_slice()),
            metrics: Metrics::new(),
        })
    }

    /// Returns the data-region capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Direct access to the shared header (heartbeats, overflow counter).
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Traffic counters (writes committed/rejected, reads, byte totals).
    #[inline]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Bytes available for a producer write right now.
    ///
    /// `capacity - 1 - ((write_head - read_head) mod capacity)`. At most
    /// `capacity - 1` bytes are ever live so that a full ring is
    /// distinguishable from an empty one.
    #[inline]
    pub fn free_space(&self) -> usize {
        let write_head = self.header.write_head_relaxed() as usize;
        let read_head = self.header.read_head_acquire() as usize;
        let used = (write_head + self.capacity - read_head) % self.capacity;
        debug_assert_bounded_used!(used, self.capacity);
        self.capacity - 1 - used
    }

    /// Writes one command record `[type][entityId LE][payload]`, wrapping
    /// across the capacity boundary as needed.
    ///
    /// Returns `true` if the record fit and was published; `false` if the
    /// ring did not have enough free space, in which case nothing was
    /// written and `write_head` was not advanced.
    pub fn write_command(&self, command_type: u8, entity_id: u32, payload: &[u8]) -> bool {
        let len = 1 + 4 + payload.len();
        let free = self.free_space();
        if free < len {
            self.metrics.record_write_rejected();
            return false;
        }
        debug_assert_fits_free_space!(len, free);

        let write_head = self.header.write_head_relaxed();
        debug_assert_head_in_range!("write_head", write_head, self.capacity);

        let mut cursor = write_head as usize;
        cursor = self.write_byte(cursor, command_type);
        for byte in entity_id.to_le_bytes() {
            cursor = self.write_byte(cursor, byte);
        }
        for &byte in payload {
            cursor = self.write_byte(cursor, byte);
        }

        self.header.store_write_head_release(cursor as u32);
        self.metrics.record_write_committed(len);
        true
    }

    /// Drains every unread byte between `read_head` and the currently
    /// observed `write_head`, dematerialising the wrap into one contiguous
    /// buffer, and advances `read_head` past everything returned.
    ///
    /// The caller must fully consume the returned bytes before calling this
    /// again - the contract does not support partial extraction.
    pub fn extract_unread(&self) -> Vec<u8> {
        let write_head = self.header.write_head_acquire() as usize;
        let read_head = self.header.read_head_relaxed() as usize;
        debug_assert_head_in_range!("read_head", read_head, self.capacity);

        let len = (write_head + self.capacity - read_head) % self.capacity;
        let mut out = Vec::with_capacity(len);
        let mut idx = read_head;
        for _ in 0..len {
            // SAFETY: bytes in [read_head, write_head) were written by the
            // producer before its release-store of write_head; the acquire
            // load above synchronizes-with that store, making them visible.
            let byte = unsafe { (*self.data.get())[idx] };
            out.push(byte);
            idx = (idx + 1) % self.capacity;
        }

        debug_assert_read_not_past_write!(idx as u32, write_head as u32);
        self.header.store_read_head_release(write_head as u32);
        self.metrics.record_read(out.len());
        out
    }

    /// Internal: writes one byte at `idx` and returns the next (wrapped)
    /// cursor position.
    #[inline]
    fn write_byte(&self, idx: usize, byte: u8) -> usize {
        // SAFETY: idx is in [0, capacity) by construction. These bytes lie
        // between the old write_head and read_head - 1 (mod capacity),
        // which free_space's check above guarantees is not yet visible to
        // (or owned by) the consumer.
        unsafe {
            (*self.data.get())[idx] = byte;
        }
        (idx + 1) % self.capacity
    }
}
