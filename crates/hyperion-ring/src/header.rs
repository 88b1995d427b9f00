use std::sync::atomic::{AtomicU32, Ordering};

/// Byte offset of each field inside the 32-byte shared header.
///
/// Mirrors the documented wire layout: a reader mapping this region
/// directly onto shared memory must see these exact offsets.
pub mod offset {
    pub const WRITE_HEAD: usize = 0;
    pub const READ_HEAD: usize = 4;
    pub const RESERVED_0: usize = 8;
    pub const RESERVED_1: usize = 12;
    pub const HEARTBEAT_W1: usize = 16;
    pub const HEARTBEAT_W2: usize = 20;
    pub const FLAGS: usize = 24;
    pub const OVERFLOW_COUNTER: usize = 28;
}

/// Total size in bytes of the shared header.
pub const HEADER_SIZE: usize = 32;

/// The 32-byte control header shared between producer and consumer.
///
/// Every field is an independent `AtomicU32` rather than a packed byte array
/// so that ordinary atomic loads/stores map 1:1 onto the offsets in
/// [`offset`] without any unaligned-access machinery. `writeHead` is
/// producer-owned and released on every successful write; `readHead` is
/// consumer-owned and released on every successful extract. The two
/// heartbeat counters, `flags`, and `overflowCounter` are incremented by
/// whichever side owns them and read with acquire ordering elsewhere.
#[repr(C)]
pub struct Header {
    write_head: AtomicU32,
    read_head: AtomicU32,
    reserved_0: AtomicU32,
    reserved_1: AtomicU32,
    heartbeat_w1: AtomicU32,
    heartbeat_w2: AtomicU32,
    flags: AtomicU32,
    overflow_counter: AtomicU32,
}

impl Header {
    pub const fn new() -> Self {
        Self {
            write_head: AtomicU32::new(0),
            read_head: AtomicU32::new(0),
            reserved_0: AtomicU32::new(0),
            reserved_1: AtomicU32::new(0),
            heartbeat_w1: AtomicU32::new(0),
            heartbeat_w2: AtomicU32::new(0),
            flags: AtomicU32::new(0),
            overflow_counter: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn write_head_acquire(&self) -> u32 {
        self.write_head.load(Ordering::Acquire)
    }

    #[inline]
    pub fn write_head_relaxed(&self) -> u32 {
        self.write_head.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn store_write_head_release(&self, value: u32) {
        self.write_head.store(value, Ordering::Release);
    }

    #[inline]
    pub fn read_head_acquire(&self) -> u32 {
        self.read_head.load(Ordering::Acquire)
    }

    #[inline]
    pub fn read_head_relaxed(&self) -> u32 {
        self.read_head.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn store_read_head_release(&self, value: u32) {
        self.read_head.store(value, Ordering::Release);
    }

    /// Simulation worker's per-tick heartbeat. Incremented by the consumer
    /// side; watched by [`crate`] users through the supervisor layer above.
    #[inline]
    pub fn tick_heartbeat_w1(&self) {
        self.heartbeat_w1.fetch_add(1, Ordering::Release);
    }

    #[inline]
    pub fn heartbeat_w1(&self) -> u32 {
        self.heartbeat_w1.load(Ordering::Acquire)
    }

    #[inline]
    pub fn tick_heartbeat_w2(&self) {
        self.heartbeat_w2.fetch_add(1, Ordering::Release);
    }

    #[inline]
    pub fn heartbeat_w2(&self) -> u32 {
        self.heartbeat_w2.load(Ordering::Acquire)
    }

    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_flags(&self, value: u32) {
        self.flags.store(value, Ordering::Release);
    }

    /// Consumer increments this when a decoded command would have
    /// overflowed a downstream sink (`OverflowDropped`).
    #[inline]
    pub fn record_overflow(&self) {
        self.overflow_counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn overflow_count(&self) -> u32 {
        self.overflow_counter.load(Ordering::Relaxed)
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_header_is_all_zero() {
        let header = Header::new();
        assert_eq!(header.write_head_acquire(), 0);
        assert_eq!(header.read_head_acquire(), 0);
        assert_eq!(header.heartbeat_w1(), 0);
        assert_eq!(header.overflow_count(), 0);
    }

    #[test]
    fn heartbeat_increments_monotonically() {
        let header = Header::new();
        header.tick_heartbeat_w1();
        header.tick_heartbeat_w1();
        assert_eq!(header.heartbeat_w1(), 2);
    }
}
