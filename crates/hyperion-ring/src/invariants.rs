//! Debug assertion macros for ring buffer invariants.
//!
//! These macros provide runtime checks for the ring's head/capacity
//! invariants. They are only active in debug builds
//! (`#[cfg(debug_assertions)]`), so there is zero overhead in release
//! builds.

// =============================================================================
// INV-RING-01: Bounded live bytes
// =============================================================================

/// Assert that at most `capacity - 1` bytes are ever live in the ring.
///
/// **Invariant**: `0 <= used <= capacity - 1`
macro_rules! debug_assert_bounded_used {
    ($used:expr, $capacity:expr) => {
        debug_assert!(
            $used <= $capacity - 1,
            "INV-RING-01 violated: {} live bytes exceeds capacity-1 ({})",
            $used,
            $capacity - 1
        )
    };
}

// =============================================================================
// INV-RING-02: Heads stay in range
// =============================================================================

/// Assert that a head index is within `[0, capacity)`.
macro_rules! debug_assert_head_in_range {
    ($name:literal, $head:expr, $capacity:expr) => {
        debug_assert!(
            ($head as usize) < $capacity,
            "INV-RING-02 violated: {} = {} is outside [0, {})",
            $name,
            $head,
            $capacity
        )
    };
}

// =============================================================================
// INV-RING-03: No write past the unread region
// =============================================================================

/// Assert that a just-computed message length fits in the free space
/// observed before writing; catches a corrupted `write_head` advance.
macro_rules! debug_assert_fits_free_space {
    ($len:expr, $free:expr) => {
        debug_assert!(
            $len <= $free,
            "INV-RING-03 violated: message of {} bytes written into {} free bytes",
            $len,
            $free
        )
    };
}

// =============================================================================
// INV-RING-04: Consumer reads no further than write_head
// =============================================================================

/// Assert that an extract never advances `read_head` past the `write_head`
/// it observed when the extract began.
macro_rules! debug_assert_read_not_past_write {
    ($new_read_head:expr, $observed_write_head:expr) => {
        debug_assert!(
            $new_read_head == $observed_write_head,
            "INV-RING-04 violated: read_head advanced to {} past observed write_head {}",
            $new_read_head,
            $observed_write_head
        )
    };
}

pub(crate) use debug_assert_bounded_used;
pub(crate) use debug_assert_fits_free_space;
pub(crate) use debug_assert_head_in_range;
pub(crate) use debug_assert_read_not_past_write;
