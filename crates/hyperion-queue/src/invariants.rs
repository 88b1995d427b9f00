//! Debug assertion macros for backpressure queue invariants.

/// Assert that a coalescing write is never attempted while critical entries
/// remain (`drain_to` must exhaust the critical sequence, or hit `false`,
/// before touching the coalescing map).
macro_rules! debug_assert_critical_drained_first {
    ($critical_remaining:expr) => {
        debug_assert!(
            $critical_remaining == 0,
            "INV-QUEUE-01 violated: attempted coalescing write with {} critical entries still pending",
            $critical_remaining
        )
    };
}

/// Assert the coalescing map holds at most one entry per `(entityId, type)`
/// key (violated only by a bug in `enqueue`'s key computation).
macro_rules! debug_assert_single_entry_per_key {
    ($map_len:expr, $unique_keys:expr) => {
        debug_assert!(
            $map_len == $unique_keys,
            "INV-QUEUE-02 violated: coalescing map has {} entries but only {} unique keys",
            $map_len,
            $unique_keys
        )
    };
}

pub(crate) use debug_assert_critical_drained_first;
#[allow(unused_imports)]
pub(crate) use debug_assert_single_entry_per_key;
