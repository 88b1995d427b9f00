//! Debug assertion macros for engine/bridge/snapshot invariants.

/// Assert a published `tickCount` strictly increases.
macro_rules! debug_assert_tick_count_monotonic {
    ($previous:expr, $current:expr) => {
        debug_assert!(
            $current > $previous,
            "INV-SIM-01 violated: tickCount did not strictly increase ({} -> {})",
            $previous,
            $current
        )
    };
}

/// Assert every parallel SoA array has the same length as `entityCount`.
macro_rules! debug_assert_soa_lengths_match {
    ($entity_count:expr, $( $array_len:expr ),+ $(,)?) => {
        $(
            debug_assert_eq!(
                $array_len, $entity_count,
                "INV-SIM-02 violated: SoA array length {} does not match entityCount {}",
                $array_len, $entity_count
            );
        )+
    };
}

/// Assert the entity count never exceeds the configured cap.
macro_rules! debug_assert_entity_count_bounded {
    ($entity_count:expr, $max_entities:expr) => {
        debug_assert!(
            $entity_count <= $max_entities,
            "INV-SIM-03 violated: entityCount {} exceeds maxEntities {}",
            $entity_count,
            $max_entities
        )
    };
}

pub(crate) use debug_assert_entity_count_bounded;
pub(crate) use debug_assert_soa_lengths_match;
pub(crate) use debug_assert_tick_count_monotonic;
