use crate::invariants::{debug_assert_soa_lengths_match, debug_assert_tick_count_monotonic};

/// Number of f32 per entity's transform row (a 16-float row-stored
/// mat4x4). The translation lives at indices 12, 13, 14 of this block,
/// regardless of how the remaining nine rotation and scale components are
/// packed.
pub const TRANSFORM_FLOATS: usize = 16;
pub const TRANSLATION_OFFSET: usize = 12;
pub const BOUNDS_FLOATS: usize = 4;
pub const PRIM_PARAM_FLOATS: usize = 8;
/// Width of one dirty-entity staging record: transform, bounds, render
/// metadata, texture index, and prim params packed contiguously as 32-bit
/// words.
pub const STAGING_WORDS: usize = 32;

/// One tick's published Structure-of-Arrays view.
///
/// Immutable once constructed: the bridge builds a fresh `Snapshot` each
/// tick rather than mutating a shared one, matching the one-tick staleness
/// window.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entity_count: usize,
    /// `entity_count * TRANSFORM_FLOATS` row-major transforms.
    pub transforms: Vec<f32>,
    /// `entity_count * BOUNDS_FLOATS` bounding spheres (xyz + radius).
    pub bounds: Vec<f32>,
    pub mesh_handles: Vec<u32>,
    pub primitive_kinds: Vec<u32>,
    pub texture_indices: Vec<u32>,
    /// `entity_count * PRIM_PARAM_FLOATS` shader primitive parameters.
    pub prim_params: Vec<f32>,
    /// External entity id carried alongside each SoA row.
    pub entity_ids: Vec<u32>,
    pub listener_position: [f32; 3],
    pub tick_count: u64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty(0)
    }
}

impl Snapshot {
    /// Builds a snapshot, asserting every parallel array matches
    /// `entity_count` under debug assertions (INV-SIM-02).
    #[must_use]
    pub fn new(
        entity_count: usize,
        transforms: Vec<f32>,
        bounds: Vec<f32>,
        mesh_handles: Vec<u32>,
        primitive_kinds: Vec<u32>,
        texture_indices: Vec<u32>,
        prim_params: Vec<f32>,
        entity_ids: Vec<u32>,
        listener_position: [f32; 3],
        tick_count: u64,
    ) -> Self {
        debug_assert_soa_lengths_match!(
            entity_count,
            transforms.len() / TRANSFORM_FLOATS,
            bounds.len() / BOUNDS_FLOATS,
            mesh_handles.len(),
            primitive_kinds.len(),
            texture_indices.len(),
            prim_params.len() / PRIM_PARAM_FLOATS,
            entity_ids.len(),
        );
        Self {
            entity_count,
            transforms,
            bounds,
            mesh_handles,
            primitive_kinds,
            texture_indices,
            prim_params,
            entity_ids,
            listener_position,
            tick_count,
        }
    }

    /// An empty snapshot at `tick_count`, used for engines with no live
    /// entities and as the bridge's pre-`ready()` placeholder.
    #[must_use]
    pub fn empty(tick_count: u64) -> Self {
        Self::new(0, vec![], vec![], vec![], vec![], vec![], vec![], vec![], [0.0; 3], tick_count)
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Validates the new snapshot's `tick_count` strictly increased relative
    /// to `previous`. Debug-only; callers decide whether a violation is
    /// fatal.
    pub fn assert_monotonic_after(&self, previous: &Snapshot) {
        debug_assert_tick_count_monotonic!(previous.tick_count, self.tick_count);
    }
}

/// The subset of entities whose SoA row changed since the previous
/// published snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirtySet {
    /// Slot indices into the snapshot's parallel arrays, at most `entityCount` long.
    pub slots: Vec<u32>,
    /// One `STAGING_WORDS`-word staging record per dirty slot, in the same order.
    pub staging: Vec<[u32; STAGING_WORDS]>,
}

impl DirtySet {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.slots.len()
    }

    /// `dirtyCount / entityCount`; `0.0` for an empty snapshot rather than
    /// dividing by zero, since an empty scene has nothing to scatter or
    /// fully re-upload.
    #[must_use]
    pub fn dirty_ratio(&self, entity_count: usize) -> f64 {
        if entity_count == 0 {
            0.0
        } else {
            self.dirty_count() as f64 / entity_count as f64
        }
    }

    /// Whether the renderer should scatter-upload (`true`) using this dirty
    /// set or fall back to a full SoA re-upload (`false`), per the
    /// configured `scatter_threshold`.
    #[must_use]
    pub fn should_scatter(&self, entity_count: usize, scatter_threshold: f64) -> bool {
        self.dirty_ratio(entity_count) <= scatter_threshold
    }
}
