use crate::snapshot::{Snapshot, TRANSFORM_FLOATS, TRANSLATION_OFFSET};
use std::collections::HashMap;

/// Main-thread-only shadow of entity positions, applied to a snapshot copy
/// to mask the one-tick pipeline delay.
#[derive(Debug, Default)]
pub struct ImmediateOverrideMap {
    overrides: HashMap<u32, (f32, f32, f32)>,
}

impl ImmediateOverrideMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `{id -> (x, y, z)}`, replacing any existing override for `id`.
    pub fn set(&mut self, entity_id: u32, x: f32, y: f32, z: f32) {
        self.overrides.insert(entity_id, (x, y, z));
    }

    /// Removes the override for `id`, if any.
    pub fn clear(&mut self, entity_id: u32) {
        self.overrides.remove(&entity_id);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Walks `snapshot.entity_ids`; for every id present in the map, writes
    /// the override position into the transform row at columns
    /// `TRANSLATION_OFFSET..+3`. Applied to the caller's copy of the
    /// snapshot, never to simulation-owned memory.
    pub fn apply_to(&self, snapshot: &mut Snapshot) {
        if self.overrides.is_empty() {
            return;
        }
        for (row, &entity_id) in snapshot.entity_ids.iter().enumerate() {
            if let Some(&(x, y, z)) = self.overrides.get(&entity_id) {
                let base = row * TRANSFORM_FLOATS + TRANSLATION_OFFSET;
                snapshot.transforms[base] = x;
                snapshot.transforms[base + 1] = y;
                snapshot.transforms[base + 2] = z;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    fn two_entity_snapshot() -> Snapshot {
        Snapshot::new(
            2,
            vec![0.0; 32],
            vec![0.0; 8],
            vec![0, 0],
            vec![0, 0],
            vec![0, 0],
            vec![0.0; 16],
            vec![7, 42],
            [0.0; 3],
            1,
        )
    }

    /// Override on entity 7 patches row 0's translation; entity 42's row is
    /// untouched.
    #[test]
    fn override_on_one_entity_leaves_other_rows_untouched() {
        let mut snapshot = two_entity_snapshot();
        let mut overrides = ImmediateOverrideMap::new();
        overrides.set(7, 10.0, 20.0, 30.0);

        overrides.apply_to(&mut snapshot);

        assert_eq!(&snapshot.transforms[12..=14], &[10.0, 20.0, 30.0]);
        assert_eq!(&snapshot.transforms[16 + 12..=16 + 14], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn clear_removes_override() {
        let mut overrides = ImmediateOverrideMap::new();
        overrides.set(7, 1.0, 2.0, 3.0);
        overrides.clear(7);
        assert!(overrides.is_empty());

        let mut snapshot = two_entity_snapshot();
        overrides.apply_to(&mut snapshot);
        assert_eq!(&snapshot.transforms[12..=14], &[0.0, 0.0, 0.0]);
    }
}
