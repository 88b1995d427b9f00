use crate::snapshot::{DirtySet, Snapshot};

/// The native simulation capability surface ("Simulation ABI"). Stands in
/// for the out-of-process or cross-ABI simulation boundary an external
/// collaborator would occupy; `hyperion-sim` ships [`LocalSimulation`], an
/// in-process implementation sufficient to drive the bridge end-to-end.
pub trait SimulationAbi {
    /// One-time setup; safe to call multiple times (subsequent calls are a
    /// no-op) so bridge `ready()` can be idempotent across modes.
    fn engine_init(&mut self);

    /// Feeds a drained, decoded command stream to the simulation.
    fn engine_push_commands(&mut self, commands: &[hyperion_codec::Command]);

    /// Advances the fixed-timestep simulation by `dt` seconds and publishes
    /// a fresh snapshot and dirty set, incrementing `tick_count`.
    fn engine_update(&mut self, dt: f32);

    fn engine_tick_count(&self) -> u64;

    /// The most recently published snapshot. Mode C callers must copy out
    /// anything they retain before the next `engine_update`.
    fn snapshot(&self) -> &Snapshot;

    fn dirty_set(&self) -> &DirtySet;
}

/// Per-frame snapshot sink. The bridge posts to this in Modes A/B and
/// calls it synchronously in Mode C. No rendering logic lives here;
/// `hyperion-sim` ships [`NullRenderConsumer`] for tests and the demo.
pub trait RenderConsumer {
    fn consume(&mut self, snapshot: &Snapshot, dirty_set: &DirtySet);
}

/// A `RenderConsumer` that discards every frame, used by tests and any
/// client that only cares about the simulation side of the pipeline.
#[derive(Debug, Default)]
pub struct NullRenderConsumer {
    frames_consumed: u64,
}

impl NullRenderConsumer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames_consumed(&self) -> u64 {
        self.frames_consumed
    }
}

impl RenderConsumer for NullRenderConsumer {
    fn consume(&mut self, _snapshot: &Snapshot, _dirty_set: &DirtySet) {
        self.frames_consumed += 1;
    }
}

/// In-process [`SimulationAbi`] implementation driving the per-entity SoA
/// arrays directly from decoded commands. Entities are stored densely,
/// indexed by their position in `entity_ids`; `SpawnEntity` appends a row,
/// `DespawnEntity` swap-removes it.
#[derive(Debug, Default)]
pub struct LocalSimulation {
    entity_ids: Vec<u32>,
    transforms: Vec<f32>,
    bounds: Vec<f32>,
    mesh_handles: Vec<u32>,
    primitive_kinds: Vec<u32>,
    texture_indices: Vec<u32>,
    prim_params: Vec<f32>,
    listener_position: [f32; 3],
    tick_count: u64,
    snapshot: Snapshot,
    dirty_set: DirtySet,
    dirty_rows: std::collections::BTreeSet<usize>,
}

impl LocalSimulation {
    #[must_use]
    pub fn new() -> Self {
        Self { snapshot: Snapshot::empty(0), ..Self::default() }
    }

    fn row_of(&self, entity_id: u32) -> Option<usize> {
        self.entity_ids.iter().position(|&id| id == entity_id)
    }

    fn spawn(&mut self, entity_id: u32) {
        if self.row_of(entity_id).is_some() {
            return;
        }
        let row = self.entity_ids.len();
        self.entity_ids.push(entity_id);
        self.transforms.extend(identity_transform());
        self.bounds.extend_from_slice(&[0.0, 0.0, 0.0, 0.0]);
        self.mesh_handles.push(0);
        self.primitive_kinds.push(0);
        self.texture_indices.push(0);
        self.prim_params.extend_from_slice(&[0.0; crate::snapshot::PRIM_PARAM_FLOATS]);
        self.dirty_rows.insert(row);
    }

    fn despawn(&mut self, entity_id: u32) {
        let Some(row) = self.row_of(entity_id) else { return };
        let last = self.entity_ids.len() - 1;
        self.entity_ids.swap_remove(row);
        swap_remove_block(&mut self.transforms, row, last, crate::snapshot::TRANSFORM_FLOATS);
        swap_remove_block(&mut self.bounds, row, last, crate::snapshot::BOUNDS_FLOATS);
        self.mesh_handles.swap_remove(row);
        self.primitive_kinds.swap_remove(row);
        self.texture_indices.swap_remove(row);
        swap_remove_block(&mut self.prim_params, row, last, crate::snapshot::PRIM_PARAM_FLOATS);
        self.dirty_rows.remove(&last);
        if row != last {
            self.dirty_rows.insert(row);
        }
    }

    fn apply(&mut self, command: hyperion_codec::Command) {
        use hyperion_codec::Command;
        match command {
            Command::Noop => {}
            Command::SpawnEntity { entity_id } => self.spawn(entity_id),
            Command::DespawnEntity { entity_id } => self.despawn(entity_id),
            Command::SetPosition { entity_id, x, y, z } => {
                if let Some(row) = self.row_of(entity_id) {
                    let base = row * crate::snapshot::TRANSFORM_FLOATS
                        + crate::snapshot::TRANSLATION_OFFSET;
                    self.transforms[base] = x;
                    self.transforms[base + 1] = y;
                    self.transforms[base + 2] = z;
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetScale { entity_id, x, y, z } => {
                if let Some(row) = self.row_of(entity_id) {
                    let base = row * crate::snapshot::TRANSFORM_FLOATS;
                    self.transforms[base] = x;
                    self.transforms[base + 5] = y;
                    self.transforms[base + 10] = z;
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetRotation { entity_id, .. } | Command::SetVelocity { entity_id, .. } => {
                if let Some(row) = self.row_of(entity_id) {
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetTextureLayer { entity_id, packed } => {
                if let Some(row) = self.row_of(entity_id) {
                    self.texture_indices[row] = packed;
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetMeshHandle { entity_id, handle } => {
                if let Some(row) = self.row_of(entity_id) {
                    self.mesh_handles[row] = handle;
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetRenderPrimitive { entity_id, primitive_kind } => {
                if let Some(row) = self.row_of(entity_id) {
                    self.primitive_kinds[row] = primitive_kind;
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetParent { entity_id, .. } => {
                if let Some(row) = self.row_of(entity_id) {
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetPrimParams0 { entity_id, p0, p1, p2, p3 } => {
                if let Some(row) = self.row_of(entity_id) {
                    let base = row * crate::snapshot::PRIM_PARAM_FLOATS;
                    self.prim_params[base..base + 4].copy_from_slice(&[p0, p1, p2, p3]);
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetPrimParams1 { entity_id, p4, p5, p6, p7 } => {
                if let Some(row) = self.row_of(entity_id) {
                    let base = row * crate::snapshot::PRIM_PARAM_FLOATS + 4;
                    self.prim_params[base..base + 4].copy_from_slice(&[p4, p5, p6, p7]);
                    self.dirty_rows.insert(row);
                }
            }
            Command::SetListenerPosition { x, y, z, .. } => {
                self.listener_position = [x, y, z];
            }
        }
    }
}

fn identity_transform() -> [f32; 16] {
    let mut m = [0.0; 16];
    m[0] = 1.0;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m
}

fn swap_remove_block(buffer: &mut Vec<f32>, row: usize, last_row: usize, width: usize) {
    if row != last_row {
        let (last_start, last_end) = (last_row * width, last_row * width + width);
        let last_block: Vec<f32> = buffer[last_start..last_end].to_vec();
        buffer[row * width..row * width + width].copy_from_slice(&last_block);
    }
    buffer.truncate(last_row * width);
}

impl SimulationAbi for LocalSimulation {
    fn engine_init(&mut self) {}

    fn engine_push_commands(&mut self, commands: &[hyperion_codec::Command]) {
        for &command in commands {
            self.apply(command);
        }
    }

    fn engine_update(&mut self, _dt: f32) {
        self.tick_count += 1;
        let entity_count = self.entity_ids.len();
        self.snapshot = Snapshot::new(
            entity_count,
            self.transforms.clone(),
            self.bounds.clone(),
            self.mesh_handles.clone(),
            self.primitive_kinds.clone(),
            self.texture_indices.clone(),
            self.prim_params.clone(),
            self.entity_ids.clone(),
            self.listener_position,
            self.tick_count,
        );

        let slots: Vec<u32> = self.dirty_rows.iter().map(|&row| row as u32).collect();
        let staging =
            slots.iter().map(|_| [0u32; crate::snapshot::STAGING_WORDS]).collect::<Vec<_>>();
        self.dirty_set = DirtySet { slots, staging };
        self.dirty_rows.clear();
    }

    fn engine_tick_count(&self) -> u64 {
        self.tick_count
    }

    fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn dirty_set(&self) -> &DirtySet {
        &self.dirty_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperion_codec::Command;

    #[test]
    fn spawn_then_tick_publishes_one_entity() {
        let mut sim = LocalSimulation::new();
        sim.engine_init();
        sim.engine_push_commands(&[Command::SpawnEntity { entity_id: 5 }]);
        sim.engine_update(1.0 / 60.0);

        assert_eq!(sim.engine_tick_count(), 1);
        assert_eq!(sim.snapshot().entity_count(), 1);
        assert_eq!(sim.snapshot().entity_ids, vec![5]);
        assert_eq!(sim.dirty_set().dirty_count(), 1);
    }

    #[test]
    fn set_position_then_tick_updates_translation() {
        let mut sim = LocalSimulation::new();
        sim.engine_push_commands(&[Command::SpawnEntity { entity_id: 1 }]);
        sim.engine_update(1.0 / 60.0);
        sim.engine_push_commands(&[Command::SetPosition { entity_id: 1, x: 1.0, y: 2.0, z: 3.0 }]);
        sim.engine_update(1.0 / 60.0);

        assert_eq!(&sim.snapshot().transforms[12..=14], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn despawn_removes_entity_via_swap_remove() {
        let mut sim = LocalSimulation::new();
        sim.engine_push_commands(&[
            Command::SpawnEntity { entity_id: 1 },
            Command::SpawnEntity { entity_id: 2 },
        ]);
        sim.engine_update(1.0 / 60.0);
        sim.engine_push_commands(&[Command::DespawnEntity { entity_id: 1 }]);
        sim.engine_update(1.0 / 60.0);

        assert_eq!(sim.snapshot().entity_ids, vec![2]);
    }

    #[test]
    fn tick_count_is_strictly_monotonic() {
        let mut sim = LocalSimulation::new();
        sim.engine_update(1.0 / 60.0);
        let first = sim.engine_tick_count();
        sim.engine_update(1.0 / 60.0);
        assert!(sim.engine_tick_count() > first);
    }

    #[test]
    fn null_render_consumer_counts_frames() {
        let mut consumer = NullRenderConsumer::new();
        let snapshot = Snapshot::empty(1);
        let dirty = DirtySet::empty();
        consumer.consume(&snapshot, &dirty);
        consumer.consume(&snapshot, &dirty);
        assert_eq!(consumer.frames_consumed(), 2);
    }
}
