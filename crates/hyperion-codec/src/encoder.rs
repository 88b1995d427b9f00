use crate::command::Command;
use crate::metrics::Metrics;
use hyperion_ring::RingBuffer;
use std::sync::Arc;

/// Bidirectional mapping from typed mutation calls to wire records.
///
/// Each method serializes `[type: u8][entityId: u32 LE][payload…]` and hands
/// it to the ring writer, returning the ring's boolean verbatim: `false`
/// means "did not fit right now", not an error.
///
/// Holds an `Arc<RingBuffer>` rather than a borrow so a single encoder can be
/// shared across the producer-side handle pool and, in Full/Partial
/// Isolation mode, handed to a worker thread alongside the consumer (the
/// ring is the one resource multiple threads touch, coordinated entirely
/// through its header's acquire/release protocol, not a lock).
#[derive(Clone)]
pub struct Encoder {
    ring: Arc<RingBuffer>,
    metrics: Arc<Metrics>,
}

impl Encoder {
    #[must_use]
    pub fn new(ring: Arc<RingBuffer>) -> Self {
        Self { ring, metrics: Arc::new(Metrics::new()) }
    }

    /// Direct access to the underlying ring, e.g. for the consumer side's
    /// `extract_unread` or header inspection.
    #[must_use]
    pub fn ring(&self) -> &Arc<RingBuffer> {
        &self.ring
    }

    /// Encode-path counters, shared across every clone of this `Encoder`.
    #[must_use]
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Records `accepted` against the shared counters and returns it
    /// unchanged; every write-issuing method below funnels through here.
    fn commit(&self, accepted: bool) -> bool {
        self.metrics.record_write(accepted);
        accepted
    }

    pub fn noop(&self) -> bool {
        self.commit(self.ring.write_command(0, 0, &[]))
    }

    pub fn spawn_entity(&self, entity_id: u32) -> bool {
        self.commit(self.ring.write_command(1, entity_id, &[]))
    }

    pub fn despawn_entity(&self, entity_id: u32) -> bool {
        self.commit(self.ring.write_command(2, entity_id, &[]))
    }

    pub fn set_position(&self, entity_id: u32, x: f32, y: f32, z: f32) -> bool {
        self.commit(self.ring.write_command(3, entity_id, &f32x3(x, y, z)))
    }

    pub fn set_rotation(&self, entity_id: u32, x: f32, y: f32, z: f32, w: f32) -> bool {
        self.commit(self.ring.write_command(4, entity_id, &f32x4(x, y, z, w)))
    }

    pub fn set_scale(&self, entity_id: u32, sx: f32, sy: f32, sz: f32) -> bool {
        self.commit(self.ring.write_command(5, entity_id, &f32x3(sx, sy, sz)))
    }

    pub fn set_velocity(&self, entity_id: u32, vx: f32, vy: f32, vz: f32) -> bool {
        self.commit(self.ring.write_command(6, entity_id, &f32x3(vx, vy, vz)))
    }

    pub fn set_texture_layer(&self, entity_id: u32, packed: u32) -> bool {
        self.commit(self.ring.write_command(7, entity_id, &packed.to_le_bytes()))
    }

    pub fn set_mesh_handle(&self, entity_id: u32, handle: u32) -> bool {
        self.commit(self.ring.write_command(8, entity_id, &handle.to_le_bytes()))
    }

    pub fn set_render_primitive(&self, entity_id: u32, primitive_kind: u32) -> bool {
        self.commit(self
            .ring
            .write_command(9, entity_id, &primitive_kind.to_le_bytes()))
    }

    /// `parent_id` of [`crate::NO_PARENT`] means "no parent".
    pub fn set_parent(&self, entity_id: u32, parent_id: u32) -> bool {
        self.commit(self.ring.write_command(10, entity_id, &parent_id.to_le_bytes()))
    }

    pub fn set_prim_params0(&self, entity_id: u32, p0: f32, p1: f32, p2: f32, p3: f32) -> bool {
        self.commit(self.ring.write_command(11, entity_id, &f32x4(p0, p1, p2, p3)))
    }

    pub fn set_prim_params1(&self, entity_id: u32, p4: f32, p5: f32, p6: f32, p7: f32) -> bool {
        self.commit(self.ring.write_command(12, entity_id, &f32x4(p4, p5, p6, p7)))
    }

    /// `entityId` is ignored by the simulation for this command; `0` is
    /// written on the wire.
    pub fn set_listener_position(&self, x: f32, y: f32, z: f32) -> bool {
        self.commit(self.ring.write_command(13, 0, &f32x3(x, y, z)))
    }

    /// Dispatches a previously decoded or queued [`Command`] through the
    /// matching typed method above. Used by `hyperion-queue` to replay
    /// parked commands without re-deriving the wire format at the call
    /// site.
    pub fn write(&self, command: Command) -> bool {
        match command {
            Command::Noop => self.noop(),
            Command::SpawnEntity { entity_id } => self.spawn_entity(entity_id),
            Command::DespawnEntity { entity_id } => self.despawn_entity(entity_id),
            Command::SetPosition { entity_id, x, y, z } => self.set_position(entity_id, x, y, z),
            Command::SetRotation { entity_id, x, y, z, w } => {
                self.set_rotation(entity_id, x, y, z, w)
            }
            Command::SetScale { entity_id, x, y, z } => self.set_scale(entity_id, x, y, z),
            Command::SetVelocity { entity_id, x, y, z } => self.set_velocity(entity_id, x, y, z),
            Command::SetTextureLayer { entity_id, packed } => {
                self.set_texture_layer(entity_id, packed)
            }
            Command::SetMeshHandle { entity_id, handle } => {
                self.set_mesh_handle(entity_id, handle)
            }
            Command::SetRenderPrimitive { entity_id, primitive_kind } => {
                self.set_render_primitive(entity_id, primitive_kind)
            }
            Command::SetParent { entity_id, parent_id } => self.set_parent(entity_id, parent_id),
            Command::SetPrimParams0 { entity_id, p0, p1, p2, p3 } => {
                self.set_prim_params0(entity_id, p0, p1, p2, p3)
            }
            Command::SetPrimParams1 { entity_id, p4, p5, p6, p7 } => {
                self.set_prim_params1(entity_id, p4, p5, p6, p7)
            }
            Command::SetListenerPosition { x, y, z, .. } => self.set_listener_position(x, y, z),
        }
    }

    /// Bytes available in the underlying ring right now.
    #[must_use]
    pub fn free_space(&self) -> usize {
        self.ring.free_space()
    }
}

fn f32x3(a: f32, b: f32, c: f32) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[0..4].copy_from_slice(&a.to_le_bytes());
    out[4..8].copy_from_slice(&b.to_le_bytes());
    out[8..12].copy_from_slice(&c.to_le_bytes());
    out
}

fn f32x4(a: f32, b: f32, c: f32, d: f32) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..4].copy_from_slice(&a.to_le_bytes());
    out[4..8].copy_from_slice(&b.to_le_bytes());
    out[8..12].copy_from_slice(&c.to_le_bytes());
    out[12..16].copy_from_slice(&d.to_le_bytes());
    out
}
