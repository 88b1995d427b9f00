use crate::error::HyperionError;
use crate::immediate::ImmediateOverrideMap;
use hyperion_codec::NO_PARENT;
use hyperion_queue::CommandProducer;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Default capacity of [`HandlePool`]'s free-list.
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleState {
    Alive,
    Destroyed,
}

/// A fluent, polymorphic-over-mutation mutator bound to one entity id
/// ("Fluent builder returning self" / "Disposable scope").
///
/// Pooled: [`HandlePool::release`] returns a destroyed handle to a bounded
/// free-list; [`HandlePool::acquire`] may hand the same allocation back out
/// rebound to a new id via [`EntityHandle::rebind`].
pub struct EntityHandle {
    id: u32,
    state: HandleState,
    producer: Arc<dyn CommandProducer>,
    data: HashMap<String, String>,
    immediate: Option<Rc<RefCell<ImmediateOverrideMap>>>,
}

impl EntityHandle {
    fn new(
        id: u32,
        producer: Arc<dyn CommandProducer>,
        immediate: Option<Rc<RefCell<ImmediateOverrideMap>>>,
    ) -> Self {
        Self { id, state: HandleState::Alive, producer, data: HashMap::new(), immediate }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state == HandleState::Alive
    }

    fn ensure_alive(&self) -> Result<(), HyperionError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(HyperionError::HandleDestroyed { entity_id: self.id })
        }
    }

    /// Arbitrary plugin-scoped data keyed by string, cleared on rebind.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer.write(hyperion_codec::Command::SetPosition { entity_id: self.id, x, y, z });
        Ok(self)
    }

    /// Writes `setPosition` as usual, then records the value in the
    /// immediate override map for zero-latency visual feedback.
    pub fn position_immediate(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, HyperionError> {
        self.set_position(x, y, z)?;
        if let Some(immediate) = &self.immediate {
            immediate.borrow_mut().set(self.id, x, y, z);
        }
        Ok(self)
    }

    pub fn clear_immediate(&mut self) -> &mut Self {
        if let Some(immediate) = &self.immediate {
            immediate.borrow_mut().clear(self.id);
        }
        self
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer.write(hyperion_codec::Command::SetRotation { entity_id: self.id, x, y, z, w });
        Ok(self)
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer.write(hyperion_codec::Command::SetScale { entity_id: self.id, x, y, z });
        Ok(self)
    }

    pub fn set_velocity(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer.write(hyperion_codec::Command::SetVelocity { entity_id: self.id, x, y, z });
        Ok(self)
    }

    pub fn set_texture_layer(&mut self, packed: u32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer.write(hyperion_codec::Command::SetTextureLayer { entity_id: self.id, packed });
        Ok(self)
    }

    pub fn set_mesh_handle(&mut self, handle: u32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer.write(hyperion_codec::Command::SetMeshHandle { entity_id: self.id, handle });
        Ok(self)
    }

    pub fn set_render_primitive(&mut self, primitive_kind: u32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer
            .write(hyperion_codec::Command::SetRenderPrimitive { entity_id: self.id, primitive_kind });
        Ok(self)
    }

    /// Writes `SetParent` with `parent_id`.
    pub fn parent(&mut self, parent_id: u32) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer.write(hyperion_codec::Command::SetParent { entity_id: self.id, parent_id });
        Ok(self)
    }

    /// Writes `SetParent` with the reserved "no parent" sentinel.
    pub fn unparent(&mut self) -> Result<&mut Self, HyperionError> {
        self.parent(NO_PARENT)
    }

    pub fn set_prim_params0(
        &mut self,
        p0: f32,
        p1: f32,
        p2: f32,
        p3: f32,
    ) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer
            .write(hyperion_codec::Command::SetPrimParams0 { entity_id: self.id, p0, p1, p2, p3 });
        Ok(self)
    }

    pub fn set_prim_params1(
        &mut self,
        p4: f32,
        p5: f32,
        p6: f32,
        p7: f32,
    ) -> Result<&mut Self, HyperionError> {
        self.ensure_alive()?;
        self.producer
            .write(hyperion_codec::Command::SetPrimParams1 { entity_id: self.id, p4, p5, p6, p7 });
        Ok(self)
    }

    /// Destroys the entity: emits `despawnEntity` and clears any immediate
    /// override. Idempotent: a second call on an already-destroyed handle
    /// is a no-op.
    pub fn destroy(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.producer.write(hyperion_codec::Command::DespawnEntity { entity_id: self.id });
        self.clear_immediate();
        self.state = HandleState::Destroyed;
    }

    /// Resets a destroyed handle to `alive` bound to `new_id`, clearing its
    /// plugin-data map and any stale immediate override.
    fn rebind(
        &mut self,
        new_id: u32,
        producer: Arc<dyn CommandProducer>,
        immediate: Option<Rc<RefCell<ImmediateOverrideMap>>>,
    ) {
        self.id = new_id;
        self.producer = producer;
        self.immediate = immediate;
        self.data.clear();
        self.state = HandleState::Alive;
        self.producer.write(hyperion_codec::Command::SpawnEntity { entity_id: new_id });
    }
}

/// A bounded pool of recyclable [`EntityHandle`]s.
pub struct HandlePool {
    capacity: usize,
    free_list: Vec<EntityHandle>,
}

impl HandlePool {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, free_list: Vec::new() }
    }

    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }

    /// Emits `spawnEntity(id)` and returns a live handle, reusing a pooled
    /// allocation if one is free.
    pub fn acquire(
        &mut self,
        id: u32,
        producer: Arc<dyn CommandProducer>,
        immediate: Option<Rc<RefCell<ImmediateOverrideMap>>>,
    ) -> EntityHandle {
        if let Some(mut recycled) = self.free_list.pop() {
            recycled.rebind(id, producer, immediate);
            recycled
        } else {
            producer.write(hyperion_codec::Command::SpawnEntity { entity_id: id });
            EntityHandle::new(id, producer, immediate)
        }
    }

    /// Destroys `handle` (if not already) and returns it to the free-list,
    /// subject to the bounded capacity; handles beyond capacity are simply
    /// dropped rather than recycled.
    pub fn release(&mut self, mut handle: EntityHandle) {
        handle.destroy();
        if self.free_list.len() < self.capacity {
            self.free_list.push(handle);
        }
    }

    #[must_use]
    pub fn pooled_count(&self) -> usize {
        self.free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    struct RecordingProducer {
        writes: StdRefCell<Vec<hyperion_codec::Command>>,
    }

    impl RecordingProducer {
        fn new() -> Arc<Self> {
            Arc::new(Self { writes: StdRefCell::new(Vec::new()) })
        }
    }

    impl CommandProducer for RecordingProducer {
        fn write(&self, command: hyperion_codec::Command) -> bool {
            self.writes.borrow_mut().push(command);
            true
        }

        fn free_space(&self) -> usize {
            usize::MAX
        }
    }

    #[test]
    fn acquire_emits_spawn_and_destroy_emits_despawn() {
        let producer = RecordingProducer::new();
        let mut pool = HandlePool::with_default_capacity();
        let mut handle = pool.acquire(1, producer.clone(), None);
        assert!(handle.is_alive());

        handle.destroy();
        assert!(!handle.is_alive());

        let writes = producer.writes.borrow();
        assert_eq!(writes[0], hyperion_codec::Command::SpawnEntity { entity_id: 1 });
        assert_eq!(writes[1], hyperion_codec::Command::DespawnEntity { entity_id: 1 });
    }

    #[test]
    fn destroy_is_idempotent() {
        let producer = RecordingProducer::new();
        let mut handle = EntityHandle::new(1, producer.clone(), None);
        handle.destroy();
        handle.destroy();
        assert_eq!(producer.writes.borrow().len(), 1);
    }

    #[test]
    fn mutator_on_destroyed_handle_fails() {
        let producer = RecordingProducer::new();
        let mut handle = EntityHandle::new(1, producer, None);
        handle.destroy();
        assert_eq!(
            handle.set_position(1.0, 2.0, 3.0).unwrap_err(),
            HyperionError::HandleDestroyed { entity_id: 1 }
        );
    }

    #[test]
    fn release_recycles_and_acquire_rebinds() {
        let producer = RecordingProducer::new();
        let mut pool = HandlePool::new(4);
        let handle = pool.acquire(1, producer.clone(), None);
        pool.release(handle);
        assert_eq!(pool.pooled_count(), 1);

        let rebound = pool.acquire(2, producer.clone(), None);
        assert_eq!(rebound.id(), 2);
        assert!(rebound.is_alive());
        assert_eq!(pool.pooled_count(), 0);
    }

    #[test]
    fn release_beyond_capacity_drops_the_handle() {
        let producer = RecordingProducer::new();
        let mut pool = HandlePool::new(1);
        let h1 = pool.acquire(1, producer.clone(), None);
        let h2 = pool.acquire(2, producer.clone(), None);
        pool.release(h1);
        pool.release(h2);
        assert_eq!(pool.pooled_count(), 1);
    }

    #[test]
    fn unparent_writes_no_parent_sentinel() {
        let producer = RecordingProducer::new();
        let mut handle = EntityHandle::new(1, producer.clone(), None);
        handle.unparent().unwrap();
        let writes = producer.writes.borrow();
        assert_eq!(
            writes.last().unwrap(),
            &hyperion_codec::Command::SetParent { entity_id: 1, parent_id: NO_PARENT }
        );
    }
}
