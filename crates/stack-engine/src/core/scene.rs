use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Flat entity storage kept sorted by id, so lookups are a binary search.
/// Ids come from `EngineContext::next_id`, which only grows, so spawning is
/// normally a push.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(128),
        }
    }

    fn index_of(&self, id: EntityId) -> Result<usize, usize> {
        self.entities.binary_search_by_key(&id, |e| e.id)
    }

    /// Add an entity. An entity already using the same id is replaced.
    pub fn spawn(&mut self, entity: Entity) {
        match self.index_of(entity.id) {
            Ok(idx) => self.entities[idx] = entity,
            Err(idx) => self.entities.insert(idx, entity),
        }
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.index_of(id).ok()?;
        Some(self.entities.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let idx = self.index_of(id).ok()?;
        self.entities.get(idx)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let idx = self.index_of(id).ok()?;
        self.entities.get_mut(idx)
    }

    /// Entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
