//! Scene storage
//!
//! Entities live in a creation-ordered list with a hash index on their
//! identity. Iteration and name lookup always follow creation order, so
//! duplicate names resolve to the oldest entity.

mod component;
mod components;
mod entity;
mod physics;

pub use component::{Component, ComponentId, ComponentKind, Components, ALL_COMPONENTS};
pub use components::*;
pub use entity::{EntityId, EntityMut, EntityRef};

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("entity id 0 is reserved")]
    ReservedId,
    #[error("entity {0} already exists")]
    DuplicateId(EntityId),
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
}

struct EntityRecord {
    id: EntityId,
    tag: TagComponent,
    components: Components,
}

impl EntityRecord {
    fn view(&self) -> EntityRef<'_> {
        EntityRef {
            id: self.id,
            tag: &self.tag,
            components: &self.components,
        }
    }

    fn view_mut(&mut self) -> EntityMut<'_> {
        EntityMut {
            id: self.id,
            tag: &mut self.tag,
            components: &mut self.components,
        }
    }
}

#[derive(Default)]
pub struct Scene {
    records: Vec<EntityRecord>,
    index: HashMap<EntityId, usize>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Create an entity with a fresh identity and a default transform.
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let id = loop {
            self.next_id += 1;
            let candidate = EntityId::from_raw(self.next_id);
            if !self.index.contains_key(&candidate) {
                break candidate;
            }
        };
        self.insert_record(id, name.into());
        id
    }

    /// Create an entity with a caller-chosen identity (scene loading).
    pub fn spawn_with_id(
        &mut self,
        id: EntityId,
        name: impl Into<String>,
    ) -> Result<EntityId, SceneError> {
        if id.is_none() {
            return Err(SceneError::ReservedId);
        }
        if self.index.contains_key(&id) {
            return Err(SceneError::DuplicateId(id));
        }
        self.insert_record(id, name.into());
        Ok(id)
    }

    fn insert_record(&mut self, id: EntityId, name: String) {
        let mut components = Components::default();
        components.transform = Some(TransformComponent::default());
        self.index.insert(id, self.records.len());
        self.records.push(EntityRecord {
            id,
            tag: TagComponent { tag: name },
            components,
        });
        tracing::trace!(entity = %id, "spawned entity");
    }

    pub fn despawn(&mut self, id: EntityId) -> Result<(), SceneError> {
        let position = self
            .index
            .remove(&id)
            .ok_or(SceneError::UnknownEntity(id))?;
        self.records.remove(position);
        for (offset, record) in self.records[position..].iter().enumerate() {
            self.index.insert(record.id, position + offset);
        }
        tracing::trace!(entity = %id, "despawned entity");
        Ok(())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<EntityRef<'_>> {
        let position = *self.index.get(&id)?;
        Some(self.records[position].view())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        let position = *self.index.get(&id)?;
        Some(self.records[position].view_mut())
    }

    /// Attach a component, replacing any existing instance of the kind.
    pub fn add_component<T: Component>(
        &mut self,
        id: EntityId,
        component: T,
    ) -> Result<&mut T, SceneError> {
        let position = *self.index.get(&id).ok_or(SceneError::UnknownEntity(id))?;
        let slot = T::slot_mut(&mut self.records[position].components);
        Ok(slot.insert(component))
    }

    pub fn remove_component<T: Component>(
        &mut self,
        id: EntityId,
    ) -> Result<Option<T>, SceneError> {
        let mut entity = self.entity_mut(id).ok_or(SceneError::UnknownEntity(id))?;
        Ok(entity.remove::<T>())
    }

    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entity(id)?.get::<T>()
    }

    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        let position = *self.index.get(&id)?;
        T::slot_mut(&mut self.records[position].components).as_mut()
    }

    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|entity| entity.has::<T>())
    }

    /// First entity in creation order whose name matches exactly.
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.records
            .iter()
            .find(|record| record.tag.tag == name)
            .map(|record| record.id)
    }

    /// All entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.records.iter().map(EntityRecord::view)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = EntityMut<'_>> {
        self.records.iter_mut().map(EntityRecord::view_mut)
    }
}
