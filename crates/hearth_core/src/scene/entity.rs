//! Entity identities and borrowed entity views

use std::fmt;

use super::component::{Component, Components};
use super::components::TagComponent;

/// Stable 64-bit entity identity.
///
/// Unique within a running scene and never reused while the entity lives.
/// Zero is reserved as the "no entity" sentinel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub const NONE: EntityId = EntityId(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of one entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    pub(crate) id: EntityId,
    pub(crate) tag: &'a TagComponent,
    pub(crate) components: &'a Components,
}

impl<'a> EntityRef<'a> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.tag.tag
    }

    pub fn has<T: Component>(&self) -> bool {
        T::slot(self.components).is_some()
    }

    pub fn get<T: Component>(&self) -> Option<&'a T> {
        T::slot(self.components).as_ref()
    }
}

/// Mutable view of one entity.
pub struct EntityMut<'a> {
    pub(crate) id: EntityId,
    pub(crate) tag: &'a mut TagComponent,
    pub(crate) components: &'a mut Components,
}

impl<'a> EntityMut<'a> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.tag.tag
    }

    pub fn has<T: Component>(&self) -> bool {
        T::slot(self.components).is_some()
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        T::slot(self.components).as_ref()
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        T::slot_mut(self.components).as_mut()
    }

    pub fn remove<T: Component>(&mut self) -> Option<T> {
        T::slot_mut(self.components).take()
    }

    pub fn view(&self) -> EntityRef<'_> {
        EntityRef {
            id: self.id,
            tag: self.tag,
            components: self.components,
        }
    }
}
