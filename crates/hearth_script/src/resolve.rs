//! Entity resolution
//!
//! Every internal call that touches an entity goes through [`resolve`]. The
//! result borrows the active scene and cannot outlive the call.

use std::cell::RefMut;

use hearth_core::scene::{Component, EntityId, EntityRef, Scene};

use crate::context::ScriptContext;
use crate::error::ContractViolation;

pub struct ResolvedEntity<'a> {
    scene: RefMut<'a, Scene>,
    id: EntityId,
}

pub fn resolve(
    context: &ScriptContext,
    id: EntityId,
) -> Result<ResolvedEntity<'_>, ContractViolation> {
    let scene = context.scene()?;
    if !scene.contains(id) {
        return Err(ContractViolation::UnknownEntity(id));
    }
    Ok(ResolvedEntity { scene, id })
}

impl<'a> ResolvedEntity<'a> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn view(&self) -> Result<EntityRef<'_>, ContractViolation> {
        self.scene
            .entity(self.id)
            .ok_or(ContractViolation::UnknownEntity(self.id))
    }

    pub fn component<T: Component>(&self) -> Result<&T, ContractViolation> {
        self.scene
            .get_component::<T>(self.id)
            .ok_or(ContractViolation::MissingComponent {
                entity: self.id,
                component: T::NAME,
            })
    }

    pub fn component_mut<T: Component>(&mut self) -> Result<&mut T, ContractViolation> {
        let id = self.id;
        self.scene
            .get_component_mut::<T>(id)
            .ok_or(ContractViolation::MissingComponent {
                entity: id,
                component: T::NAME,
            })
    }
}
