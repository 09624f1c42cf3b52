//! Scene half of the physics runtime
//!
//! Creates a body for each rigidbody when the runtime starts, copies body
//! poses back into transforms after each step and releases bodies on stop.

use std::f32::consts::PI;

use glam::Vec2;
use hearth_physics::{BodyDef, PhysicsWorld};

use super::{
    BoxCollider2DComponent, CircleCollider2DComponent, EntityMut, Rigidbody2DComponent, Scene,
    TransformComponent,
};

/// Mass and rotational inertia from the entity's colliders.
fn mass_properties(entity: &EntityMut<'_>, scale: Vec2) -> (f32, f32) {
    let mut mass = 0.0;
    let mut inertia = 0.0;

    if let Some(collider) = entity.get::<BoxCollider2DComponent>() {
        let half = collider.size * scale.abs();
        let m = collider.density * 4.0 * half.x * half.y;
        mass += m;
        inertia +=
            m * (half.x * half.x + half.y * half.y) / 3.0 + m * collider.offset.length_squared();
    }

    if let Some(collider) = entity.get::<CircleCollider2DComponent>() {
        let radius = collider.radius * scale.x.abs();
        let m = collider.density * PI * radius * radius;
        mass += m;
        inertia += 0.5 * m * radius * radius + m * collider.offset.length_squared();
    }

    (mass, inertia)
}

impl Scene {
    /// Create bodies for every rigidbody and store their handles.
    pub fn on_physics_start(&mut self, world: &mut PhysicsWorld) {
        let mut created = 0usize;
        for mut entity in self.iter_mut() {
            let Some(rigidbody) = entity.get::<Rigidbody2DComponent>().copied() else {
                continue;
            };
            let transform = entity.get::<TransformComponent>().copied().unwrap_or_default();
            let (mass, inertia) = mass_properties(&entity, transform.scale.truncate());

            let handle = world.create_body(&BodyDef {
                kind: rigidbody.body_type.into(),
                position: transform.translation.truncate(),
                angle: transform.rotation.z,
                fixed_rotation: rigidbody.fixed_rotation,
                mass,
                inertia,
            });
            if let Some(rigidbody) = entity.get_mut::<Rigidbody2DComponent>() {
                rigidbody.runtime_body = Some(handle);
            }
            created += 1;
        }
        tracing::debug!(bodies = created, "physics runtime started");
    }

    /// Copy simulated positions and angles back into transforms.
    pub fn sync_physics(&mut self, world: &PhysicsWorld) {
        for mut entity in self.iter_mut() {
            let Some(handle) = entity
                .get::<Rigidbody2DComponent>()
                .and_then(|rigidbody| rigidbody.runtime_body)
            else {
                continue;
            };
            let Ok(body) = world.body(handle) else {
                tracing::warn!(entity = %entity.id(), "rigidbody refers to a destroyed body");
                continue;
            };
            let (position, angle) = (body.position(), body.angle());
            if let Some(transform) = entity.get_mut::<TransformComponent>() {
                transform.translation.x = position.x;
                transform.translation.y = position.y;
                transform.rotation.z = angle;
            }
        }
    }

    /// Destroy every runtime body and clear the stored handles.
    pub fn on_physics_stop(&mut self, world: &mut PhysicsWorld) {
        for mut entity in self.iter_mut() {
            let Some(rigidbody) = entity.get_mut::<Rigidbody2DComponent>() else {
                continue;
            };
            if let Some(handle) = rigidbody.runtime_body.take() {
                if let Err(err) = world.destroy_body(handle) {
                    tracing::warn!(error = %err, "failed to destroy body");
                }
            }
        }
        tracing::debug!("physics runtime stopped");
    }
}
