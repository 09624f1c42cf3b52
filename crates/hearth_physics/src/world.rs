use glam::Vec2;

use crate::{Body, BodyDef, BodyHandle, BodyKind, Physics2D, PhysicsError};

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Owns every simulated body. Freed slots are recycled with a bumped
/// generation so old handles stop resolving.
pub struct PhysicsWorld {
    gravity: Vec2,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn body_count(&self) -> usize {
        self.live
    }

    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        self.live += 1;
        let body = Body::new(def);
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.body = Some(body);
                BodyHandle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(body),
                });
                BodyHandle::new(index, 0)
            }
        };
        tracing::debug!(?handle, kind = ?def.kind, live = self.live, "created body");
        handle
    }

    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        let slot = self
            .slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation() && slot.body.is_some())
            .ok_or_else(|| stale(handle))?;
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.live -= 1;
        tracing::debug!(?handle, live = self.live, "destroyed body");
        Ok(())
    }

    pub fn body(&self, handle: BodyHandle) -> Result<&Body, PhysicsError> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.body.as_ref())
            .ok_or_else(|| stale(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, PhysicsError> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.body.as_mut())
            .ok_or_else(|| stale(handle))
    }

    pub fn set_awake(&mut self, handle: BodyHandle, awake: bool) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.set_awake(awake);
        Ok(())
    }

    /// Advance the simulation by `dt` seconds (semi-implicit Euler).
    pub fn step(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.slots.iter_mut().filter_map(|slot| slot.body.as_mut()) {
            if !body.awake {
                continue;
            }
            match body.kind() {
                BodyKind::Static => {}
                BodyKind::Kinematic => {
                    body.position += body.linear_velocity * dt;
                    body.angle += body.angular_velocity * dt;
                }
                BodyKind::Dynamic => {
                    body.linear_velocity += gravity * dt;
                    body.position += body.linear_velocity * dt;
                    body.angle += body.angular_velocity * dt;
                }
            }
        }
    }
}

fn stale(handle: BodyHandle) -> PhysicsError {
    tracing::warn!(?handle, "rejected stale body handle");
    PhysicsError::StaleHandle(handle)
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -9.8))
    }
}

impl Physics2D for PhysicsWorld {
    fn apply_linear_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vec2,
        point: Vec2,
        wake: bool,
    ) -> Result<(), PhysicsError> {
        self.body_mut(body)?.apply_impulse(impulse, Some(point), wake);
        Ok(())
    }

    fn apply_linear_impulse_to_center(
        &mut self,
        body: BodyHandle,
        impulse: Vec2,
        wake: bool,
    ) -> Result<(), PhysicsError> {
        self.body_mut(body)?.apply_impulse(impulse, None, wake);
        Ok(())
    }

    fn linear_velocity(&self, body: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(self.body(body)?.linear_velocity())
    }

    fn body_kind(&self, body: BodyHandle) -> Result<BodyKind, PhysicsError> {
        Ok(self.body(body)?.kind())
    }

    fn set_body_kind(&mut self, body: BodyHandle, kind: BodyKind) -> Result<(), PhysicsError> {
        self.body_mut(body)?.set_kind(kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_at(y: f32) -> BodyDef {
        BodyDef {
            kind: BodyKind::Dynamic,
            position: Vec2::new(0.0, y),
            ..Default::default()
        }
    }

    #[test]
    fn destroyed_handles_go_stale() {
        let mut world = PhysicsWorld::default();
        let a = world.create_body(&dynamic_at(0.0));
        world.destroy_body(a).unwrap();

        assert_eq!(world.body(a).unwrap_err(), PhysicsError::StaleHandle(a));
        assert!(world.destroy_body(a).is_err());

        // Slot is reused with a new generation.
        let b = world.create_body(&dynamic_at(1.0));
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(world.linear_velocity(a).is_err());
        assert!(world.linear_velocity(b).is_ok());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn rejected_destroy_leaves_the_free_list_alone() {
        let mut world = PhysicsWorld::default();
        let a = world.create_body(&dynamic_at(0.0));
        world.destroy_body(a).unwrap();
        assert_eq!(world.destroy_body(a), Err(PhysicsError::StaleHandle(a)));

        let b = world.create_body(&dynamic_at(1.0));
        let c = world.create_body(&dynamic_at(2.0));
        assert_eq!(b.index(), a.index());
        assert_ne!(c.index(), b.index());
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn gravity_only_moves_dynamic_bodies() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));
        let falling = world.create_body(&dynamic_at(5.0));
        let ground = world.create_body(&BodyDef::default());

        world.step(0.5);

        assert_eq!(world.linear_velocity(falling).unwrap(), Vec2::new(0.0, -5.0));
        assert_eq!(world.body(falling).unwrap().position(), Vec2::new(0.0, 2.5));
        assert_eq!(world.body(ground).unwrap().position(), Vec2::ZERO);
    }

    #[test]
    fn kinematic_bodies_keep_velocity() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));
        let body = world.create_body(&dynamic_at(0.0));
        world
            .apply_linear_impulse_to_center(body, Vec2::new(2.0, 0.0), true)
            .unwrap();
        world.set_body_kind(body, BodyKind::Kinematic).unwrap();

        world.step(1.0);

        assert_eq!(world.body_kind(body).unwrap(), BodyKind::Kinematic);
        assert_eq!(world.linear_velocity(body).unwrap(), Vec2::new(2.0, 0.0));
        assert_eq!(world.body(body).unwrap().position(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn sleeping_bodies_do_not_integrate() {
        let mut world = PhysicsWorld::default();
        let body = world.create_body(&dynamic_at(3.0));
        world.set_awake(body, false).unwrap();
        world.step(1.0);
        assert_eq!(world.body(body).unwrap().position(), Vec2::new(0.0, 3.0));
    }
}
