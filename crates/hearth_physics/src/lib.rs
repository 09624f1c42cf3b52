//! Hearth 2D Physics
//!
//! Small impulse-based rigid body world. Scenes own bodies through typed
//! [`BodyHandle`]s and everything outside this crate talks to bodies through
//! the [`Physics2D`] capability trait, never through the body storage itself.

mod body;
mod world;

pub use body::{Body, BodyDef, BodyKind};
pub use world::PhysicsWorld;

use glam::Vec2;
use thiserror::Error;

/// Handle to a body owned by a [`PhysicsWorld`].
///
/// Format mirrors entity handles: a slot index plus a generation that is
/// bumped whenever the slot is freed, so handles to destroyed bodies are
/// detected instead of aliasing a newer body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    #[error("body handle {0:?} does not refer to a live body")]
    StaleHandle(BodyHandle),
}

/// Operations the rest of the engine may perform on a simulated body.
///
/// The handle is borrowed for the duration of a single call; implementors
/// must reject handles that no longer refer to a live body.
pub trait Physics2D {
    fn apply_linear_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vec2,
        point: Vec2,
        wake: bool,
    ) -> Result<(), PhysicsError>;

    fn apply_linear_impulse_to_center(
        &mut self,
        body: BodyHandle,
        impulse: Vec2,
        wake: bool,
    ) -> Result<(), PhysicsError>;

    fn linear_velocity(&self, body: BodyHandle) -> Result<Vec2, PhysicsError>;

    fn body_kind(&self, body: BodyHandle) -> Result<BodyKind, PhysicsError>;

    fn set_body_kind(&mut self, body: BodyHandle, kind: BodyKind) -> Result<(), PhysicsError>;
}
