//! Explicit state every internal call runs against
//!
//! At most one scene is bound at a time. The scene lifecycle binds it on
//! runtime start and unbinds it on stop, both between simulation steps.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use hearth_core::scene::Scene;
use hearth_physics::Physics2D;
use hearth_services::{InputSource, LogSink};

use crate::error::ContractViolation;

/// The scene receiving script calls, and the physics world its bodies live in.
#[derive(Clone)]
pub struct SceneBinding {
    pub scene: Rc<RefCell<Scene>>,
    pub physics: Rc<RefCell<dyn Physics2D>>,
}

impl SceneBinding {
    pub fn new(scene: Rc<RefCell<Scene>>, physics: Rc<RefCell<dyn Physics2D>>) -> Self {
        Self { scene, physics }
    }
}

pub struct ScriptContext {
    scene: Option<SceneBinding>,
    input: Rc<RefCell<dyn InputSource>>,
    log: Rc<dyn LogSink>,
}

impl ScriptContext {
    pub fn new(input: Rc<RefCell<dyn InputSource>>, log: Rc<dyn LogSink>) -> Self {
        Self {
            scene: None,
            input,
            log,
        }
    }

    /// Bind `binding` as the active scene, replacing any previous one.
    pub fn activate(&mut self, binding: SceneBinding) {
        if self.scene.replace(binding).is_some() {
            tracing::warn!("activating a scene while another was still active");
        }
    }

    pub fn deactivate(&mut self) -> Option<SceneBinding> {
        self.scene.take()
    }

    pub fn is_active(&self) -> bool {
        self.scene.is_some()
    }

    fn binding(&self) -> Result<&SceneBinding, ContractViolation> {
        self.scene.as_ref().ok_or(ContractViolation::NoActiveScene)
    }

    /// Borrow the active scene for the duration of one call.
    pub fn scene(&self) -> Result<RefMut<'_, Scene>, ContractViolation> {
        self.binding()?
            .scene
            .try_borrow_mut()
            .map_err(|_| ContractViolation::SceneBusy)
    }

    pub fn physics(&self) -> Result<RefMut<'_, dyn Physics2D + 'static>, ContractViolation> {
        self.binding()?
            .physics
            .try_borrow_mut()
            .map_err(|_| ContractViolation::SceneBusy)
    }

    pub fn input(&self) -> Result<Ref<'_, dyn InputSource + 'static>, ContractViolation> {
        self.input
            .try_borrow()
            .map_err(|_| ContractViolation::InputBusy)
    }

    pub fn log(&self) -> &dyn LogSink {
        &*self.log
    }
}
