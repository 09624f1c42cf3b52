use glam::Vec2;

/// Motion type as the physics engine numbers it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum BodyKind {
    #[default]
    Static = 0,
    Kinematic = 1,
    Dynamic = 2,
}

/// Construction parameters for a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub fixed_rotation: bool,
    /// Mass contributed by attached shapes. Zero means "no shapes".
    pub mass: f32,
    /// Rotational inertia about the center of mass.
    pub inertia: f32,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            kind: BodyKind::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            fixed_rotation: false,
            mass: 0.0,
            inertia: 0.0,
        }
    }
}

/// Simulated rigid body state.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    kind: BodyKind,
    pub(crate) position: Vec2,
    pub(crate) angle: f32,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: f32,
    pub(crate) awake: bool,
    fixed_rotation: bool,
    shape_mass: f32,
    shape_inertia: f32,
    inv_mass: f32,
    inv_inertia: f32,
}

impl Body {
    pub(crate) fn new(def: &BodyDef) -> Self {
        let mut body = Self {
            kind: def.kind,
            position: def.position,
            angle: def.angle,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            awake: true,
            fixed_rotation: def.fixed_rotation,
            shape_mass: def.mass,
            shape_inertia: def.inertia,
            inv_mass: 0.0,
            inv_inertia: 0.0,
        };
        body.reset_mass_data();
        body
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 {
            1.0 / self.inv_mass
        } else {
            0.0
        }
    }

    pub(crate) fn set_awake(&mut self, awake: bool) {
        if !awake {
            self.linear_velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
        }
        self.awake = awake;
    }

    pub(crate) fn apply_impulse(&mut self, impulse: Vec2, point: Option<Vec2>, wake: bool) {
        if self.kind != BodyKind::Dynamic {
            return;
        }
        if wake && !self.awake {
            self.set_awake(true);
        }
        if !self.awake {
            return;
        }
        self.linear_velocity += self.inv_mass * impulse;
        if let Some(point) = point {
            self.angular_velocity += self.inv_inertia * (point - self.position).perp_dot(impulse);
        }
    }

    pub(crate) fn set_kind(&mut self, kind: BodyKind) {
        if self.kind == kind {
            return;
        }
        self.kind = kind;
        self.reset_mass_data();
        if kind == BodyKind::Static {
            self.linear_velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
        }
        self.set_awake(true);
    }

    // Static and kinematic bodies behave as infinitely heavy. A dynamic body
    // without shapes still gets unit mass so impulses have a defined effect.
    fn reset_mass_data(&mut self) {
        if self.kind != BodyKind::Dynamic {
            self.inv_mass = 0.0;
            self.inv_inertia = 0.0;
            return;
        }
        let mass = if self.shape_mass > 0.0 { self.shape_mass } else { 1.0 };
        self.inv_mass = 1.0 / mass;
        self.inv_inertia = if self.shape_inertia > 0.0 && !self.fixed_rotation {
            1.0 / self.shape_inertia
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic(mass: f32, inertia: f32) -> Body {
        Body::new(&BodyDef {
            kind: BodyKind::Dynamic,
            mass,
            inertia,
            ..Default::default()
        })
    }

    #[test]
    fn shapeless_dynamic_body_has_unit_mass() {
        assert_eq!(dynamic(0.0, 0.0).mass(), 1.0);
        assert_eq!(dynamic(4.0, 0.0).mass(), 4.0);
    }

    #[test]
    fn impulse_scales_by_inverse_mass() {
        let mut body = dynamic(2.0, 0.0);
        body.apply_impulse(Vec2::new(4.0, -2.0), None, true);
        assert_eq!(body.linear_velocity(), Vec2::new(2.0, -1.0));
    }

    #[test]
    fn off_center_impulse_spins_body() {
        let mut body = dynamic(1.0, 0.5);
        body.apply_impulse(Vec2::new(0.0, 1.0), Some(Vec2::new(1.0, 0.0)), true);
        assert_eq!(body.angular_velocity(), 2.0);
    }

    #[test]
    fn static_body_ignores_impulses() {
        let mut body = Body::new(&BodyDef::default());
        body.apply_impulse(Vec2::ONE, None, true);
        assert_eq!(body.linear_velocity(), Vec2::ZERO);
    }

    #[test]
    fn sleeping_body_needs_wake_flag() {
        let mut body = dynamic(1.0, 0.0);
        body.set_awake(false);
        body.apply_impulse(Vec2::X, None, false);
        assert_eq!(body.linear_velocity(), Vec2::ZERO);
        assert!(!body.is_awake());

        body.apply_impulse(Vec2::X, None, true);
        assert!(body.is_awake());
        assert_eq!(body.linear_velocity(), Vec2::X);
    }

    #[test]
    fn switching_to_static_zeroes_velocity() {
        let mut body = dynamic(1.0, 0.0);
        body.apply_impulse(Vec2::ONE, None, true);
        body.set_kind(BodyKind::Static);
        assert_eq!(body.linear_velocity(), Vec2::ZERO);
        assert_eq!(body.mass(), 0.0);
    }
}
