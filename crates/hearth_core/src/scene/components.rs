//! Component records
//!
//! Plain data. Field groups that cross the script boundary as vectors use glam
//! types so they can be copied out as raw bytes.

use glam::{Vec2, Vec3, Vec4};
use hearth_physics::{BodyHandle, BodyKind};

/// Entity name. Present on every entity and not part of the exposed set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagComponent {
    pub tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    pub translation: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformComponent {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRendererComponent {
    pub color: Vec4,
    pub tiling_factor: f32,
}

impl Default for SpriteRendererComponent {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            tiling_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleRendererComponent {
    pub color: Vec4,
    pub thickness: f32,
    pub fade: f32,
}

impl Default for CircleRendererComponent {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            thickness: 1.0,
            fade: 0.005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraComponent {
    pub primary: bool,
    pub fixed_aspect_ratio: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            primary: true,
            fixed_aspect_ratio: false,
        }
    }
}

/// Binds an entity to a managed script class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptComponent {
    pub class_name: String,
}

/// Motion type as scripts and the editor number it.
///
/// The numbering differs from [`BodyKind`]; conversions go through the
/// explicit `From` impls below, never through the discriminant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum BodyType {
    #[default]
    Static = 0,
    Dynamic = 1,
    Kinematic = 2,
}

impl BodyType {
    pub const ALL: [BodyType; 3] = [BodyType::Static, BodyType::Dynamic, BodyType::Kinematic];
}

impl From<BodyType> for BodyKind {
    fn from(body_type: BodyType) -> Self {
        match body_type {
            BodyType::Static => BodyKind::Static,
            BodyType::Dynamic => BodyKind::Dynamic,
            BodyType::Kinematic => BodyKind::Kinematic,
        }
    }
}

impl From<BodyKind> for BodyType {
    fn from(kind: BodyKind) -> Self {
        match kind {
            BodyKind::Static => BodyType::Static,
            BodyKind::Dynamic => BodyType::Dynamic,
            BodyKind::Kinematic => BodyType::Kinematic,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rigidbody2DComponent {
    pub body_type: BodyType,
    pub fixed_rotation: bool,
    /// Set while the physics runtime is running.
    pub runtime_body: Option<BodyHandle>,
}

impl Rigidbody2DComponent {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider2DComponent {
    pub offset: Vec2,
    /// Half extents before transform scale.
    pub size: Vec2,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub restitution_threshold: f32,
}

impl Default for BoxCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Vec2::splat(0.5),
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            restitution_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleCollider2DComponent {
    pub offset: Vec2,
    pub radius: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub restitution_threshold: f32,
}

impl Default for CircleCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            radius: 0.5,
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            restitution_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextComponent {
    pub text: String,
    pub color: Vec4,
    pub kerning: f32,
    pub line_spacing: f32,
}

impl Default for TextComponent {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Vec4::ONE,
            kerning: 0.0,
            line_spacing: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_type_mapping_is_bijective() {
        for body_type in BodyType::ALL {
            let kind = BodyKind::from(body_type);
            assert_eq!(BodyType::from(kind), body_type);
        }
        for kind in [BodyKind::Static, BodyKind::Kinematic, BodyKind::Dynamic] {
            assert_eq!(BodyKind::from(BodyType::from(kind)), kind);
        }
        // Same name, different discriminant.
        assert_eq!(BodyType::Dynamic as i32, 1);
        assert_eq!(BodyKind::Dynamic as i32, 2);
    }
}
