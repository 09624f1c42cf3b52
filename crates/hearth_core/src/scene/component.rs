// component.rs - The closed component set
//
// Every component kind is known at compile time. Kinds are identified by a
// small integer ID and a name; the name doubles as the managed class name the
// script side mirrors the component with.

use super::components::*;
use super::entity::EntityRef;

pub type ComponentId = u32;

/// Per-entity component storage: zero or one instance of each kind.
#[derive(Debug, Clone, Default)]
pub struct Components {
    pub(crate) transform: Option<TransformComponent>,
    pub(crate) sprite_renderer: Option<SpriteRendererComponent>,
    pub(crate) circle_renderer: Option<CircleRendererComponent>,
    pub(crate) camera: Option<CameraComponent>,
    pub(crate) script: Option<ScriptComponent>,
    pub(crate) rigidbody_2d: Option<Rigidbody2DComponent>,
    pub(crate) box_collider_2d: Option<BoxCollider2DComponent>,
    pub(crate) circle_collider_2d: Option<CircleCollider2DComponent>,
    pub(crate) text: Option<TextComponent>,
}

/// Trait implemented by each kind of the closed component set.
///
/// Use [`define_component!`](crate::define_component) rather than
/// implementing this by hand.
pub trait Component: 'static + Sized {
    /// Stable component ID.
    const ID: ComponentId;

    /// Record name, also the unqualified managed class name.
    const NAME: &'static str;

    #[doc(hidden)]
    fn slot(components: &Components) -> &Option<Self>;

    #[doc(hidden)]
    fn slot_mut(components: &mut Components) -> &mut Option<Self>;
}

/// Helper macro to implement [`Component`] over a storage slot.
///
/// # Example
/// ```ignore
/// define_component!(TransformComponent, 0, "TransformComponent", transform);
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty, $id:expr, $name:expr, $slot:ident) => {
        impl $crate::scene::Component for $ty {
            const ID: $crate::scene::ComponentId = $id;
            const NAME: &'static str = $name;

            fn slot(components: &$crate::scene::Components) -> &Option<Self> {
                &components.$slot
            }

            fn slot_mut(components: &mut $crate::scene::Components) -> &mut Option<Self> {
                &mut components.$slot
            }
        }
    };
}

define_component!(TransformComponent, 0, "TransformComponent", transform);
define_component!(SpriteRendererComponent, 1, "SpriteRendererComponent", sprite_renderer);
define_component!(CircleRendererComponent, 2, "CircleRendererComponent", circle_renderer);
define_component!(CameraComponent, 3, "CameraComponent", camera);
define_component!(ScriptComponent, 4, "ScriptComponent", script);
define_component!(Rigidbody2DComponent, 5, "Rigidbody2DComponent", rigidbody_2d);
define_component!(BoxCollider2DComponent, 6, "BoxCollider2DComponent", box_collider_2d);
define_component!(CircleCollider2DComponent, 7, "CircleCollider2DComponent", circle_collider_2d);
define_component!(TextComponent, 8, "TextComponent", text);

/// Type-erased description of a component kind.
#[derive(Debug, Clone, Copy)]
pub struct ComponentKind {
    pub id: ComponentId,
    pub name: &'static str,
    /// Presence predicate for this kind.
    pub has: fn(&EntityRef<'_>) -> bool,
}

impl ComponentKind {
    pub const fn of<T: Component>() -> Self {
        Self {
            id: T::ID,
            name: T::NAME,
            has: has_component::<T>,
        }
    }
}

fn has_component<T: Component>(entity: &EntityRef<'_>) -> bool {
    entity.has::<T>()
}

/// Every component kind, in declaration order.
pub static ALL_COMPONENTS: &[ComponentKind] = &[
    ComponentKind::of::<TransformComponent>(),
    ComponentKind::of::<SpriteRendererComponent>(),
    ComponentKind::of::<CircleRendererComponent>(),
    ComponentKind::of::<CameraComponent>(),
    ComponentKind::of::<ScriptComponent>(),
    ComponentKind::of::<Rigidbody2DComponent>(),
    ComponentKind::of::<BoxCollider2DComponent>(),
    ComponentKind::of::<CircleCollider2DComponent>(),
    ComponentKind::of::<TextComponent>(),
];
