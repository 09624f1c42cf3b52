//! Capability registry
//!
//! Maps managed component classes, found by reflection in the loaded core
//! assembly, to the native presence predicate of the matching component kind.
//! Rebuilt from scratch on every assembly load.

use std::collections::HashMap;

use hearth_core::scene::{ComponentKind, EntityRef, ALL_COMPONENTS};

use crate::error::ContractViolation;
use crate::host::ScriptHost;
use crate::value::{AssemblyId, ManagedType};

/// Outcome of one registry build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub registered: Vec<&'static str>,
    /// Fully qualified managed names that did not resolve.
    pub missing: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    assembly: Option<AssemblyId>,
    entries: HashMap<ManagedType, &'static ComponentKind>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild against `image`. Kinds whose managed class is missing are
    /// logged and skipped; the rest still register.
    pub fn register(
        &mut self,
        host: &mut dyn ScriptHost,
        image: AssemblyId,
        namespace: &str,
    ) -> RegistrationReport {
        self.clear();

        let mut entries = HashMap::with_capacity(ALL_COMPONENTS.len());
        let mut report = RegistrationReport::default();
        for kind in ALL_COMPONENTS {
            let managed_name = format!("{namespace}.{}", kind.name);
            match host.resolve_type(image, &managed_name) {
                Some(managed_type) => {
                    entries.insert(managed_type, kind);
                    report.registered.push(kind.name);
                }
                None => {
                    tracing::error!(
                        component = kind.name,
                        "Could not find component type {managed_name}"
                    );
                    report.missing.push(managed_name);
                }
            }
        }

        self.entries = entries;
        self.assembly = Some(image);
        tracing::debug!(
            assembly = image.0,
            registered = report.registered.len(),
            missing = report.missing.len(),
            "component registry built"
        );
        report
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.assembly = None;
    }

    /// Assembly the current entries were built from.
    pub fn assembly(&self) -> Option<AssemblyId> {
        self.assembly
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, managed_type: ManagedType) -> Option<&'static ComponentKind> {
        self.entries.get(&managed_type).copied()
    }

    /// Does `entity` have the component mirrored by `managed_type`?
    pub fn query(
        &self,
        managed_type: ManagedType,
        entity: &EntityRef<'_>,
    ) -> Result<bool, ContractViolation> {
        let kind = self
            .lookup(managed_type)
            .ok_or(ContractViolation::UnregisteredType(managed_type))?;
        Ok((kind.has)(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManagedDomain;
    use hearth_core::scene::{
        Component, Rigidbody2DComponent, Scene, TextComponent, TransformComponent,
    };

    const CORE_TYPES: &[&str] = &[
        "Hearth.TransformComponent",
        "Hearth.CircleRendererComponent",
        "Hearth.Rigidbody2DComponent",
        "Hearth.TextComponent",
        "Hearth.Entity",
    ];

    fn query_all(
        registry: &ComponentRegistry,
        domain: &ManagedDomain,
        image: AssemblyId,
        scene: &Scene,
    ) -> Vec<Option<bool>> {
        let mut results = Vec::new();
        for entity in scene.iter() {
            for kind in ALL_COMPONENTS {
                let token = domain.type_token(image, &format!("Hearth.{}", kind.name));
                let result = token
                    .and_then(|token| domain.type_from_token(token))
                    .map(|ty| registry.query(ty, &entity).unwrap());
                results.push(result);
            }
        }
        results
    }

    fn populated_scene() -> Scene {
        let mut scene = Scene::new();
        let player = scene.spawn("Player");
        scene.add_component(player, Rigidbody2DComponent::default()).unwrap();
        let label = scene.spawn("Label");
        scene.add_component(label, TextComponent::default()).unwrap();
        scene.remove_component::<TransformComponent>(label).unwrap();
        scene
    }

    #[test]
    fn partial_assembly_registers_what_it_can() {
        let mut domain = ManagedDomain::new();
        let image = domain.load_assembly("Hearth-ScriptCore", CORE_TYPES);
        let mut registry = ComponentRegistry::new();

        let report = registry.register(&mut domain, image, "Hearth");

        assert_eq!(
            report.registered,
            vec![
                TransformComponent::NAME,
                "CircleRendererComponent",
                Rigidbody2DComponent::NAME,
                TextComponent::NAME
            ]
        );
        assert_eq!(report.missing.len(), ALL_COMPONENTS.len() - 4);
        assert!(report.missing.contains(&"Hearth.CameraComponent".to_string()));
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.assembly(), Some(image));
    }

    #[test]
    fn queries_agree_with_scene_presence() {
        let mut domain = ManagedDomain::new();
        let image = domain.load_assembly("Hearth-ScriptCore", CORE_TYPES);
        let mut registry = ComponentRegistry::new();
        registry.register(&mut domain, image, "Hearth");

        let scene = populated_scene();
        for entity in scene.iter() {
            for kind in ALL_COMPONENTS {
                let name = format!("Hearth.{}", kind.name);
                let Some(ty) = domain.resolve_type_name(image, &name) else {
                    continue;
                };
                assert_eq!(registry.query(ty, &entity), Ok((kind.has)(&entity)), "{}", kind.name);
            }
        }
    }

    #[test]
    fn registering_twice_is_idempotent() {
        let mut domain = ManagedDomain::new();
        let image = domain.load_assembly("Hearth-ScriptCore", CORE_TYPES);
        let scene = populated_scene();
        let mut registry = ComponentRegistry::new();

        let first_report = registry.register(&mut domain, image, "Hearth");
        let first = query_all(&registry, &domain, image, &scene);
        let second_report = registry.register(&mut domain, image, "Hearth");
        let second = query_all(&registry, &domain, image, &scene);

        assert_eq!(first_report, second_report);
        assert_eq!(first, second);
    }

    #[test]
    fn unregistered_type_is_a_violation() {
        let mut domain = ManagedDomain::new();
        let image = domain.load_assembly("Hearth-ScriptCore", CORE_TYPES);
        let mut registry = ComponentRegistry::new();
        registry.register(&mut domain, image, "Hearth");

        let entity_type = domain.resolve_type_name(image, "Hearth.Entity").unwrap();
        let scene = populated_scene();
        let entity = scene.iter().next().unwrap();
        assert_eq!(
            registry.query(entity_type, &entity),
            Err(ContractViolation::UnregisteredType(entity_type))
        );
    }

    #[test]
    fn reload_drops_stale_identities() {
        let mut domain = ManagedDomain::new();
        let image = domain.load_assembly("Hearth-ScriptCore", CORE_TYPES);
        let mut registry = ComponentRegistry::new();
        registry.register(&mut domain, image, "Hearth");
        let old_transform = domain.resolve_type_name(image, "Hearth.TransformComponent").unwrap();

        let reloaded = domain.reload_assembly(image).unwrap();
        registry.register(&mut domain, reloaded, "Hearth");
        let new_transform = domain
            .resolve_type_name(reloaded, "Hearth.TransformComponent")
            .unwrap();

        assert_ne!(old_transform, new_transform);
        assert!(registry.lookup(old_transform).is_none());
        assert_eq!(registry.lookup(new_transform).unwrap().name, "TransformComponent");
        assert_eq!(registry.assembly(), Some(reloaded));
    }
}
