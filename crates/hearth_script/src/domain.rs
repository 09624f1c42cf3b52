//! In-process managed domain
//!
//! A small managed runtime with the same observable contract as a real one:
//! a UTF-16 string heap, assembly images reflected by class name, hot reload
//! that hands out fresh type identities, type tokens, object instances bound
//! to entities, and internal-call dispatch by qualified name. Tools and tests
//! drive the bridge through it without embedding a script VM.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use hearth_core::scene::EntityId;
use thiserror::Error;

use crate::engine::ScriptEngine;
use crate::error::{ContractViolation, InteropError};
use crate::glue::InternalCall;
use crate::host::{ScriptHost, Utf8Buffer};
use crate::value::{AssemblyId, ManagedString, ManagedType, ObjectRef, ScriptValue, TypeToken};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("assembly {0:?} is not loaded")]
    AssemblyNotLoaded(AssemblyId),
}

struct Assembly {
    name: String,
    loaded: bool,
    types: HashMap<String, ManagedType>,
}

/// A managed object created for an entity's script component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObject {
    pub class_name: String,
    pub entity: EntityId,
}

/// One managed domain, alive for a single tool run or test.
///
/// Strings are never collected: every handle stays valid until the domain
/// is dropped, and the heap is freed with it.
#[derive(Default)]
pub struct ManagedDomain {
    internal_calls: HashMap<String, &'static InternalCall>,
    /// Append-only string heap indexed by [`ManagedString`].
    strings: Vec<Vec<u16>>,
    assemblies: Vec<Assembly>,
    next_type: u32,
    objects: Vec<ManagedObject>,
    instances: HashMap<EntityId, ObjectRef>,
    live_buffers: Rc<Cell<usize>>,
}

impl ManagedDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an assembly defining the given fully qualified class names.
    pub fn load_assembly(&mut self, name: &str, type_names: &[&str]) -> AssemblyId {
        let types = type_names
            .iter()
            .map(|type_name| {
                self.next_type += 1;
                (type_name.to_string(), ManagedType(self.next_type))
            })
            .collect();
        let id = AssemblyId(self.assemblies.len() as u32);
        self.assemblies.push(Assembly {
            name: name.to_owned(),
            loaded: true,
            types,
        });
        tracing::debug!(assembly = name, id = id.0, "loaded assembly");
        id
    }

    /// Unload `image` and load the same classes again under new identities.
    pub fn reload_assembly(&mut self, image: AssemblyId) -> Result<AssemblyId, DomainError> {
        let assembly = self
            .assemblies
            .get_mut(image.0 as usize)
            .filter(|assembly| assembly.loaded)
            .ok_or(DomainError::AssemblyNotLoaded(image))?;
        assembly.loaded = false;
        let name = assembly.name.clone();
        let mut type_names: Vec<String> = assembly.types.keys().cloned().collect();
        type_names.sort();

        self.objects.clear();
        self.instances.clear();
        let names: Vec<&str> = type_names.iter().map(String::as_str).collect();
        Ok(self.load_assembly(&name, &names))
    }

    fn loaded(&self, image: AssemblyId) -> Option<&Assembly> {
        self.assemblies
            .get(image.0 as usize)
            .filter(|assembly| assembly.loaded)
    }

    /// Reflection lookup without going through the host interface.
    pub fn resolve_type_name(&self, image: AssemblyId, full_name: &str) -> Option<ManagedType> {
        self.loaded(image)?.types.get(full_name).copied()
    }

    /// What `typeof(T)` evaluates to in managed code.
    pub fn type_token(&self, image: AssemblyId, full_name: &str) -> Option<TypeToken> {
        self.resolve_type_name(image, full_name)
            .map(|managed_type| TypeToken(managed_type.0))
    }

    pub fn new_string_utf16(&mut self, units: Vec<u16>) -> ManagedString {
        self.strings.push(units);
        ManagedString(self.strings.len() as u32 - 1)
    }

    /// Read a string as managed code sees it. `None` for unpaired surrogates.
    pub fn read_string(&self, string: ManagedString) -> Option<String> {
        let units = self.strings.get(string.0 as usize)?;
        String::from_utf16(units).ok()
    }

    /// Bind a new script object to `entity`.
    pub fn create_instance(&mut self, entity: EntityId, class_name: &str) -> ObjectRef {
        self.objects.push(ManagedObject {
            class_name: class_name.to_owned(),
            entity,
        });
        let object = ObjectRef(self.objects.len() as u64 - 1);
        self.instances.insert(entity, object);
        object
    }

    pub fn object(&self, object: ObjectRef) -> Option<&ManagedObject> {
        self.objects.get(object.0 as usize)
    }

    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }

    pub fn has_internal_call(&self, qualified_name: &str) -> bool {
        self.internal_calls.contains_key(qualified_name)
    }

    pub fn internal_call_count(&self) -> usize {
        self.internal_calls.len()
    }

    /// Transient UTF-8 buffers handed out and not yet released.
    pub fn live_native_buffers(&self) -> usize {
        self.live_buffers.get()
    }

    /// Call a bound internal call the way managed code would: by name.
    pub fn call(
        &mut self,
        engine: &ScriptEngine,
        qualified_name: &str,
        args: &mut [ScriptValue],
    ) -> Result<ScriptValue, InteropError> {
        match self.internal_calls.get(qualified_name).copied() {
            Some(call) => engine.dispatch(call, self, args),
            None => Err(engine.reject(
                qualified_name,
                args,
                ContractViolation::UnknownCall(qualified_name.to_owned()),
            )),
        }
    }
}

/// Encode UTF-16 as WTF-8: unpaired surrogates become three-byte sequences
/// instead of failing, so the native side decides how to treat them.
fn utf16_to_wtf8(units: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(units.len());
    for unit in char::decode_utf16(units.iter().copied()) {
        match unit {
            Ok(ch) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            Err(err) => {
                let code = err.unpaired_surrogate();
                bytes.push(0xE0 | (code >> 12) as u8);
                bytes.push(0x80 | ((code >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (code & 0x3F) as u8);
            }
        }
    }
    bytes
}

impl ScriptHost for ManagedDomain {
    fn add_internal_call(&mut self, name: &str, call: &'static InternalCall) {
        self.internal_calls.insert(name.to_owned(), call);
    }

    fn resolve_type(&mut self, image: AssemblyId, full_name: &str) -> Option<ManagedType> {
        self.resolve_type_name(image, full_name)
    }

    fn type_from_token(&self, token: TypeToken) -> Option<ManagedType> {
        self.assemblies
            .iter()
            .filter(|assembly| assembly.loaded)
            .flat_map(|assembly| assembly.types.values())
            .find(|managed_type| managed_type.0 == token.0)
            .copied()
    }

    fn new_string(&mut self, text: &str) -> ManagedString {
        self.new_string_utf16(text.encode_utf16().collect())
    }

    fn string_to_utf8(&self, string: ManagedString) -> Option<Utf8Buffer> {
        let units = self.strings.get(string.0 as usize)?;
        let live = self.live_buffers.clone();
        live.set(live.get() + 1);
        Some(Utf8Buffer::with_release(utf16_to_wtf8(units), move || {
            live.set(live.get() - 1)
        }))
    }

    fn managed_instance(&self, entity: EntityId) -> Option<ObjectRef> {
        self.instances.get(&entity).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use hearth_services::{KeyboardState, MemoryLogSink, ScriptSettings};

    use crate::context::ScriptContext;
    use crate::marshal::{to_managed_string, to_native_string};

    #[test]
    fn text_round_trips_byte_for_byte() {
        let mut domain = ManagedDomain::new();
        for text in ["", "Player", "héllo wörld", "日本語", "emoji 🔥 ok"] {
            let managed = to_managed_string(&mut domain, text);
            assert_eq!(domain.read_string(managed).as_deref(), Some(text));
            assert_eq!(to_native_string(&domain, managed).unwrap().as_bytes(), text.as_bytes());
        }
        assert_eq!(domain.live_native_buffers(), 0);
    }

    #[test]
    fn invalid_text_still_releases_the_buffer() {
        let mut domain = ManagedDomain::new();
        let broken = domain.new_string_utf16(vec![0x0041, 0xD800, 0x0042]);
        assert_eq!(
            to_native_string(&domain, broken),
            Err(ContractViolation::InvalidString(broken))
        );
        assert_eq!(domain.live_native_buffers(), 0);

        let dead = ManagedString(999);
        assert_eq!(to_native_string(&domain, dead), Err(ContractViolation::InvalidString(dead)));
    }

    #[test]
    fn string_handles_outlive_later_calls() {
        let mut domain = ManagedDomain::new();
        let context = ScriptContext::new(
            Rc::new(RefCell::new(KeyboardState::new())),
            Rc::new(MemoryLogSink::new()),
        );
        let engine = ScriptEngine::new(ScriptSettings::default(), context);
        engine.register_functions(&mut domain);

        let first = domain.new_string("first");
        for _ in 0..3 {
            let mut args = [ScriptValue::String(domain.new_string("tick"))];
            let qualified = engine.qualified_name("Logger_Info");
            domain.call(&engine, &qualified, &mut args).unwrap();
        }
        assert_eq!(domain.read_string(first).as_deref(), Some("first"));
    }

    #[test]
    fn wtf8_encodes_lone_surrogates() {
        assert_eq!(utf16_to_wtf8(&[0xD800]), vec![0xED, 0xA0, 0x80]);
        assert_eq!(utf16_to_wtf8(&[0x0041]), b"A".to_vec());
    }

    #[test]
    fn reload_invalidates_tokens() {
        let mut domain = ManagedDomain::new();
        let image = domain.load_assembly("core", &["Hearth.TransformComponent"]);
        let token = domain.type_token(image, "Hearth.TransformComponent").unwrap();
        assert!(domain.type_from_token(token).is_some());

        let reloaded = domain.reload_assembly(image).unwrap();
        assert!(domain.type_from_token(token).is_none());
        assert!(domain.type_token(image, "Hearth.TransformComponent").is_none());
        assert!(domain.type_token(reloaded, "Hearth.TransformComponent").is_some());
        assert_eq!(domain.reload_assembly(image), Err(DomainError::AssemblyNotLoaded(image)));
    }

    #[test]
    fn instances_are_bound_per_entity() {
        let mut domain = ManagedDomain::new();
        let entity = EntityId::from_raw(5);
        let object = domain.create_instance(entity, "Sandbox.Player");
        assert_eq!(domain.managed_instance(entity), Some(object));
        assert_eq!(domain.object(object).unwrap().class_name, "Sandbox.Player");
        assert_eq!(domain.managed_instance(EntityId::from_raw(6)), None);
        domain.clear_instances();
        assert_eq!(domain.managed_instance(entity), None);
    }
}
