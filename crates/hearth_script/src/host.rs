//! Scripting-runtime collaborator

use std::fmt;

use hearth_core::scene::EntityId;

use crate::glue::InternalCall;
use crate::value::{AssemblyId, ManagedString, ManagedType, ObjectRef, TypeToken};

/// Transient native copy of a managed string.
///
/// The host allocates it for one conversion; the release hook runs when the
/// guard drops, whichever way the conversion ends.
pub struct Utf8Buffer {
    bytes: Vec<u8>,
    release: Option<Box<dyn FnOnce()>>,
}

impl Utf8Buffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            release: None,
        }
    }

    pub fn with_release(bytes: Vec<u8>, release: impl FnOnce() + 'static) -> Self {
        Self {
            bytes,
            release: Some(Box::new(release)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for Utf8Buffer {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Utf8Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utf8Buffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// What the bridge needs from the managed runtime.
pub trait ScriptHost {
    /// Expose `call` to managed code under `name`. Registering a name again
    /// replaces the previous binding.
    fn add_internal_call(&mut self, name: &str, call: &'static InternalCall);

    /// Reflect a class by namespaced name within a loaded assembly image.
    fn resolve_type(&mut self, image: AssemblyId, full_name: &str) -> Option<ManagedType>;

    /// Reflection identity behind a runtime type object.
    fn type_from_token(&self, token: TypeToken) -> Option<ManagedType>;

    /// Allocate a new managed-heap string holding `text`.
    fn new_string(&mut self, text: &str) -> ManagedString;

    /// Copy a managed string out as UTF-8. `None` for a dead handle.
    fn string_to_utf8(&self, string: ManagedString) -> Option<Utf8Buffer>;

    /// Managed script instance bound to `entity`, if any.
    fn managed_instance(&self, entity: EntityId) -> Option<ObjectRef>;
}
