//! Hearth Scripting Bridge
//!
//! Native side of the script interop layer: the internal call table managed
//! scripts bind by name, the value marshalling rules, the per-scene call
//! context and the component capability registry.
//!
//! ## Architecture
//!
//! - **Hosts:** anything implementing [`ScriptHost`]. [`ScriptRuntime`] embeds
//!   QuickJS; [`ManagedDomain`] is an in-process managed heap for tools and tests.
//! - **Dispatch:** every call goes through [`ScriptEngine::dispatch`], which
//!   checks the signature and reports contract violations.
//! - **Core library:** `js/hearth.js` mirrors the component set as classes.

pub mod context;
pub mod domain;
pub mod engine;
pub mod error;
pub mod glue;
pub mod host;
pub mod marshal;
pub mod registry;
pub mod resolve;
pub mod runtime;
pub mod value;

pub use context::{SceneBinding, ScriptContext};
pub use domain::{DomainError, ManagedDomain, ManagedObject};
pub use engine::ScriptEngine;
pub use error::{ContractViolation, InteropError};
pub use glue::{internal_calls, InternalCall, Param, Signature};
pub use host::{ScriptHost, Utf8Buffer};
pub use registry::{ComponentRegistry, RegistrationReport};
pub use runtime::{ScriptError, ScriptRuntime};
pub use value::{
    AssemblyId, ManagedString, ManagedType, ObjectRef, ScriptValue, TypeToken, ValueKind,
};

pub use rquickjs;
