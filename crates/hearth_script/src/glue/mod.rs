//! Internal call table
//!
//! The fixed set of native functions managed code calls by name. Managed
//! declarations are matched by name only, so every entry carries an explicit
//! [`Signature`] the dispatcher checks before the entry runs.

mod calls;


use crate::context::ScriptContext;
use crate::error::ContractViolation;
use crate::host::ScriptHost;
use crate::registry::ComponentRegistry;
use crate::value::{ScriptValue, ValueKind};

pub use calls::CALLS;

/// Native side of an internal call.
///
/// Out-parameters are written back into `args` in place.
pub type NativeFn =
    fn(&mut CallContext<'_>, &mut [ScriptValue]) -> Result<ScriptValue, ContractViolation>;

/// How a parameter is passed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Param {
    In(ValueKind),
    /// Caller-supplied buffer the call writes into.
    Out(ValueKind),
}

impl Param {
    pub fn kind(&self) -> ValueKind {
        match self {
            Param::In(kind) | Param::Out(kind) => *kind,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [Param],
    pub ret: ValueKind,
}

impl Signature {
    pub const fn new(params: &'static [Param], ret: ValueKind) -> Self {
        Self { params, ret }
    }

    /// Arity and per-argument shape, structs included by size.
    pub fn check(&self, args: &[ScriptValue]) -> Result<(), ContractViolation> {
        if args.len() != self.params.len() {
            return Err(ContractViolation::ArityMismatch {
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        for (index, (param, arg)) in self.params.iter().zip(args).enumerate() {
            let actual = arg.kind();
            if param.kind() != actual {
                return Err(ContractViolation::ArgumentMismatch {
                    index,
                    expected: param.kind(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

pub struct InternalCall {
    pub name: &'static str,
    pub signature: Signature,
    pub func: NativeFn,
}

impl InternalCall {
    pub const fn new(name: &'static str, signature: Signature, func: NativeFn) -> Self {
        Self {
            name,
            signature,
            func,
        }
    }
}

impl std::fmt::Debug for InternalCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalCall")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Everything an entry may touch while it runs.
pub struct CallContext<'a> {
    pub context: &'a ScriptContext,
    pub registry: &'a ComponentRegistry,
    pub host: &'a mut dyn ScriptHost,
}

/// The full table, in registration order.
pub fn internal_calls() -> &'static [InternalCall] {
    CALLS
}

/// Look up an entry by its unqualified name.
pub fn find(name: &str) -> Option<&'static InternalCall> {
    CALLS.iter().find(|call| call.name == name)
}

/// `<Namespace>.<Class>::<Name>`, the name managed code binds against.
pub fn qualified_name(namespace: &str, class: &str, name: &str) -> String {
    format!("{namespace}.{class}::{name}")
}
