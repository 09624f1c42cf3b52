use hearth_core::scene::EntityId;
use thiserror::Error;

use crate::value::{ManagedString, ManagedType, TypeToken, ValueKind};

/// Integration defects detected at the script boundary.
///
/// None of these are expected at runtime: they mean a script, the core
/// library or the engine wiring disagree about the contract. The call that
/// hits one is terminated and nothing it would have written is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("no active scene")]
    NoActiveScene,
    #[error("scene is already borrowed by another call")]
    SceneBusy,
    #[error("input source is already borrowed")]
    InputBusy,
    #[error("entity {0} does not exist in the active scene")]
    UnknownEntity(EntityId),
    #[error("entity {entity} has no {component}")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },
    #[error("type token {0:?} does not name a loaded managed type")]
    UnresolvedTypeToken(TypeToken),
    #[error("managed type {0:?} is not a registered component")]
    UnregisteredType(ManagedType),
    #[error("{value} is not a valid {name}")]
    UnmappedEnum { name: &'static str, value: i64 },
    #[error("entity {0} has no runtime body")]
    MissingBody(EntityId),
    #[error("runtime body of entity {0} was destroyed")]
    StaleBody(EntityId),
    #[error("managed string {0:?} is not valid text")]
    InvalidString(ManagedString),
    #[error("struct buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("argument {index}: expected {expected}, got {actual}")]
    ArgumentMismatch {
        index: usize,
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("no internal call named {0}")]
    UnknownCall(String),
    #[error("entity {0} cannot be represented as a script number")]
    UnrepresentableId(EntityId),
}

impl ContractViolation {
    /// Entity the violation is about, when it names one.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            ContractViolation::UnknownEntity(entity)
            | ContractViolation::MissingBody(entity)
            | ContractViolation::StaleBody(entity)
            | ContractViolation::UnrepresentableId(entity)
            | ContractViolation::MissingComponent { entity, .. } => Some(*entity),
            _ => None,
        }
    }

    /// Component kind the violation is about, when it names one.
    pub fn component(&self) -> Option<&'static str> {
        match self {
            ContractViolation::MissingComponent { component, .. } => Some(*component),
            ContractViolation::MissingBody(_) | ContractViolation::StaleBody(_) => {
                Some("Rigidbody2DComponent")
            }
            _ => None,
        }
    }
}

/// A contract violation with the context of the call that hit it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{call}: {violation}")]
pub struct InteropError {
    pub call: String,
    pub entity: Option<EntityId>,
    #[source]
    pub violation: ContractViolation,
}
