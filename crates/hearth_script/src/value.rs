//! Values crossing the script boundary
//!
//! Managed-heap objects never cross as native data. Strings, type objects and
//! object instances travel as opaque handles owned by the script host; vectors
//! and small structs travel as raw byte buffers.

use std::fmt;

use bytemuck::Pod;

/// Handle to a string on the managed heap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ManagedString(pub u32);

/// Reflection identity of a managed class within one loaded assembly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ManagedType(pub u32);

/// Runtime type object as managed code passes it (`typeof(T)`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TypeToken(pub u32);

/// Handle to a managed object instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub u64);

/// A loaded assembly image.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyId(pub u32);

/// One argument or return value of an internal call.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Void,
    Bool(bool),
    I32(i32),
    U16(u16),
    U64(u64),
    F32(f32),
    String(ManagedString),
    Type(TypeToken),
    Object(Option<ObjectRef>),
    /// By-reference struct. For out-parameters the caller supplies a buffer
    /// of the right size and reads it back after the call.
    Struct(Vec<u8>),
}

/// Shape of a [`ScriptValue`], used in call signatures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Void,
    Bool,
    I32,
    U16,
    U64,
    F32,
    String,
    Type,
    Object,
    Struct { size: usize },
}

impl ValueKind {
    /// Struct kind sized for `T`.
    pub const fn of_struct<T: Pod>() -> Self {
        ValueKind::Struct {
            size: std::mem::size_of::<T>(),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Void => f.write_str("void"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::I32 => f.write_str("i32"),
            ValueKind::U16 => f.write_str("u16"),
            ValueKind::U64 => f.write_str("u64"),
            ValueKind::F32 => f.write_str("f32"),
            ValueKind::String => f.write_str("string"),
            ValueKind::Type => f.write_str("type"),
            ValueKind::Object => f.write_str("object"),
            ValueKind::Struct { size } => write!(f, "struct[{size}]"),
        }
    }
}

impl ScriptValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ScriptValue::Void => ValueKind::Void,
            ScriptValue::Bool(_) => ValueKind::Bool,
            ScriptValue::I32(_) => ValueKind::I32,
            ScriptValue::U16(_) => ValueKind::U16,
            ScriptValue::U64(_) => ValueKind::U64,
            ScriptValue::F32(_) => ValueKind::F32,
            ScriptValue::String(_) => ValueKind::String,
            ScriptValue::Type(_) => ValueKind::Type,
            ScriptValue::Object(_) => ValueKind::Object,
            ScriptValue::Struct(bytes) => ValueKind::Struct { size: bytes.len() },
        }
    }

    /// Struct value holding a copy of `value`.
    pub fn from_pod<T: Pod>(value: &T) -> Self {
        ScriptValue::Struct(bytemuck::bytes_of(value).to_vec())
    }

    /// Zeroed out-parameter buffer of the given kind.
    ///
    /// Non-struct kinds get their zero value.
    pub fn zeroed(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Void => ScriptValue::Void,
            ValueKind::Bool => ScriptValue::Bool(false),
            ValueKind::I32 => ScriptValue::I32(0),
            ValueKind::U16 => ScriptValue::U16(0),
            ValueKind::U64 => ScriptValue::U64(0),
            ValueKind::F32 => ScriptValue::F32(0.0),
            ValueKind::String => ScriptValue::String(ManagedString(0)),
            ValueKind::Type => ScriptValue::Type(TypeToken(0)),
            ValueKind::Object => ScriptValue::Object(None),
            ValueKind::Struct { size } => ScriptValue::Struct(vec![0; size]),
        }
    }

    /// Read back a struct value as `T`. `None` for non-structs or a size mismatch.
    pub fn to_pod<T: Pod>(&self) -> Option<T> {
        match self {
            ScriptValue::Struct(bytes) if bytes.len() == std::mem::size_of::<T>() => {
                Some(bytemuck::pod_read_unaligned(bytes))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn struct_kind_carries_size() {
        let value = ScriptValue::from_pod(&Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(value.kind(), ValueKind::of_struct::<Vec3>());
        assert_eq!(value.kind(), ValueKind::Struct { size: 12 });
        assert_eq!(value.to_pod::<Vec3>(), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(value.to_pod::<Vec2>(), None);
    }

    #[test]
    fn zeroed_matches_kind() {
        for kind in [ValueKind::Bool, ValueKind::U64, ValueKind::Struct { size: 16 }] {
            assert_eq!(ScriptValue::zeroed(kind).kind(), kind);
        }
    }
}
