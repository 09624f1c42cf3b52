//! Conversions between native and managed representations

use bytemuck::Pod;
use hearth_core::scene::BodyType;
use hearth_physics::BodyKind;

use crate::error::ContractViolation;
use crate::host::ScriptHost;
use crate::value::ManagedString;

/// Copy a managed string into native memory.
///
/// The host's transient buffer is released before returning, on both paths.
pub fn to_native_string(
    host: &dyn ScriptHost,
    string: ManagedString,
) -> Result<String, ContractViolation> {
    let buffer = host
        .string_to_utf8(string)
        .ok_or(ContractViolation::InvalidString(string))?;
    std::str::from_utf8(buffer.as_bytes())
        .map(str::to_owned)
        .map_err(|_| ContractViolation::InvalidString(string))
}

/// Allocate a fresh managed string with the host's allocator.
pub fn to_managed_string(host: &mut dyn ScriptHost, text: &str) -> ManagedString {
    host.new_string(text)
}

/// Read a `T` out of a by-reference struct buffer.
pub fn read_struct<T: Pod>(bytes: &[u8]) -> Result<T, ContractViolation> {
    let expected = std::mem::size_of::<T>();
    if bytes.len() != expected {
        return Err(ContractViolation::BufferSize {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytemuck::pod_read_unaligned(bytes))
}

/// Write `value` through a caller-supplied out buffer.
pub fn write_struct<T: Pod>(out: &mut [u8], value: &T) -> Result<(), ContractViolation> {
    let bytes = bytemuck::bytes_of(value);
    if out.len() != bytes.len() {
        return Err(ContractViolation::BufferSize {
            expected: bytes.len(),
            actual: out.len(),
        });
    }
    out.copy_from_slice(bytes);
    Ok(())
}

pub fn body_type_to_physics(body_type: BodyType) -> BodyKind {
    BodyKind::from(body_type)
}

pub fn body_type_from_physics(kind: BodyKind) -> BodyType {
    BodyType::from(kind)
}

/// Managed `Rigidbody2DComponent.BodyType` value to the component enum.
pub fn body_type_from_managed(value: i32) -> Result<BodyType, ContractViolation> {
    match value {
        0 => Ok(BodyType::Static),
        1 => Ok(BodyType::Dynamic),
        2 => Ok(BodyType::Kinematic),
        _ => Err(ContractViolation::UnmappedEnum {
            name: "BodyType",
            value: value as i64,
        }),
    }
}

pub fn body_type_to_managed(body_type: BodyType) -> i32 {
    body_type as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    #[test]
    fn struct_buffers_are_size_checked() {
        let mut out = [0u8; 8];
        write_struct(&mut out, &Vec2::new(-1.5, f32::MAX)).unwrap();
        assert_eq!(read_struct::<Vec2>(&out).unwrap(), Vec2::new(-1.5, f32::MAX));

        assert_eq!(
            read_struct::<Vec4>(&out),
            Err(ContractViolation::BufferSize { expected: 16, actual: 8 })
        );
        assert!(write_struct(&mut out, &Vec4::ONE).is_err());
    }

    #[test]
    fn unaligned_buffers_are_fine() {
        let backing = [0u8; 13];
        let value = read_struct::<glam::Vec3>(&backing[1..]).unwrap();
        assert_eq!(value, glam::Vec3::ZERO);
    }

    #[test]
    fn body_type_conversions_are_total_and_bijective() {
        for kind in [BodyKind::Static, BodyKind::Kinematic, BodyKind::Dynamic] {
            let body_type = body_type_from_physics(kind);
            assert_eq!(body_type_to_physics(body_type), kind);

            let managed = body_type_to_managed(body_type);
            assert_eq!(body_type_from_managed(managed), Ok(body_type));
        }
        assert_eq!(body_type_from_managed(1), Ok(BodyType::Dynamic));
        assert_eq!(body_type_to_physics(BodyType::Dynamic), BodyKind::Dynamic);
    }

    #[test]
    fn out_of_range_managed_enum_is_a_violation() {
        assert_eq!(
            body_type_from_managed(7),
            Err(ContractViolation::UnmappedEnum { name: "BodyType", value: 7 })
        );
        assert!(body_type_from_managed(-1).is_err());
    }
}
