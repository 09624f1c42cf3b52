//! The internal call entries
//!
//! Each entry resolves its entity, converts arguments, performs one native
//! read, write or forward, and converts the result back. Nothing more.

use bytemuck::Pod;
use glam::{Vec2, Vec3, Vec4};
use hearth_core::scene::{
    CircleRendererComponent, EntityId, Rigidbody2DComponent, TextComponent, TransformComponent,
};
use hearth_physics::{BodyHandle, Physics2D, PhysicsError};
use hearth_services::{KeyCode, LogLevel};

use super::{CallContext, InternalCall, Param, Signature};
use crate::error::ContractViolation;
use crate::marshal::{
    body_type_from_managed, body_type_from_physics, body_type_to_managed, body_type_to_physics,
    read_struct, to_managed_string, to_native_string, write_struct,
};
use crate::resolve::resolve;
use crate::value::{ManagedString, ScriptValue, TypeToken, ValueKind};

type CallResult = Result<ScriptValue, ContractViolation>;

const VEC2: ValueKind = ValueKind::of_struct::<Vec2>();
const VEC3: ValueKind = ValueKind::of_struct::<Vec3>();
const VEC4: ValueKind = ValueKind::of_struct::<Vec4>();

const ENTITY: Param = Param::In(ValueKind::U64);

const GET_VEC3: Signature = Signature::new(&[ENTITY, Param::Out(VEC3)], ValueKind::Void);
const SET_VEC3: Signature = Signature::new(&[ENTITY, Param::In(VEC3)], ValueKind::Void);
const GET_VEC4: Signature = Signature::new(&[ENTITY, Param::Out(VEC4)], ValueKind::Void);
const SET_VEC4: Signature = Signature::new(&[ENTITY, Param::In(VEC4)], ValueKind::Void);
const GET_F32: Signature = Signature::new(&[ENTITY], ValueKind::F32);
const SET_F32: Signature = Signature::new(&[ENTITY, Param::In(ValueKind::F32)], ValueKind::Void);
const LOG: Signature = Signature::new(&[Param::In(ValueKind::String)], ValueKind::Void);

pub static CALLS: &[InternalCall] = &[
    InternalCall::new(
        "GetScriptInstance",
        Signature::new(&[ENTITY], ValueKind::Object),
        get_script_instance,
    ),
    InternalCall::new(
        "Entity_HasComponent",
        Signature::new(&[ENTITY, Param::In(ValueKind::Type)], ValueKind::Bool),
        entity_has_component,
    ),
    InternalCall::new(
        "Entity_FindEntityByName",
        Signature::new(&[Param::In(ValueKind::String)], ValueKind::U64),
        entity_find_entity_by_name,
    ),
    InternalCall::new("TransformComponent_GetTranslation", GET_VEC3, transform_get_translation),
    InternalCall::new("TransformComponent_SetTranslation", SET_VEC3, transform_set_translation),
    InternalCall::new("TransformComponent_GetRotation", GET_VEC3, transform_get_rotation),
    InternalCall::new("TransformComponent_SetRotation", SET_VEC3, transform_set_rotation),
    InternalCall::new("TransformComponent_GetScale", GET_VEC3, transform_get_scale),
    InternalCall::new("TransformComponent_SetScale", SET_VEC3, transform_set_scale),
    InternalCall::new("CircleRendererComponent_GetColor", GET_VEC4, circle_get_color),
    InternalCall::new("CircleRendererComponent_SetColor", SET_VEC4, circle_set_color),
    InternalCall::new("CircleRendererComponent_GetThickness", GET_F32, circle_get_thickness),
    InternalCall::new("CircleRendererComponent_SetThickness", SET_F32, circle_set_thickness),
    InternalCall::new("CircleRendererComponent_GetFade", GET_F32, circle_get_fade),
    InternalCall::new("CircleRendererComponent_SetFade", SET_F32, circle_set_fade),
    InternalCall::new(
        "Rigidbody2DComponent_ApplyLinearImpulse",
        Signature::new(
            &[ENTITY, Param::In(VEC2), Param::In(VEC2), Param::In(ValueKind::Bool)],
            ValueKind::Void,
        ),
        rigidbody_apply_linear_impulse,
    ),
    InternalCall::new(
        "Rigidbody2DComponent_ApplyLinearImpulseToCenter",
        Signature::new(&[ENTITY, Param::In(VEC2), Param::In(ValueKind::Bool)], ValueKind::Void),
        rigidbody_apply_linear_impulse_to_center,
    ),
    InternalCall::new(
        "Rigidbody2DComponent_GetLinearVelocity",
        Signature::new(&[ENTITY, Param::Out(VEC2)], ValueKind::Void),
        rigidbody_get_linear_velocity,
    ),
    InternalCall::new(
        "Rigidbody2DComponent_GetType",
        Signature::new(&[ENTITY], ValueKind::I32),
        rigidbody_get_type,
    ),
    InternalCall::new(
        "Rigidbody2DComponent_SetType",
        Signature::new(&[ENTITY, Param::In(ValueKind::I32)], ValueKind::Void),
        rigidbody_set_type,
    ),
    InternalCall::new(
        "TextComponent_GetText",
        Signature::new(&[ENTITY], ValueKind::String),
        text_get_text,
    ),
    InternalCall::new(
        "TextComponent_SetText",
        Signature::new(&[ENTITY, Param::In(ValueKind::String)], ValueKind::Void),
        text_set_text,
    ),
    InternalCall::new("TextComponent_GetColor", GET_VEC4, text_get_color),
    InternalCall::new("TextComponent_SetColor", SET_VEC4, text_set_color),
    InternalCall::new("TextComponent_GetKerning", GET_F32, text_get_kerning),
    InternalCall::new("TextComponent_SetKerning", SET_F32, text_set_kerning),
    InternalCall::new("TextComponent_GetLineSpacing", GET_F32, text_get_line_spacing),
    InternalCall::new("TextComponent_SetLineSpacing", SET_F32, text_set_line_spacing),
    InternalCall::new(
        "Input_IsKeyDown",
        Signature::new(&[Param::In(ValueKind::U16)], ValueKind::Bool),
        input_is_key_down,
    ),
    InternalCall::new("Logger_Trace", LOG, logger_trace),
    InternalCall::new("Logger_Info", LOG, logger_info),
    InternalCall::new("Logger_Warn", LOG, logger_warn),
    InternalCall::new("Logger_Error", LOG, logger_error),
    InternalCall::new("Logger_Critical", LOG, logger_critical),
    InternalCall::new("Logger_cout", LOG, logger_cout),
];

// Argument access. The dispatcher has already checked the signature, so a
// mismatch here means an entry disagrees with its own table row.

fn arg_mismatch(args: &[ScriptValue], index: usize, expected: ValueKind) -> ContractViolation {
    ContractViolation::ArgumentMismatch {
        index,
        expected,
        actual: args.get(index).map_or(ValueKind::Void, ScriptValue::kind),
    }
}

macro_rules! scalar_arg {
    ($name:ident, $variant:ident, $ty:ty) => {
        fn $name(args: &[ScriptValue], index: usize) -> Result<$ty, ContractViolation> {
            match args.get(index) {
                Some(ScriptValue::$variant(value)) => Ok(*value),
                _ => Err(arg_mismatch(args, index, ValueKind::$variant)),
            }
        }
    };
}

scalar_arg!(bool_arg, Bool, bool);
scalar_arg!(i32_arg, I32, i32);
scalar_arg!(u16_arg, U16, u16);
scalar_arg!(u64_arg, U64, u64);
scalar_arg!(f32_arg, F32, f32);
scalar_arg!(string_arg, String, ManagedString);
scalar_arg!(type_arg, Type, TypeToken);

fn entity_arg(args: &[ScriptValue], index: usize) -> Result<EntityId, ContractViolation> {
    u64_arg(args, index).map(EntityId::from_raw)
}

fn struct_arg<T: Pod>(args: &[ScriptValue], index: usize) -> Result<T, ContractViolation> {
    match args.get(index) {
        Some(ScriptValue::Struct(bytes)) => read_struct(bytes),
        _ => Err(arg_mismatch(args, index, ValueKind::of_struct::<T>())),
    }
}

fn write_out<T: Pod>(
    args: &mut [ScriptValue],
    index: usize,
    value: &T,
) -> Result<(), ContractViolation> {
    if let Some(ScriptValue::Struct(bytes)) = args.get_mut(index) {
        return write_struct(bytes, value);
    }
    Err(arg_mismatch(args, index, ValueKind::of_struct::<T>()))
}

// Entity

fn get_script_instance(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let id = entity_arg(args, 0)?;
    resolve(cx.context, id)?;
    Ok(ScriptValue::Object(cx.host.managed_instance(id)))
}

fn entity_has_component(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let id = entity_arg(args, 0)?;
    let token = type_arg(args, 1)?;
    let entity = resolve(cx.context, id)?;
    let managed_type = cx
        .host
        .type_from_token(token)
        .ok_or(ContractViolation::UnresolvedTypeToken(token))?;
    let has = cx.registry.query(managed_type, &entity.view()?)?;
    Ok(ScriptValue::Bool(has))
}

fn entity_find_entity_by_name(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let name = to_native_string(&*cx.host, string_arg(args, 0)?)?;
    let scene = cx.context.scene()?;
    let found = scene.find_entity_by_name(&name).unwrap_or(EntityId::NONE);
    Ok(ScriptValue::U64(found.raw()))
}

// Component field accessors

macro_rules! struct_accessors {
    ($get:ident, $set:ident, $component:ty, $field:ident, $ty:ty) => {
        fn $get(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
            let value: $ty = resolve(cx.context, entity_arg(args, 0)?)?
                .component::<$component>()?
                .$field;
            write_out(args, 1, &value)?;
            Ok(ScriptValue::Void)
        }

        fn $set(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
            let value: $ty = struct_arg(args, 1)?;
            resolve(cx.context, entity_arg(args, 0)?)?
                .component_mut::<$component>()?
                .$field = value;
            Ok(ScriptValue::Void)
        }
    };
}

macro_rules! float_accessors {
    ($get:ident, $set:ident, $component:ty, $field:ident) => {
        fn $get(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
            let value = resolve(cx.context, entity_arg(args, 0)?)?
                .component::<$component>()?
                .$field;
            Ok(ScriptValue::F32(value))
        }

        fn $set(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
            let value = f32_arg(args, 1)?;
            resolve(cx.context, entity_arg(args, 0)?)?
                .component_mut::<$component>()?
                .$field = value;
            Ok(ScriptValue::Void)
        }
    };
}

struct_accessors!(
    transform_get_translation,
    transform_set_translation,
    TransformComponent,
    translation,
    Vec3
);
struct_accessors!(
    transform_get_rotation,
    transform_set_rotation,
    TransformComponent,
    rotation,
    Vec3
);
struct_accessors!(transform_get_scale, transform_set_scale, TransformComponent, scale, Vec3);

struct_accessors!(circle_get_color, circle_set_color, CircleRendererComponent, color, Vec4);
float_accessors!(circle_get_thickness, circle_set_thickness, CircleRendererComponent, thickness);
float_accessors!(circle_get_fade, circle_set_fade, CircleRendererComponent, fade);

struct_accessors!(text_get_color, text_set_color, TextComponent, color, Vec4);
float_accessors!(text_get_kerning, text_set_kerning, TextComponent, kerning);
float_accessors!(
    text_get_line_spacing,
    text_set_line_spacing,
    TextComponent,
    line_spacing
);

fn text_get_text(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let text = resolve(cx.context, entity_arg(args, 0)?)?
        .component::<TextComponent>()?
        .text
        .clone();
    Ok(ScriptValue::String(to_managed_string(&mut *cx.host, &text)))
}

fn text_set_text(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let id = entity_arg(args, 0)?;
    let text = to_native_string(&*cx.host, string_arg(args, 1)?)?;
    resolve(cx.context, id)?.component_mut::<TextComponent>()?.text = text;
    Ok(ScriptValue::Void)
}

// Physics. The body handle is looked up per call and never kept.

fn runtime_body(cx: &CallContext<'_>, id: EntityId) -> Result<BodyHandle, ContractViolation> {
    let entity = resolve(cx.context, id)?;
    let body = entity.component::<Rigidbody2DComponent>()?.runtime_body;
    body.ok_or(ContractViolation::MissingBody(id))
}

fn with_body<R>(
    cx: &CallContext<'_>,
    id: EntityId,
    op: impl FnOnce(&mut dyn Physics2D, BodyHandle) -> Result<R, PhysicsError>,
) -> Result<R, ContractViolation> {
    let body = runtime_body(cx, id)?;
    let mut physics = cx.context.physics()?;
    op(&mut *physics, body).map_err(|_| ContractViolation::StaleBody(id))
}

fn rigidbody_apply_linear_impulse(
    cx: &mut CallContext<'_>,
    args: &mut [ScriptValue],
) -> CallResult {
    let id = entity_arg(args, 0)?;
    let impulse: Vec2 = struct_arg(args, 1)?;
    let point: Vec2 = struct_arg(args, 2)?;
    let wake = bool_arg(args, 3)?;
    with_body(cx, id, |physics, body| {
        physics.apply_linear_impulse(body, impulse, point, wake)
    })?;
    Ok(ScriptValue::Void)
}

fn rigidbody_apply_linear_impulse_to_center(
    cx: &mut CallContext<'_>,
    args: &mut [ScriptValue],
) -> CallResult {
    let id = entity_arg(args, 0)?;
    let impulse: Vec2 = struct_arg(args, 1)?;
    let wake = bool_arg(args, 2)?;
    with_body(cx, id, |physics, body| {
        physics.apply_linear_impulse_to_center(body, impulse, wake)
    })?;
    Ok(ScriptValue::Void)
}

fn rigidbody_get_linear_velocity(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let id = entity_arg(args, 0)?;
    let velocity = with_body(cx, id, |physics, body| physics.linear_velocity(body))?;
    write_out(args, 1, &velocity)?;
    Ok(ScriptValue::Void)
}

fn rigidbody_get_type(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let id = entity_arg(args, 0)?;
    let kind = with_body(cx, id, |physics, body| physics.body_kind(body))?;
    Ok(ScriptValue::I32(body_type_to_managed(body_type_from_physics(kind))))
}

fn rigidbody_set_type(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let id = entity_arg(args, 0)?;
    let kind = body_type_to_physics(body_type_from_managed(i32_arg(args, 1)?)?);
    with_body(cx, id, |physics, body| physics.set_body_kind(body, kind))?;
    Ok(ScriptValue::Void)
}

// Input

fn input_is_key_down(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    let key = KeyCode(u16_arg(args, 0)?);
    let pressed = cx.context.input()?.is_key_pressed(key);
    Ok(ScriptValue::Bool(pressed))
}

// Logging

fn log_message(
    cx: &mut CallContext<'_>,
    args: &[ScriptValue],
    level: Option<LogLevel>,
) -> CallResult {
    let message = to_native_string(&*cx.host, string_arg(args, 0)?)?;
    match level {
        Some(level) => cx.context.log().log(level, &message),
        None => cx.context.log().raw(&message),
    }
    Ok(ScriptValue::Void)
}

fn logger_trace(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    log_message(cx, args, Some(LogLevel::Trace))
}

fn logger_info(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    log_message(cx, args, Some(LogLevel::Info))
}

fn logger_warn(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    log_message(cx, args, Some(LogLevel::Warn))
}

fn logger_error(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    log_message(cx, args, Some(LogLevel::Error))
}

fn logger_critical(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    log_message(cx, args, Some(LogLevel::Critical))
}

fn logger_cout(cx: &mut CallContext<'_>, args: &mut [ScriptValue]) -> CallResult {
    log_message(cx, args, None)
}
