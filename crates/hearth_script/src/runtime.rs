//! QuickJS script runtime
//!
//! Hosts the Hearth core library in an embedded JavaScript engine and binds
//! the internal call table into it. Scripts see `Hearth.InternalCalls.<Name>`
//! functions; arguments are converted to [`ScriptValue`]s by signature and
//! every call goes through [`ScriptEngine::dispatch`]. A contract violation
//! surfaces in the script as a thrown `Error`.

use std::cell::RefCell;
use std::rc::Rc;

use hearth_core::scene::{EntityId, ScriptComponent};
use rquickjs::function::Rest;
use rquickjs::{Context, Ctx, FromJs, Function, Object, Runtime, Value};
use thiserror::Error;

use crate::context::SceneBinding;
use crate::engine::ScriptEngine;
use crate::error::ContractViolation;
use crate::glue::{InternalCall, Param};
use crate::host::{ScriptHost, Utf8Buffer};
use crate::registry::RegistrationReport;
use crate::value::{
    AssemblyId, ManagedString, ManagedType, ObjectRef, ScriptValue, TypeToken, ValueKind,
};

const CORE_LIBRARY: &str = include_str!("../js/hearth.js");

/// Largest integer a JS number holds exactly.
const MAX_SAFE_ID: u64 = (1 << 53) - 1;
const MAX_SAFE_INTEGER: f64 = MAX_SAFE_ID as f64;

const VECTOR_FIELDS: [&str; 4] = ["x", "y", "z", "w"];

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("javascript engine error: {0}")]
    Js(#[from] rquickjs::Error),
    #[error("uncaught exception: {0}")]
    Exception(String),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error("script engine is busy")]
    EngineBusy,
}

/// Native state shared by every bound call.
#[derive(Debug, Default)]
struct HostState {
    /// Current core library image. Bumped on every reload.
    assembly: AssemblyId,
    /// String handles live for one internal call.
    strings: Vec<String>,
}

impl HostState {
    fn push_string(&mut self, text: String) -> ManagedString {
        self.strings.push(text);
        ManagedString(self.strings.len() as u32 - 1)
    }
}

/// Script execution context
pub struct ScriptRuntime {
    #[allow(dead_code)] // Kept alive for context lifetime
    runtime: Runtime,
    context: Context,
    engine: Rc<RefCell<ScriptEngine>>,
    state: Rc<RefCell<HostState>>,
}

impl ScriptRuntime {
    /// Create the JS engine and evaluate the core library. Internal calls
    /// are not bound until [`register_functions`](Self::register_functions).
    pub fn new(engine: ScriptEngine) -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;
        let script_runtime = Self {
            runtime,
            context,
            engine: Rc::new(RefCell::new(engine)),
            state: Rc::new(RefCell::new(HostState::default())),
        };
        script_runtime.execute(CORE_LIBRARY)?;
        Ok(script_runtime)
    }

    pub fn engine(&self) -> Rc<RefCell<ScriptEngine>> {
        self.engine.clone()
    }

    /// Image id the registry resolves component types against.
    pub fn core_assembly(&self) -> AssemblyId {
        self.state.borrow().assembly
    }

    pub fn execute(&self, source: &str) -> Result<(), ScriptError> {
        self.eval::<()>(source)
    }

    /// Evaluate `source` and convert the completion value.
    pub fn eval<T>(&self, source: &str) -> Result<T, ScriptError>
    where
        T: for<'js> FromJs<'js>,
    {
        self.context
            .with(|ctx| ctx.eval::<T, _>(source).map_err(|err| js_error(&ctx, err)))
    }

    fn with_host<R>(&self, f: impl for<'js> FnOnce(&mut JsHost<'js>) -> R) -> R {
        self.context.with(|ctx| {
            let mut host = JsHost {
                ctx,
                engine: self.engine.clone(),
                state: self.state.clone(),
            };
            f(&mut host)
        })
    }

    /// Bind the internal call table under `Hearth.InternalCalls`.
    pub fn register_functions(&self) -> Result<usize, ScriptError> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| ScriptError::EngineBusy)?;
        Ok(self.with_host(|host| engine.register_functions(host)))
    }

    pub fn register_components(&self) -> Result<RegistrationReport, ScriptError> {
        let image = self.core_assembly();
        let mut engine = self
            .engine
            .try_borrow_mut()
            .map_err(|_| ScriptError::EngineBusy)?;
        Ok(self.with_host(|host| engine.register_components(host, image)))
    }

    /// Evaluate the core library again and rebind everything against it.
    ///
    /// Script instances and entity classes registered by user scripts are
    /// dropped; the caller re-executes its scripts afterwards. A failed
    /// reload leaves no component types registered.
    pub fn reload_core(&self) -> Result<RegistrationReport, ScriptError> {
        self.engine
            .try_borrow_mut()
            .map_err(|_| ScriptError::EngineBusy)?
            .unload_components();
        {
            let mut state = self.state.borrow_mut();
            state.assembly = AssemblyId(state.assembly.0 + 1);
            state.strings.clear();
        }
        self.execute(CORE_LIBRARY)?;
        let bound = self.register_functions()?;
        let report = self.register_components()?;
        tracing::info!(
            assembly = self.core_assembly().0,
            calls = bound,
            components = report.registered.len(),
            "reloaded script core"
        );
        Ok(report)
    }

    pub fn on_runtime_start(&self, binding: SceneBinding) -> Result<(), ScriptError> {
        self.engine
            .try_borrow_mut()
            .map_err(|_| ScriptError::EngineBusy)?
            .on_runtime_start(binding);
        Ok(())
    }

    /// Drop every script instance, then detach the scene.
    pub fn on_runtime_stop(&self) -> Result<(), ScriptError> {
        self.call_runtime("clear", |clear| clear.call::<_, ()>(()))?;
        self.engine
            .try_borrow_mut()
            .map_err(|_| ScriptError::EngineBusy)?
            .on_runtime_stop();
        Ok(())
    }

    pub fn entity_class_exists(&self, class_name: &str) -> Result<bool, ScriptError> {
        self.call_runtime("entityClassExists", |exists| exists.call((class_name,)))
    }

    /// Instantiate `class_name` for `entity` and run its `onCreate`.
    ///
    /// Returns false when no script registered that class.
    pub fn on_create_entity(
        &self,
        entity: EntityId,
        class_name: &str,
    ) -> Result<bool, ScriptError> {
        let id = script_id(entity)?;
        let created: bool =
            self.call_runtime("create", |create| create.call((id, class_name)))?;
        if !created {
            tracing::warn!(entity = %entity, class = class_name, "entity class not found");
        }
        Ok(created)
    }

    pub fn on_update_entity(&self, entity: EntityId, ts: f32) -> Result<(), ScriptError> {
        let id = script_id(entity)?;
        self.call_runtime("update", |update| update.call((id, ts as f64)))
    }

    /// Create instances for every entity carrying a [`ScriptComponent`].
    pub fn instantiate_entities(&self) -> Result<usize, ScriptError> {
        let mut created = 0;
        for (entity, class_name) in self.scripted_entities()? {
            if self.on_create_entity(entity, &class_name)? {
                created += 1;
            }
        }
        Ok(created)
    }

    pub fn update_entities(&self, ts: f32) -> Result<(), ScriptError> {
        for (entity, _) in self.scripted_entities()? {
            self.on_update_entity(entity, ts)?;
        }
        Ok(())
    }

    fn scripted_entities(&self) -> Result<Vec<(EntityId, String)>, ScriptError> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| ScriptError::EngineBusy)?;
        let scene = engine.context().scene()?;
        let mut scripted = Vec::new();
        for entity in scene.iter() {
            if let Some(script) = entity.get::<ScriptComponent>() {
                scripted.push((entity.id(), script.class_name.clone()));
            }
        }
        Ok(scripted)
    }

    /// Run one of the `Hearth.__runtime` hooks.
    fn call_runtime<T>(
        &self,
        hook: &str,
        call: impl for<'js> FnOnce(Function<'js>) -> rquickjs::Result<T>,
    ) -> Result<T, ScriptError> {
        self.context.with(|ctx| {
            runtime_object(&ctx)
                .and_then(|runtime| runtime.get::<_, Function>(hook))
                .and_then(call)
                .map_err(|err| js_error(&ctx, err))
        })
    }
}

/// [`ScriptHost`] view of a QuickJS context for the duration of one call.
struct JsHost<'js> {
    ctx: Ctx<'js>,
    engine: Rc<RefCell<ScriptEngine>>,
    state: Rc<RefCell<HostState>>,
}

impl<'js> JsHost<'js> {
    fn install(&self, name: &str, call: &'static InternalCall) -> rquickjs::Result<()> {
        let (path, function_name) = name.rsplit_once("::").unwrap_or(("", name));
        let mut target = self.ctx.globals();
        for segment in path.split('.').filter(|segment| !segment.is_empty()) {
            target = match target.get::<_, Option<Object>>(segment)? {
                Some(object) => object,
                None => {
                    let object = Object::new(self.ctx.clone())?;
                    target.set(segment, object.clone())?;
                    object
                }
            };
        }

        let engine = self.engine.clone();
        let state = self.state.clone();
        let function = Function::new(
            self.ctx.clone(),
            move |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
                call_from_js(&ctx, &engine, &state, call, &args.0)
            },
        )?;
        target.set(function_name, function)
    }

    fn runtime_hook<T: FromJs<'js>>(&self, hook: &str, arg: f64) -> rquickjs::Result<T> {
        runtime_object(&self.ctx)?
            .get::<_, Function>(hook)?
            .call::<_, T>((arg,))
    }
}

impl<'js> ScriptHost for JsHost<'js> {
    fn add_internal_call(&mut self, name: &str, call: &'static InternalCall) {
        if let Err(err) = self.install(name, call) {
            tracing::error!(call = name, error = %err, "failed to bind internal call");
        }
    }

    fn resolve_type(&mut self, image: AssemblyId, full_name: &str) -> Option<ManagedType> {
        if image != self.state.borrow().assembly {
            return None;
        }
        let resolved = runtime_object(&self.ctx)
            .and_then(|runtime| runtime.get::<_, Function>("resolveType"))
            .and_then(|func| func.call::<_, Option<f64>>((full_name,)));
        match resolved {
            Ok(id) => id.map(|id| ManagedType(id as u32)),
            Err(err) => {
                tracing::warn!(type_name = full_name, error = %err, "type lookup failed");
                None
            }
        }
    }

    fn type_from_token(&self, token: TypeToken) -> Option<ManagedType> {
        match self.runtime_hook::<bool>("typeExists", token.0 as f64) {
            Ok(true) => Some(ManagedType(token.0)),
            Ok(false) => None,
            Err(err) => {
                tracing::warn!(token = token.0, error = %err, "type lookup failed");
                None
            }
        }
    }

    fn new_string(&mut self, text: &str) -> ManagedString {
        self.state.borrow_mut().push_string(text.to_owned())
    }

    fn string_to_utf8(&self, string: ManagedString) -> Option<Utf8Buffer> {
        let state = self.state.borrow();
        let text = state.strings.get(string.0 as usize)?;
        Some(Utf8Buffer::new(text.as_bytes().to_vec()))
    }

    fn managed_instance(&self, entity: EntityId) -> Option<ObjectRef> {
        let id = script_id(entity).ok()?;
        match self.runtime_hook::<bool>("hasInstance", id) {
            Ok(true) => Some(ObjectRef(entity.raw())),
            Ok(false) => None,
            Err(err) => {
                tracing::warn!(entity = %entity, error = %err, "instance lookup failed");
                None
            }
        }
    }
}

fn runtime_object<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
    ctx.globals()
        .get::<_, Object>("Hearth")?
        .get::<_, Object>("__runtime")
}

/// Entry point of every bound internal call.
fn call_from_js<'js>(
    ctx: &Ctx<'js>,
    engine: &Rc<RefCell<ScriptEngine>>,
    state: &Rc<RefCell<HostState>>,
    call: &'static InternalCall,
    js_args: &[Value<'js>],
) -> rquickjs::Result<Value<'js>> {
    // Calls nested in argument getters push above this mark and release
    // down to their own, so outer handles stay valid.
    let mark = state.borrow().strings.len();
    let output = dispatch_from_js(ctx, engine, state, call, js_args);
    state.borrow_mut().strings.truncate(mark);
    output
}

fn dispatch_from_js<'js>(
    ctx: &Ctx<'js>,
    engine: &Rc<RefCell<ScriptEngine>>,
    state: &Rc<RefCell<HostState>>,
    call: &'static InternalCall,
    js_args: &[Value<'js>],
) -> rquickjs::Result<Value<'js>> {
    // Reading a property can run script code, so no borrow is held here.
    let mut inputs = js_args.iter();
    let mut args = Vec::with_capacity(call.signature.params.len());
    for param in call.signature.params {
        args.push(match param {
            Param::In(kind) => value_from_js(state, *kind, inputs.next()),
            Param::Out(kind) => ScriptValue::zeroed(*kind),
        });
    }

    let result = {
        let dispatcher = engine
            .try_borrow()
            .map_err(|_| throw(ctx, "script engine is busy"))?;
        let mut host = JsHost {
            ctx: ctx.clone(),
            engine: engine.clone(),
            state: state.clone(),
        };
        dispatcher
            .dispatch(call, &mut host, &mut args)
            .and_then(|ret| {
                let value = take_output(call, &mut args, ret);
                match value {
                    ScriptValue::U64(raw) if raw > MAX_SAFE_ID => Err(dispatcher.reject(
                        call.name,
                        &args,
                        ContractViolation::UnrepresentableId(EntityId::from_raw(raw)),
                    )),
                    value => Ok(value),
                }
            })
    };

    match result {
        Ok(value) => {
            let text = match &value {
                ScriptValue::String(string) => {
                    state.borrow().strings.get(string.0 as usize).cloned()
                }
                _ => None,
            };
            value_to_js(ctx, value, text.as_deref())
        }
        Err(err) => Err(throw(ctx, &err.to_string())),
    }
}

/// The script-visible result: the out-parameter when the call has one.
fn take_output(call: &InternalCall, args: &mut [ScriptValue], ret: ScriptValue) -> ScriptValue {
    let out = call
        .signature
        .params
        .iter()
        .position(|param| matches!(param, Param::Out(_)));
    match out {
        Some(index) => std::mem::replace(&mut args[index], ScriptValue::Void),
        None => ret,
    }
}

/// Entity identity as a JS number. Identities past 2^53 would round.
fn script_id(entity: EntityId) -> Result<f64, ContractViolation> {
    if entity.raw() > MAX_SAFE_ID {
        return Err(ContractViolation::UnrepresentableId(entity));
    }
    Ok(entity.raw() as f64)
}

/// Convert one script argument. Anything that does not fit `kind` becomes
/// [`ScriptValue::Void`] so the signature check reports it.
fn value_from_js(
    state: &RefCell<HostState>,
    kind: ValueKind,
    value: Option<&Value<'_>>,
) -> ScriptValue {
    let Some(value) = value else {
        return ScriptValue::Void;
    };
    let converted = match kind {
        ValueKind::Bool => value.as_bool().map(ScriptValue::Bool),
        ValueKind::I32 => integer(value)
            .filter(|n| (i32::MIN as f64..=i32::MAX as f64).contains(n))
            .map(|n| ScriptValue::I32(n as i32)),
        ValueKind::U16 => integer(value)
            .filter(|n| (0.0..=u16::MAX as f64).contains(n))
            .map(|n| ScriptValue::U16(n as u16)),
        ValueKind::U64 => integer(value)
            .filter(|n| (0.0..=MAX_SAFE_INTEGER).contains(n))
            .map(|n| ScriptValue::U64(n as u64)),
        ValueKind::F32 => value.as_number().map(|n| ScriptValue::F32(n as f32)),
        ValueKind::String => value
            .as_string()
            .and_then(|string| string.to_string().ok())
            .map(|text| ScriptValue::String(state.borrow_mut().push_string(text))),
        ValueKind::Type => integer(value)
            .filter(|n| (0.0..=u32::MAX as f64).contains(n))
            .map(|n| ScriptValue::Type(TypeToken(n as u32))),
        ValueKind::Struct { size } => value
            .as_object()
            .and_then(|object| vector_from_js(object, size)),
        ValueKind::Void | ValueKind::Object => None,
    };
    converted.unwrap_or(ScriptValue::Void)
}

fn integer(value: &Value<'_>) -> Option<f64> {
    value
        .as_number()
        .filter(|n| n.is_finite() && n.fract() == 0.0)
}

/// Read `{x, y, z, w}` into a float struct buffer of `size` bytes.
fn vector_from_js(object: &Object<'_>, size: usize) -> Option<ScriptValue> {
    let lanes = size / 4;
    if size % 4 != 0 || lanes == 0 || lanes > VECTOR_FIELDS.len() {
        return None;
    }
    let mut floats = Vec::with_capacity(lanes);
    for field in &VECTOR_FIELDS[..lanes] {
        let lane: f64 = object.get(*field).ok()?;
        floats.push(lane as f32);
    }
    Some(ScriptValue::Struct(bytemuck::cast_slice(&floats).to_vec()))
}

fn value_to_js<'js>(
    ctx: &Ctx<'js>,
    value: ScriptValue,
    text: Option<&str>,
) -> rquickjs::Result<Value<'js>> {
    let ctx = ctx.clone();
    Ok(match value {
        ScriptValue::Void => Value::new_undefined(ctx),
        ScriptValue::Bool(b) => Value::new_bool(ctx, b),
        ScriptValue::I32(n) => Value::new_int(ctx, n),
        ScriptValue::U16(n) => Value::new_int(ctx, n as i32),
        ScriptValue::U64(n) => Value::new_float(ctx, n as f64),
        ScriptValue::F32(n) => Value::new_float(ctx, n as f64),
        ScriptValue::Type(token) => Value::new_float(ctx, token.0 as f64),
        ScriptValue::String(_) => {
            rquickjs::String::from_str(ctx, text.unwrap_or_default())?.into()
        }
        ScriptValue::Object(Some(object)) => runtime_object(&ctx)?
            .get::<_, Function>("instance")?
            .call::<_, Value>((object.0 as f64,))?,
        ScriptValue::Object(None) => Value::new_null(ctx),
        ScriptValue::Struct(bytes) => {
            let vector = Object::new(ctx)?;
            for (field, lane) in VECTOR_FIELDS.iter().zip(bytes.chunks_exact(4)) {
                let lane: f32 = bytemuck::pod_read_unaligned(lane);
                vector.set(*field, lane as f64)?;
            }
            vector.into_value()
        }
    })
}

/// Raise a JS `Error` carrying `message`.
fn throw(ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    let error = ctx
        .globals()
        .get::<_, Function>("Error")
        .and_then(|ctor| ctor.call::<_, Value>((message,)));
    match error {
        Ok(error) => ctx.throw(error),
        Err(err) => err,
    }
}

fn js_error(ctx: &Ctx<'_>, err: rquickjs::Error) -> ScriptError {
    if !matches!(err, rquickjs::Error::Exception) {
        return ScriptError::Js(err);
    }
    let exception = ctx.catch();
    let message = exception
        .as_object()
        .and_then(|object| object.get::<_, String>("message").ok())
        .or_else(|| exception.as_string().and_then(|text| text.to_string().ok()))
        .unwrap_or_else(|| "unknown exception".to_owned());
    ScriptError::Exception(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use hearth_core::scene::{
        BodyType, Rigidbody2DComponent, Scene, TextComponent, TransformComponent,
    };
    use hearth_physics::PhysicsWorld;
    use hearth_services::{KeyCode, KeyboardState, LogLevel, MemoryLogSink, ScriptSettings};

    use crate::context::ScriptContext;

    struct Fixture {
        runtime: ScriptRuntime,
        scene: Rc<RefCell<Scene>>,
        keyboard: Rc<RefCell<KeyboardState>>,
        log: Rc<MemoryLogSink>,
        player: EntityId,
        enemy: EntityId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let player = scene.spawn("Player");
        scene
            .add_component(player, Rigidbody2DComponent::new(BodyType::Dynamic))
            .unwrap();
        scene
            .add_component(
                player,
                ScriptComponent {
                    class_name: "Sandbox.Player".into(),
                },
            )
            .unwrap();
        let enemy = scene.spawn("Enemy");
        scene.add_component(enemy, TextComponent::default()).unwrap();

        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        scene.on_physics_start(&mut physics);
        let physics = Rc::new(RefCell::new(physics));
        let scene = Rc::new(RefCell::new(scene));
        let keyboard = Rc::new(RefCell::new(KeyboardState::new()));
        let log = Rc::new(MemoryLogSink::new());

        let context = ScriptContext::new(keyboard.clone(), log.clone());
        let engine = ScriptEngine::new(ScriptSettings::default(), context);
        let runtime = ScriptRuntime::new(engine).unwrap();
        runtime.register_functions().unwrap();
        runtime.register_components().unwrap();
        runtime
            .on_runtime_start(SceneBinding::new(scene.clone(), physics))
            .unwrap();

        Fixture {
            runtime,
            scene,
            keyboard,
            log,
            player,
            enemy,
        }
    }

    const PLAYER_SCRIPT: &str = r#"
        class Player extends Hearth.Entity {
            onCreate() {
                this.body = this.getComponent(Hearth.Rigidbody2DComponent);
                this.ticks = 0;
            }
            onUpdate(ts) {
                this.ticks += 1;
                const t = this.translation;
                this.translation = new Hearth.Vector3(t.x + ts, t.y, t.z);
            }
        }
        Hearth.registerEntityClass("Sandbox.Player", Player);
    "#;

    #[test]
    fn binds_every_internal_call() {
        let fx = fixture();
        let bound: bool = fx
            .runtime
            .eval(
                "typeof Hearth.InternalCalls.TransformComponent_GetTranslation === 'function' \
                 && typeof Hearth.InternalCalls.Logger_cout === 'function'",
            )
            .unwrap();
        assert!(bound);
        assert_eq!(fx.runtime.register_functions().unwrap(), 35);
    }

    #[test]
    fn core_library_registers_its_component_classes() {
        let fx = fixture();
        let engine = fx.runtime.engine();
        let engine = engine.borrow();
        assert_eq!(engine.registry().len(), 4);
        assert_eq!(engine.registry().assembly(), Some(fx.runtime.core_assembly()));
    }

    #[test]
    fn scripts_move_entities() {
        let fx = fixture();
        fx.runtime
            .execute(&format!(
                "new Hearth.Entity({}).translation = {{ x: 1, y: 2, z: 3 }};",
                fx.player
            ))
            .unwrap();
        let translation = fx
            .scene
            .borrow()
            .get_component::<TransformComponent>(fx.player)
            .unwrap()
            .translation;
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));

        let y: f64 = fx
            .runtime
            .eval(&format!("new Hearth.Entity({}).translation.y", fx.player))
            .unwrap();
        assert_eq!(y, 2.0);
    }

    #[test]
    fn component_queries_follow_the_scene() {
        let fx = fixture();
        let source = format!(
            "const e = new Hearth.Entity({});\
             [e.hasComponent(Hearth.Rigidbody2DComponent), e.hasComponent(Hearth.TextComponent), \
              e.getComponent(Hearth.TextComponent) === null].join()",
            fx.player
        );
        let answer: String = fx.runtime.eval(&source).unwrap();
        assert_eq!(answer, "true,false,true");
    }

    #[test]
    fn find_entity_by_name_returns_null_for_misses() {
        let fx = fixture();
        let found: f64 = fx
            .runtime
            .eval("new Hearth.Entity().findEntityByName('Enemy').id")
            .unwrap();
        assert_eq!(found as u64, fx.enemy.raw());
        let missing: bool = fx
            .runtime
            .eval("new Hearth.Entity().findEntityByName('Boss') === null")
            .unwrap();
        assert!(missing);
    }

    #[test]
    fn text_survives_the_trip_both_ways() {
        let fx = fixture();
        let source = format!(
            "const text = new Hearth.Entity({}).getComponent(Hearth.TextComponent);\
             text.text = 'héllo 日本 🔥'; text.text",
            fx.enemy
        );
        let text: String = fx.runtime.eval(&source).unwrap();
        assert_eq!(text, "héllo 日本 🔥");
        assert_eq!(
            fx.scene
                .borrow()
                .get_component::<TextComponent>(fx.enemy)
                .unwrap()
                .text,
            "héllo 日本 🔥"
        );
    }

    #[test]
    fn violations_throw_into_the_script() {
        let fx = fixture();
        let message: String = fx
            .runtime
            .eval(
                "try { new Hearth.Entity(999).translation; 'no error' } \
                 catch (e) { e.message }",
            )
            .unwrap();
        assert!(message.contains("does not exist"), "{message}");

        let err = fx
            .runtime
            .execute(&format!(
                "new Hearth.Entity({}).getComponent(Hearth.Rigidbody2DComponent).type = 3;",
                fx.player
            ))
            .unwrap_err();
        assert!(
            matches!(err, ScriptError::Exception(ref msg) if msg.contains("BodyType")),
            "{err}"
        );
    }

    #[test]
    fn wrong_argument_shapes_are_rejected() {
        let fx = fixture();
        let message: String = fx
            .runtime
            .eval(
                "try { Hearth.InternalCalls.Entity_FindEntityByName(42); 'no error' } \
                 catch (e) { e.message }",
            )
            .unwrap();
        assert!(message.contains("argument 0"), "{message}");
    }

    #[test]
    fn impulses_reach_the_physics_world() {
        let fx = fixture();
        let source = format!(
            "const body = new Hearth.Entity({}).getComponent(Hearth.Rigidbody2DComponent);\
             body.applyLinearImpulse(new Hearth.Vector2(2, 0), true);\
             body.linearVelocity.x",
            fx.player
        );
        let vx: f64 = fx.runtime.eval(&source).unwrap();
        assert!(vx > 0.0);
    }

    #[test]
    fn entity_scripts_run_their_lifecycle() {
        let fx = fixture();
        fx.runtime.execute(PLAYER_SCRIPT).unwrap();
        assert!(fx.runtime.entity_class_exists("Sandbox.Player").unwrap());
        assert_eq!(fx.runtime.instantiate_entities().unwrap(), 1);

        fx.runtime.update_entities(0.5).unwrap();
        fx.runtime.update_entities(0.5).unwrap();
        let x = fx
            .scene
            .borrow()
            .get_component::<TransformComponent>(fx.player)
            .unwrap()
            .translation
            .x;
        assert_eq!(x, 1.0);

        let ticks: f64 = fx
            .runtime
            .eval(&format!("new Hearth.Entity({}).as().ticks", fx.player))
            .unwrap();
        assert_eq!(ticks, 2.0);
        let none: bool = fx
            .runtime
            .eval(&format!("new Hearth.Entity({}).as() === null", fx.enemy))
            .unwrap();
        assert!(none);
    }

    #[test]
    fn unknown_entity_classes_are_skipped() {
        let fx = fixture();
        assert!(!fx.runtime.on_create_entity(fx.enemy, "Sandbox.Ghost").unwrap());
        assert_eq!(fx.runtime.instantiate_entities().unwrap(), 0);
    }

    #[test]
    fn input_and_logging_go_through_services() {
        let fx = fixture();
        fx.keyboard.borrow_mut().press(KeyCode::SPACE);
        let down: bool = fx
            .runtime
            .eval("Hearth.Input.isKeyDown(Hearth.KeyCode.Space)")
            .unwrap();
        assert!(down);

        fx.runtime
            .execute("Hearth.Logger.warn('careful'); Hearth.Logger.cout('raw')")
            .unwrap();
        let entries = fx.log.take();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Some(LogLevel::Warn));
        assert_eq!(entries[0].message, "careful");
        assert_eq!(entries[1].level, None);
    }

    #[test]
    fn reload_hands_out_fresh_type_ids() {
        let fx = fixture();
        let before: f64 = fx
            .runtime
            .eval("Hearth.TransformComponent.__hearthTypeId")
            .unwrap();
        let report = fx.runtime.reload_core().unwrap();
        assert_eq!(report.registered.len(), 4);
        let after: f64 = fx
            .runtime
            .eval("Hearth.TransformComponent.__hearthTypeId")
            .unwrap();
        assert_ne!(before, after);

        let has: bool = fx
            .runtime
            .eval(&format!(
                "new Hearth.Entity({}).hasComponent(Hearth.TransformComponent)",
                fx.player
            ))
            .unwrap();
        assert!(has);
    }

    #[test]
    fn argument_getters_can_call_back_into_the_bridge() {
        let fx = fixture();
        let source = format!(
            "const e = new Hearth.Entity({});\
             e.translation = {{ \
                 get x() {{ Hearth.Logger.info('reading x'); return 1; }}, y: 2, z: 3 \
             }};",
            fx.player
        );
        fx.runtime.execute(&source).unwrap();
        let translation = fx
            .scene
            .borrow()
            .get_component::<TransformComponent>(fx.player)
            .unwrap()
            .translation;
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));

        let entries = fx.log.take();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "reading x");

        // Both calls released their string handles.
        assert!(fx.runtime.state.borrow().strings.is_empty());
    }

    #[test]
    fn failed_reload_leaves_no_component_types() {
        let fx = fixture();
        fx.runtime
            .execute("Object.defineProperty(globalThis, 'Hearth', { writable: false });")
            .unwrap();
        assert!(fx.runtime.reload_core().is_err());
        {
            let engine = fx.runtime.engine();
            let engine = engine.borrow();
            assert!(engine.registry().is_empty());
            assert_eq!(engine.registry().assembly(), None);
        }

        let message: String = fx
            .runtime
            .eval(&format!(
                "try {{ new Hearth.Entity({}).hasComponent(Hearth.TransformComponent); \
                 'no error' }} \
                 catch (e) {{ e.message }}",
                fx.player
            ))
            .unwrap();
        assert!(message.contains("not a registered component"), "{message}");
    }

    #[test]
    fn identities_past_the_script_number_range_are_rejected() {
        let fx = fixture();
        let big = EntityId::from_raw(MAX_SAFE_ID + 2);
        fx.scene.borrow_mut().spawn_with_id(big, "Big").unwrap();

        let message: String = fx
            .runtime
            .eval(
                "try { new Hearth.Entity().findEntityByName('Big'); 'no error' } \
                 catch (e) { e.message }",
            )
            .unwrap();
        assert!(message.contains("cannot be represented"), "{message}");

        fx.runtime.execute(PLAYER_SCRIPT).unwrap();
        assert!(matches!(
            fx.runtime.on_create_entity(big, "Sandbox.Player"),
            Err(ScriptError::Contract(ContractViolation::UnrepresentableId(id))) if id == big
        ));
        assert!(matches!(
            fx.runtime.on_update_entity(big, 0.1),
            Err(ScriptError::Contract(ContractViolation::UnrepresentableId(_)))
        ));
    }

    #[test]
    fn stopped_runtime_reports_no_scene() {
        let fx = fixture();
        fx.runtime.execute(PLAYER_SCRIPT).unwrap();
        fx.runtime.instantiate_entities().unwrap();
        fx.runtime.on_runtime_stop().unwrap();
        assert!(!fx.runtime.engine().borrow().is_running());

        let message: String = fx
            .runtime
            .eval("try { new Hearth.Entity(1).translation; '' } catch (e) { e.message }")
            .unwrap();
        assert!(message.contains("no active scene"), "{message}");
        assert!(matches!(
            fx.runtime.instantiate_entities(),
            Err(ScriptError::Contract(ContractViolation::NoActiveScene))
        ));
    }
}
