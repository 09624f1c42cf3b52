//! Script engine: owns the call context and registry, dispatches calls
//!
//! Every internal call funnels through [`ScriptEngine::dispatch`], which
//! checks the signature, runs the entry and turns contract violations into
//! logged [`InteropError`]s.

use hearth_core::scene::EntityId;
use hearth_services::ScriptSettings;

use crate::context::{SceneBinding, ScriptContext};
use crate::error::{ContractViolation, InteropError};
use crate::glue::{self, CallContext, InternalCall};
use crate::host::ScriptHost;
use crate::registry::{ComponentRegistry, RegistrationReport};
use crate::value::{AssemblyId, ScriptValue};

pub struct ScriptEngine {
    settings: ScriptSettings,
    context: ScriptContext,
    registry: ComponentRegistry,
}

impl ScriptEngine {
    pub fn new(settings: ScriptSettings, context: ScriptContext) -> Self {
        Self {
            settings,
            context,
            registry: ComponentRegistry::new(),
        }
    }

    pub fn settings(&self) -> &ScriptSettings {
        &self.settings
    }

    pub fn context(&self) -> &ScriptContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ScriptContext {
        &mut self.context
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Name managed code binds `name` under.
    pub fn qualified_name(&self, name: &str) -> String {
        glue::qualified_name(
            &self.settings.namespace,
            &self.settings.internal_calls_class,
            name,
        )
    }

    /// Bind every internal call in `host`. Safe to repeat after a reload.
    pub fn register_functions(&self, host: &mut dyn ScriptHost) -> usize {
        let calls = glue::internal_calls();
        for call in calls {
            host.add_internal_call(&self.qualified_name(call.name), call);
        }
        tracing::debug!(count = calls.len(), "registered internal calls");
        calls.len()
    }

    /// Rebuild the capability registry against a freshly loaded core assembly.
    pub fn register_components(
        &mut self,
        host: &mut dyn ScriptHost,
        image: AssemblyId,
    ) -> RegistrationReport {
        let report = self
            .registry
            .register(host, image, &self.settings.namespace);
        if !report.missing.is_empty() {
            tracing::warn!(
                missing = report.missing.len(),
                "some component kinds have no managed counterpart"
            );
        }
        report
    }

    /// Forget every component type before the core assembly is replaced.
    pub fn unload_components(&mut self) {
        self.registry.clear();
        tracing::debug!("component registry cleared");
    }

    pub fn on_runtime_start(&mut self, binding: SceneBinding) {
        self.context.activate(binding);
        tracing::info!("script runtime started");
    }

    pub fn on_runtime_stop(&mut self) -> Option<SceneBinding> {
        let binding = self.context.deactivate();
        tracing::info!("script runtime stopped");
        binding
    }

    pub fn is_running(&self) -> bool {
        self.context.is_active()
    }

    /// Run one internal call with signature checking and violation reporting.
    pub fn dispatch(
        &self,
        call: &InternalCall,
        host: &mut dyn ScriptHost,
        args: &mut [ScriptValue],
    ) -> Result<ScriptValue, InteropError> {
        if let Err(violation) = call.signature.check(args) {
            return Err(self.reject(call.name, args, violation));
        }

        let mut cx = CallContext {
            context: &self.context,
            registry: &self.registry,
            host,
        };
        match (call.func)(&mut cx, args) {
            Ok(value) => {
                debug_assert_eq!(
                    value.kind(),
                    call.signature.ret,
                    "{} returned the wrong kind",
                    call.name
                );
                tracing::trace!(call = call.name, "internal call");
                Ok(value)
            }
            Err(violation) => Err(self.reject(call.name, args, violation)),
        }
    }

    /// Dispatch by name, qualified or not.
    pub fn invoke(
        &self,
        name: &str,
        host: &mut dyn ScriptHost,
        args: &mut [ScriptValue],
    ) -> Result<ScriptValue, InteropError> {
        let prefix = self.qualified_name("");
        let short = name.strip_prefix(prefix.as_str()).unwrap_or(name);
        match glue::find(short) {
            Some(call) => self.dispatch(call, host, args),
            None => Err(self.reject(name, args, ContractViolation::UnknownCall(name.to_owned()))),
        }
    }

    /// Log a violation with its call context and build the error.
    ///
    /// Panics instead when halting is configured and this is a debug build.
    pub(crate) fn reject(
        &self,
        call: &str,
        args: &[ScriptValue],
        violation: ContractViolation,
    ) -> InteropError {
        let entity = violation.entity().or(match args.first() {
            Some(ScriptValue::U64(raw)) => Some(EntityId::from_raw(*raw)),
            _ => None,
        });
        tracing::error!(
            call,
            entity = entity.map(|id| id.raw()),
            component = violation.component(),
            "contract violation: {violation}"
        );

        let error = InteropError {
            call: call.to_owned(),
            entity,
            violation,
        };
        if cfg!(debug_assertions) && self.settings.halt_on_contract_violation {
            panic!("halting on contract violation: {error}");
        }
        error
    }
}
