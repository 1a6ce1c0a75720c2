//! Inline event handlers compiled on first dispatch.

use std::path::Path;

use boa_engine::object::FunctionObjectBuilder;
use boa_engine::object::builtins::JsFunction;
use boa_engine::{Context, JsObject, JsResult, JsString, JsValue, NativeFunction, Script, Source, js_string};
use koala_common::warning::warn_once;
use koala_dom::NodeId;

use super::scope::{self, SCOPE_RESOLVER};
use super::{FunctionCache, SourceRecord, ToStringInterceptor};
use crate::{Diagnostic, ExecutionContext, HandlerError, WorldId};

/// An event handler attribute, kept as source until the first event that
/// needs it.
///
/// [§ 8.1.8.1 Getting the current value of the event handler](https://html.spec.whatwg.org/multipage/webappapis.html#getting-the-current-value-of-the-event-handler)
///
/// "If eventHandler's value is an internal raw uncompiled handler, then ...
/// let function be the result of calling OrdinaryFunctionCreate".
///
/// The compiled function is cached for the listener's lifetime and never
/// replaced. Failing to compile (no runtime, torn-down world, bad source)
/// leaves the cache empty so the next dispatch tries again.
#[derive(Debug)]
pub struct LazyEventListener {
    source: SourceRecord,
    world: WorldId,
    cache: FunctionCache,
    compile_count: u32,
}

impl LazyEventListener {
    /// A listener for `source` that runs in `world`.
    pub fn new(source: SourceRecord, world: WorldId) -> Self {
        Self {
            source,
            world,
            cache: FunctionCache::new(),
            compile_count: 0,
        }
    }

    /// The handler as authored.
    pub fn source(&self) -> &SourceRecord {
        &self.source
    }

    /// The world the handler runs in.
    pub fn world(&self) -> WorldId {
        self.world
    }

    /// Whether the handler has been compiled.
    pub fn is_compiled(&self) -> bool {
        !self.cache.is_empty()
    }

    /// The compiled function, if any.
    pub fn compiled_function(&self) -> Option<&JsFunction> {
        self.cache.get()
    }

    /// How many times the source has been handed to the engine.
    pub fn compile_count(&self) -> u32 {
        self.compile_count
    }

    /// Compile the handler if it is not compiled yet.
    ///
    /// Never fails: a missing runtime or world is logged at debug level and
    /// a compile error is logged as a warning once per distinct error.
    pub fn ensure_compiled(&mut self, context: &mut ExecutionContext) {
        let outcome = self.try_compile(context).map(|_| ());
        match outcome {
            Ok(()) => {}
            Err(HandlerError::Compile(diagnostic)) => warn_once("JS", &diagnostic.to_string()),
            Err(err) => tracing::debug!(
                function = self.source.function_name(),
                world = %self.world,
                error = %err,
                "event handler not compiled"
            ),
        }
    }

    /// Compile the handler if it is not compiled yet, reporting why it could
    /// not be.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::ScriptingDisabled`] if `context` has no runtime
    /// - [`HandlerError::WorldUnavailable`] if the listener's world is gone
    /// - [`HandlerError::Compile`] if the source does not compile
    pub fn try_compile(&mut self, context: &mut ExecutionContext) -> Result<&JsFunction, HandlerError> {
        let source = &self.source;
        let world = self.world;
        let compile_count = &mut self.compile_count;

        self.cache.get_or_try_insert_with(|| {
            let runtime = context.runtime_mut().ok_or(HandlerError::ScriptingDisabled)?;
            let realm = runtime.realm(world).ok_or(HandlerError::WorldUnavailable(world))?;
            *compile_count += 1;
            let function = runtime.with_realm(realm, |context| compile(source, context))?;
            tracing::debug!(
                function = source.function_name(),
                world = %world,
                url = source.source_url(),
                "compiled event handler"
            );
            Ok(function)
        })
    }

    /// Run the handler for an event targeted at `node`.
    ///
    /// Returns `Ok(None)` when there is nothing to run: the handler did not
    /// compile, scripting is off, or `node` has no script object in the
    /// listener's world. Otherwise the handler is called with the node as
    /// `this` and `event` as its only argument, and its result or exception
    /// is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns the exception thrown by the handler.
    pub fn invoke(
        &mut self,
        context: &mut ExecutionContext,
        event: &JsValue,
        node: NodeId,
    ) -> JsResult<Option<JsValue>> {
        self.ensure_compiled(context);
        let Some(function) = self.cache.get().cloned() else {
            return Ok(None);
        };

        let Some((tree, runtime)) = context.scripting() else {
            return Ok(None);
        };
        let receiver = match runtime.node_object(tree, self.world, node) {
            Ok(Some(receiver)) => receiver,
            Ok(None) => {
                tracing::debug!(error = %HandlerError::ReceiverUnresolvable(node), "event handler not run");
                return Ok(None);
            }
            Err(err) => {
                tracing::debug!(?node, error = %err, "failed to create receiver");
                return Ok(None);
            }
        };
        let Some(realm) = runtime.realm(self.world) else {
            return Ok(None);
        };

        runtime
            .with_realm(realm, |context| call_with_current_event(&function, &receiver, event, context))
            .map(Some)
    }
}

/// Compile `source` in the current realm into the handler function.
fn compile(source: &SourceRecord, context: &mut Context) -> Result<JsFunction, HandlerError> {
    let failed = |message: String| HandlerError::Compile(Diagnostic::new(source, message));

    let wrapped = scope::wrap_source(source.code());
    let script = Script::parse(
        Source::from_bytes(&wrapped).with_path(Path::new(source.source_url())),
        None,
        context,
    )
    .map_err(|err| failed(err.to_string()))?;
    let factory = script.evaluate(context).map_err(|err| failed(err.to_string()))?;
    let factory = as_function(&factory).ok_or_else(|| failed("handler wrapper is not a function".into()))?;

    let resolver = FunctionObjectBuilder::new(
        context.realm(),
        NativeFunction::from_fn_ptr(scope::resolve_handler_scope),
    )
    .name(JsString::from(SCOPE_RESOLVER))
    .length(1)
    .constructor(false)
    .build();

    let handler = factory
        .call(&JsValue::undefined(), &[resolver.into()], context)
        .map_err(|err| failed(err.to_string()))?;
    let handler = as_function(&handler).ok_or_else(|| failed("handler factory did not return a function".into()))?;

    ToStringInterceptor::shared()
        .attach(&handler, source, context)
        .map_err(|err| failed(err.to_string()))?;
    Ok(handler)
}

fn as_function(value: &JsValue) -> Option<JsFunction> {
    value.as_object().cloned().and_then(JsFunction::from_object)
}

/// Call `function` with `this = receiver` and `(event)`, exposing `event`
/// as the global `event` for the duration of the call.
///
/// [§ 2.10 Interface Window (legacy event)](https://dom.spec.whatwg.org/#ref-for-dom-window-event)
///
/// Compiled handlers name their parameter `evt`, so HTML handlers that say
/// `event` find it on the global object.
fn call_with_current_event(
    function: &JsFunction,
    receiver: &JsObject,
    event: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let global = context.global_object();
    let key = js_string!("event");
    let previous = if global.has_own_property(key.clone(), context)? {
        Some(global.get(key.clone(), context)?)
    } else {
        None
    };
    let _ = global.set(key.clone(), event.clone(), false, context)?;

    let result = function.call(&receiver.clone().into(), std::slice::from_ref(event), context);

    match previous {
        Some(previous) => {
            let _ = global.set(key, previous, false, context)?;
        }
        None => {
            let _ = global.delete_property_or_throw(key, context)?;
        }
    }
    result
}
