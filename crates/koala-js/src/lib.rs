//! JavaScript engine integration for the Koala renderer.
//!
//! Uses [Boa](https://boajs.dev/) as the JavaScript engine.
//!
//! # Example
//!
//! ```ignore
//! use koala_js::JsRuntime;
//!
//! let mut runtime = JsRuntime::new();
//! runtime.execute("console.log('Hello from JS!');").unwrap();
//! ```
//!
//! # Implemented
//!
//! - Script execution via `JsRuntime::execute()`
//! - `console.log()`, `console.warn()`, `console.error()`, forwarded to `tracing`
//! - Isolated worlds: one Boa realm per [`WorldId`]
//! - Node objects for the DOM (`nodeName`, `tagName`, `id`, `name`,
//!   `ownerDocument`, `form`, named form controls and named forms)
//! - Inline event handlers ([`LazyEventListener`], [`EventHandlerMap`])
//!
//! ## Inline event handlers
//!
//! [§ 8.1.8.1 Event handlers](https://html.spec.whatwg.org/multipage/webappapis.html#event-handler-attributes)
//!
//! An `onclick="..."` attribute is kept as text until the first event
//! reaches it. The first dispatch compiles it once, inside the listener's
//! world, into a function whose free identifiers resolve against the element,
//! then its form owner, then its document. `toString()` on that function
//! returns the authored source, not the wrapper the engine actually compiled.
//!
//! # Not Yet Implemented
//!
//! ## Events
//!
//! [§ 2.6 Interface EventTarget](https://dom.spec.whatwg.org/#interface-eventtarget)
//! - `addEventListener()` / `removeEventListener()`
//! - Capture and bubble propagation (handlers run on their own node only)
//!
//! ## Timers
//!
//! [§ 8.6 Timers](https://html.spec.whatwg.org/multipage/timers-and-user-prompts.html#timers)
//! - `setTimeout()` / `clearTimeout()`

mod bindings;
mod context;
mod error;
mod event_handlers;
pub mod event_listener;
mod globals;
mod world;

pub use context::ExecutionContext;
pub use error::{Diagnostic, HandlerError};
pub use event_handlers::EventHandlerMap;
pub use event_listener::{LazyEventListener, ScopeChain, SourceRecord, TextPosition, ToStringInterceptor};
pub use world::WorldId;

use std::collections::HashMap;

use boa_engine::realm::Realm;
use boa_engine::{Context, JsError, JsNativeError, JsObject, JsResult, JsValue, Source};
use koala_dom::NodeId;

/// JavaScript runtime for a document.
///
/// [§ 8.1.6 JavaScript execution context](https://html.spec.whatwg.org/multipage/webappapis.html)
///
/// Each document has its own JavaScript runtime. The runtime owns one Boa
/// context and the realms of every world running in it: the main world is the
/// context's initial realm, isolated worlds get a realm each. The context is
/// always left in the main world's realm between calls.
pub struct JsRuntime {
    /// The Boa JavaScript context.
    context: Context,
    /// Live worlds and their realms.
    worlds: HashMap<WorldId, Realm>,
    /// Last isolated world id handed out; ids are never reused.
    last_isolated_world: u32,
    /// Node objects per world, created on first use.
    node_objects: HashMap<(WorldId, NodeId), JsObject>,
}

impl JsRuntime {
    /// Create a new JavaScript runtime with global objects registered.
    ///
    /// This initializes the Boa context and registers built-in globals
    /// like `console`.
    #[must_use]
    pub fn new() -> Self {
        let mut context = Context::default();
        globals::register_globals(&mut context);
        let worlds = HashMap::from([(WorldId::MAIN, context.realm().clone())]);
        Self {
            context,
            worlds,
            last_isolated_world: 0,
            node_objects: HashMap::new(),
        }
    }

    /// Execute JavaScript source code in the main world.
    ///
    /// [§ 4.12.1.1 Processing model](https://html.spec.whatwg.org/multipage/scripting.html#script-processing-model)
    ///
    /// # Errors
    ///
    /// Returns `JsError` if the JavaScript code contains syntax errors or
    /// throws an uncaught exception.
    pub fn execute(&mut self, source: &str) -> Result<JsValue, JsError> {
        self.context.eval(Source::from_bytes(source))
    }

    /// Execute JavaScript source code in `world`.
    ///
    /// # Errors
    ///
    /// Returns `JsError` if the world was destroyed, or if the code fails
    /// to parse or throws.
    pub fn execute_in_world(&mut self, world: WorldId, source: &str) -> JsResult<JsValue> {
        let realm = self.realm(world).ok_or_else(|| {
            JsNativeError::error().with_message(format!("script world {world} is not available"))
        })?;
        self.with_realm(realm, |context| context.eval(Source::from_bytes(source)))
    }

    /// Create a new isolated world with its own global object.
    ///
    /// # Errors
    ///
    /// Returns `JsError` if Boa fails to create the realm.
    pub fn create_isolated_world(&mut self) -> JsResult<WorldId> {
        let realm = self.context.create_realm()?;
        self.with_realm(realm.clone(), globals::register_globals);

        self.last_isolated_world += 1;
        let world = WorldId::isolated(self.last_isolated_world);
        let _ = self.worlds.insert(world, realm);
        tracing::debug!(%world, "created isolated world");
        Ok(world)
    }

    /// Tear down an isolated world. Its realm and node objects are released
    /// and the id never resolves again.
    ///
    /// Returns `false` for the main world, which lives as long as the
    /// runtime, and for worlds that are already gone.
    pub fn destroy_world(&mut self, world: WorldId) -> bool {
        if world == WorldId::MAIN || self.worlds.remove(&world).is_none() {
            return false;
        }
        self.node_objects.retain(|(owner, _), _| *owner != world);
        tracing::debug!(%world, "destroyed isolated world");
        true
    }

    /// Whether `world` is live in this runtime.
    pub fn has_world(&self, world: WorldId) -> bool {
        self.worlds.contains_key(&world)
    }

    /// The realm backing `world`, if it is live.
    pub fn realm(&self, world: WorldId) -> Option<Realm> {
        self.worlds.get(&world).cloned()
    }

    /// Run `f` with `realm` as the current realm, restoring the previous
    /// realm afterwards whatever `f` returns.
    pub fn with_realm<R>(&mut self, realm: Realm, f: impl FnOnce(&mut Context) -> R) -> R {
        let previous = self.context.enter_realm(realm);
        let result = f(&mut self.context);
        let _ = self.context.enter_realm(previous);
        result
    }

    /// The underlying Boa context, for embedders that need raw engine access.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

impl Default for JsRuntime {
    fn default() -> Self {
        Self::new()
    }
}
