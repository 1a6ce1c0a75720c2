//! Scope of an inline event handler.
//!
//! [§ 8.1.8.1 Getting the current value of the event handler](https://html.spec.whatwg.org/multipage/webappapis.html#getting-the-current-value-of-the-event-handler)
//!
//! "If element is not null, then set scope to NewObjectEnvironment(document,
//! true, scope). If form owner is not null, then set scope to
//! NewObjectEnvironment(form owner, true, scope). If element is not null,
//! then set scope to NewObjectEnvironment(element, true, scope)."
//!
//! The handler is compiled inside a factory that receives a scope resolver.
//! On every call the resolver builds a [`ScopeChain`] for the receiver and
//! hands the compiled code its links, which the wrapper enters as nested
//! `with` blocks, document outermost. Each link is its own object
//! environment, so a function found on the form and called bare runs with
//! the form as `this`.
//!
//! The wrapper's internal names are redeclared at the top of the handler
//! function, so the authored body cannot see them.
//!
//! Nothing before the authored body contains a newline, so line `n` of the
//! body is line `n` of the compiled unit and engine diagnostics point at the
//! right document line.

use boa_engine::object::builtins::JsArray;
use boa_engine::property::PropertyKey;
use boa_engine::{Context, JsArgs, JsNativeError, JsObject, JsResult, JsValue, js_string};

/// Name of the factory parameter that receives the scope resolver.
pub const SCOPE_RESOLVER: &str = "__koalaHandlerScope";

/// Number of object environments the wrapper enters: element, form owner,
/// document.
pub const SCOPE_DEPTH: usize = 3;

/// Everything before the authored body. Must stay on one line.
const PROLOGUE: &str = "(function (__koalaHandlerScope) {return (function (evt) {\
                        return (function (__koalaScopes) {\
                        with (__koalaScopes[2]) {with (__koalaScopes[1]) {with (__koalaScopes[0]) {\
                        return (function(evt){var __koalaHandlerScope, __koalaScopes;";

/// Everything after the authored body. The leading newline ends any `//`
/// comment on the body's last line.
const EPILOGUE: &str = "\n}).call(this, evt);}}}}).call(this, __koalaHandlerScope(this));});})";

/// Wrap an authored handler body into a compilable unit.
///
/// Evaluating the unit yields a factory; calling the factory with the scope
/// resolver yields the handler function, which takes the event as `evt`
/// and runs the body with the receiver's scope chain in effect.
pub fn wrap_source(code: &str) -> String {
    let mut wrapped = String::with_capacity(PROLOGUE.len() + code.len() + EPILOGUE.len());
    wrapped.push_str(PROLOGUE);
    wrapped.push_str(code);
    wrapped.push_str(EPILOGUE);
    wrapped
}

/// Byte offset of the authored body inside [`wrap_source`]'s output.
pub const fn body_offset() -> usize {
    PROLOGUE.len()
}

/// The objects a handler's free identifiers resolve against, innermost
/// first: the element, its form owner, its document.
#[derive(Debug, Clone)]
pub struct ScopeChain {
    links: Vec<JsObject>,
}

impl ScopeChain {
    /// Build a chain from explicit links, innermost first.
    pub fn new(links: Vec<JsObject>) -> Self {
        Self { links }
    }

    /// The chain for a handler whose `this` is `receiver`.
    ///
    /// The form and document come from the receiver's own `form` and
    /// `ownerDocument` properties, which node objects carry. A receiver
    /// without them (the document itself, a plain object) scopes only to
    /// itself.
    ///
    /// # Errors
    ///
    /// Propagates exceptions thrown by getters on the receiver.
    pub fn for_receiver(receiver: &JsObject, context: &mut Context) -> JsResult<Self> {
        let mut links = vec![receiver.clone()];
        for key in [js_string!("form"), js_string!("ownerDocument")] {
            if let Some(link) = receiver.get(key, context)?.as_object() {
                links.push(link.clone());
            }
        }
        Ok(Self { links })
    }

    /// The chain's objects, innermost first.
    pub fn links(&self) -> &[JsObject] {
        &self.links
    }

    /// The first object in the chain that has `key`, own or inherited.
    ///
    /// # Errors
    ///
    /// Propagates exceptions from exotic objects' `has` behavior.
    pub fn resolve(&self, key: &PropertyKey, context: &mut Context) -> JsResult<Option<&JsObject>> {
        for link in &self.links {
            if link.has_property(key.clone(), context)? {
                return Ok(Some(link));
            }
        }
        Ok(None)
    }

    /// Expose the chain to script as an array of exactly [`SCOPE_DEPTH`]
    /// objects, innermost first, for the wrapper's nested `with` blocks.
    ///
    /// Missing outer links are filled with empty null-prototype objects,
    /// which no lookup stops at.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the chain has more than [`SCOPE_DEPTH`]
    /// links.
    pub fn into_environments(self, context: &mut Context) -> JsResult<JsValue> {
        if self.links.len() > SCOPE_DEPTH {
            return Err(JsNativeError::typ()
                .with_message(format!("handler scope has {} links, at most {SCOPE_DEPTH} fit", self.links.len()))
                .into());
        }
        let padding = SCOPE_DEPTH - self.links.len();
        let environments = self
            .links
            .into_iter()
            .chain(std::iter::repeat_with(JsObject::with_null_proto).take(padding))
            .map(JsValue::from);
        Ok(JsArray::from_iter(environments, context).into())
    }
}

/// The resolver passed to the compiled factory: `(receiver) -> [element,
/// form, document]`.
///
/// A primitive receiver gets an empty scope.
pub(crate) fn resolve_handler_scope(
    _this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let Some(receiver) = args.get_or_undefined(0).as_object() else {
        return ScopeChain::new(Vec::new()).into_environments(context);
    };
    ScopeChain::for_receiver(receiver, context)?.into_environments(context)
}
