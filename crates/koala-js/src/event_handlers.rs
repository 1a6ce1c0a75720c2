//! Inline event handlers registered on a document's nodes.
//!
//! [§ 8.1.8.1 Event handler content attributes](https://html.spec.whatwg.org/multipage/webappapis.html#event-handler-content-attributes)
//!
//! "When an event handler content attribute is set ... set the event
//! handler's value to an internal raw uncompiled handler". The map holds one
//! [`LazyEventListener`] per (node, event type); nothing is compiled until
//! [`EventHandlerMap::dispatch`] needs it.

use std::collections::HashMap;

use boa_engine::{JsResult, JsValue};
use koala_dom::{DomTree, Namespace, NodeId, is_event_handler_attribute};

use crate::event_listener::{LazyEventListener, SourceRecord, TextPosition};
use crate::{ExecutionContext, WorldId};

/// Inline event handlers keyed by node and event type.
#[derive(Debug, Default)]
pub struct EventHandlerMap {
    listeners: HashMap<(NodeId, String), LazyEventListener>,
}

impl EventHandlerMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler held in `node`'s `attribute`, replacing any
    /// handler for the same event. The replaced listener's compiled
    /// function, if any, is released.
    ///
    /// Returns `false` if `node` is not an element, `attribute` is not an
    /// `on*` attribute, or the element does not carry it.
    pub fn set_attribute_handler(
        &mut self,
        tree: &DomTree,
        node: NodeId,
        attribute: &str,
        world: WorldId,
        source_url: &str,
        position: TextPosition,
    ) -> bool {
        if !is_event_handler_attribute(attribute) {
            return false;
        }
        let Some(element) = tree.as_element(node) else {
            return false;
        };
        let Some(code) = element.attribute(attribute) else {
            return false;
        };

        let function_name = attribute.to_ascii_lowercase();
        let event_type = function_name[2..].to_string();
        let source = SourceRecord::new(function_name, code)
            .with_svg_event(element.namespace == Namespace::Svg)
            .with_origin(source_url, position);
        tracing::trace!(?node, event = %event_type, %world, "registered inline handler");
        let _ = self.insert(node, event_type, LazyEventListener::new(source, world));
        true
    }

    /// Register every `on*` attribute in `tree`, in tree order.
    ///
    /// The tree keeps no source locations, so every handler registered
    /// this way starts at line 1, column 1 and diagnostics report lines
    /// relative to the attribute value. Use
    /// [`register_inline_handlers_at`](Self::register_inline_handlers_at)
    /// when the parser recorded where each attribute began.
    ///
    /// Returns the number of handlers registered.
    pub fn register_inline_handlers(&mut self, tree: &DomTree, source_url: &str, world: WorldId) -> usize {
        self.register_inline_handlers_at(tree, source_url, world, |_, _| TextPosition::default())
    }

    /// Register every `on*` attribute in `tree`, in tree order, taking each
    /// handler's document position from `position_of(node, attribute)`.
    ///
    /// Returns the number of handlers registered.
    pub fn register_inline_handlers_at(
        &mut self,
        tree: &DomTree,
        source_url: &str,
        world: WorldId,
        mut position_of: impl FnMut(NodeId, &str) -> TextPosition,
    ) -> usize {
        let mut registered = 0;
        for node in tree.descendants(tree.root()) {
            let Some(element) = tree.as_element(node) else {
                continue;
            };
            for (attribute, _) in element.event_handler_attributes() {
                let position = position_of(node, attribute);
                if self.set_attribute_handler(tree, node, attribute, world, source_url, position) {
                    registered += 1;
                }
            }
        }
        tracing::debug!(url = source_url, %world, registered, "registered inline handlers");
        registered
    }

    /// Register `listener` for `event_type` on `node`, returning the
    /// listener it replaces.
    pub fn insert(
        &mut self,
        node: NodeId,
        event_type: impl Into<String>,
        listener: LazyEventListener,
    ) -> Option<LazyEventListener> {
        self.listeners.insert((node, event_type.into()), listener)
    }

    /// Remove the handler for `event_type` on `node`.
    pub fn remove_handler(&mut self, node: NodeId, event_type: &str) -> Option<LazyEventListener> {
        self.listeners.remove(&(node, event_type.to_string()))
    }

    /// Remove every handler on `node`. Returns how many were removed.
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|(owner, _), _| *owner != node);
        before - self.listeners.len()
    }

    /// The handler for `event_type` on `node`.
    pub fn listener(&self, node: NodeId, event_type: &str) -> Option<&LazyEventListener> {
        self.listeners.get(&(node, event_type.to_string()))
    }

    /// Mutable access to the handler for `event_type` on `node`.
    pub fn listener_mut(&mut self, node: NodeId, event_type: &str) -> Option<&mut LazyEventListener> {
        self.listeners.get_mut(&(node, event_type.to_string()))
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Fire an `event_type` event at `node`, running its inline handler.
    ///
    /// [§ 2.9 Dispatching events](https://dom.spec.whatwg.org/#concept-event-dispatch)
    ///
    /// The event object is created in the handler's world with `type`,
    /// `target` and `currentTarget` set. Only the handler on `node` itself
    /// runs; there is no propagation.
    ///
    /// Returns `Ok(None)` when there is no handler or nothing could run.
    ///
    /// # Errors
    ///
    /// Returns the exception thrown by the handler.
    pub fn dispatch(
        &mut self,
        context: &mut ExecutionContext,
        node: NodeId,
        event_type: &str,
    ) -> JsResult<Option<JsValue>> {
        let Some(listener) = self.listeners.get_mut(&(node, event_type.to_string())) else {
            return Ok(None);
        };
        let world = listener.world();

        let Some((tree, runtime)) = context.scripting() else {
            return Ok(None);
        };
        let target = runtime.node_object(tree, world, node)?;
        let Some(event) = runtime.create_event(world, event_type, target)? else {
            return Ok(None);
        };

        tracing::trace!(?node, event = event_type, %world, "dispatching event");
        listener.invoke(context, &event.into(), node)
    }
}
