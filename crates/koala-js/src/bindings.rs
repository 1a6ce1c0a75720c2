//! Script objects for DOM nodes.
//!
//! [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
//!
//! Each world gets its own object per node, created the first time the node
//! is needed and cached for the world's lifetime, so identity holds within a
//! world (`input.form === form`) and never leaks across worlds.
//!
//! Objects carry plain data properties computed from the DOM when the object
//! is created:
//!
//! - every node: `nodeName`, `ownerDocument` (`null` on the document)
//! - elements: `tagName`, plus `id`, `name` and `value` when the attribute
//!   is present
//! - form-associated elements: `form` (the form owner or `null`)
//! - forms: each owned control that has a `name`, under that name
//! - the document: each form that has a `name`, under that name
//!
//! These are the properties inline handlers find through their scope chain.

use boa_engine::property::PropertyKey;
use boa_engine::{Context, JsObject, JsResult, JsString, JsValue, js_string};
use koala_dom::{DomTree, ElementData, HandlerScope, Namespace, NodeId, NodeType};

use crate::{JsRuntime, WorldId};

impl JsRuntime {
    /// The script object for `node` in `world`.
    ///
    /// Returns `None` if the world is gone or the node does not exist.
    ///
    /// # Errors
    ///
    /// Returns `JsError` if Boa rejects a property definition.
    pub fn node_object(&mut self, tree: &DomTree, world: WorldId, node: NodeId) -> JsResult<Option<JsObject>> {
        if let Some(object) = self.node_objects.get(&(world, node)) {
            return Ok(Some(object.clone()));
        }
        if tree.get(node).is_none() {
            return Ok(None);
        }
        let Some(realm) = self.realm(world) else {
            return Ok(None);
        };

        let previous = self.context.enter_realm(realm);
        let object = self.bind_node(tree, world, node);
        let _ = self.context.enter_realm(previous);
        object.map(Some)
    }

    /// A minimal event object for `world`.
    ///
    /// [§ 2.2 Interface Event](https://dom.spec.whatwg.org/#interface-event)
    ///
    /// Returns `None` if the world is gone.
    ///
    /// # Errors
    ///
    /// Returns `JsError` if Boa rejects a property definition.
    pub fn create_event(
        &mut self,
        world: WorldId,
        event_type: &str,
        target: Option<JsObject>,
    ) -> JsResult<Option<JsObject>> {
        let Some(realm) = self.realm(world) else {
            return Ok(None);
        };
        self.with_realm(realm, |context| {
            let event = JsObject::with_object_proto(context.intrinsics());
            let target: JsValue = target.map_or_else(JsValue::null, JsValue::from);
            define(&event, js_string!("type"), JsString::from(event_type), context)?;
            define(&event, js_string!("target"), target.clone(), context)?;
            define(&event, js_string!("currentTarget"), target, context)?;
            Ok(Some(event))
        })
    }

    /// Create (or fetch) the object for `node`. The current realm must be
    /// `world`'s.
    fn bind_node(&mut self, tree: &DomTree, world: WorldId, node: NodeId) -> JsResult<JsObject> {
        if let Some(object) = self.node_objects.get(&(world, node)) {
            return Ok(object.clone());
        }

        // Cache before filling in properties: a form's controls point back
        // at the form, and every node points at the document.
        let object = JsObject::with_object_proto(self.context.intrinsics());
        let _ = self.node_objects.insert((world, node), object.clone());

        let (Some(node_data), Some(scope)) = (tree.get(node), tree.handler_scope(node)) else {
            return Ok(object);
        };
        match &node_data.node_type {
            NodeType::Document => {
                self.define(&object, "nodeName", js_string!("#document"))?;
                self.bind_named_forms(tree, world, &object)?;
            }
            NodeType::Element(element) => {
                self.bind_element(tree, world, element, scope, &object)?;
            }
            NodeType::Text(_) => self.define(&object, "nodeName", js_string!("#text"))?,
            NodeType::Comment(_) => self.define(&object, "nodeName", js_string!("#comment"))?,
        }

        let document = self.bind_optional(tree, world, scope.document)?;
        self.define(&object, "ownerDocument", document)?;
        Ok(object)
    }

    fn bind_element(
        &mut self,
        tree: &DomTree,
        world: WorldId,
        element: &ElementData,
        scope: HandlerScope,
        object: &JsObject,
    ) -> JsResult<()> {
        // [§ 4.9 tagName](https://dom.spec.whatwg.org/#dom-element-tagname)
        // "If this is in the HTML namespace and its node document is an HTML
        // document, then set qualifiedName to qualifiedName in ASCII uppercase."
        let tag_name = match element.namespace {
            Namespace::Html => element.tag_name.to_ascii_uppercase(),
            Namespace::Svg => element.tag_name.clone(),
        };
        self.define(object, "nodeName", JsString::from(tag_name.as_str()))?;
        self.define(object, "tagName", JsString::from(tag_name.as_str()))?;
        for attribute in ["id", "name", "value"] {
            if let Some(value) = element.attribute(attribute) {
                self.define(object, attribute, JsString::from(value))?;
            }
        }

        if element.is_form_associated() {
            let form = self.bind_optional(tree, world, scope.form)?;
            self.define(object, "form", form)?;
        }

        if element.is_html("form") {
            for control in tree.form_controls(scope.node) {
                let Some(name) = tree.as_element(control).and_then(ElementData::name) else {
                    continue;
                };
                let control_object = self.bind_node(tree, world, control)?;
                self.define_if_absent(object, name, control_object)?;
            }
        }
        Ok(())
    }

    /// The object for `node`, or `null`.
    fn bind_optional(&mut self, tree: &DomTree, world: WorldId, node: Option<NodeId>) -> JsResult<JsValue> {
        match node {
            Some(node) => Ok(self.bind_node(tree, world, node)?.into()),
            None => Ok(JsValue::null()),
        }
    }

    /// [§ 3.1.5 Named properties on Document](https://html.spec.whatwg.org/multipage/dom.html#dom-document-nameditem)
    ///
    /// "form ... elements that have a name content attribute"
    fn bind_named_forms(&mut self, tree: &DomTree, world: WorldId, document: &JsObject) -> JsResult<()> {
        let named_forms: Vec<(NodeId, &str)> = tree
            .descendants(NodeId::ROOT)
            .filter_map(|id| {
                let element = tree.as_element(id)?;
                element.is_html("form").then_some((id, element.name()?))
            })
            .collect();
        for (form, name) in named_forms {
            let form_object = self.bind_node(tree, world, form)?;
            self.define_if_absent(document, name, form_object)?;
        }
        Ok(())
    }

    fn define(&mut self, object: &JsObject, name: &str, value: impl Into<JsValue>) -> JsResult<()> {
        define(object, JsString::from(name), value, &mut self.context)
    }

    /// First definition wins, as with named properties in tree order.
    fn define_if_absent(&mut self, object: &JsObject, name: &str, value: impl Into<JsValue>) -> JsResult<()> {
        let key = PropertyKey::from(JsString::from(name));
        if object.has_own_property(key.clone(), &mut self.context)? {
            return Ok(());
        }
        define(object, key, value, &mut self.context)
    }
}

fn define(
    object: &JsObject,
    key: impl Into<PropertyKey>,
    value: impl Into<JsValue>,
    context: &mut Context,
) -> JsResult<()> {
    let _ = object.create_data_property_or_throw(key, value, context)?;
    Ok(())
}
