//! DOM tree implementation for the Koala browser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//!
//! Besides tree structure the crate answers the questions inline event
//! handlers need: which form owns a control, which document owns a node, and
//! which `on*` attributes an element carries.

use std::collections::HashMap;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#concept-element-namespace)
///
/// "Elements have an associated namespace."
///
/// Only the two namespaces that change event handler behavior are modeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `http://www.w3.org/1999/xhtml`
    #[default]
    Html,
    /// `http://www.w3.org/2000/svg`
    Svg,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name..."
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element's namespace"
    pub namespace: Namespace,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create an HTML element with no attributes.
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            namespace: Namespace::Html,
            attrs: AttributesMap::new(),
        }
    }

    /// Create an SVG element with no attributes.
    pub fn svg(tag_name: &str) -> Self {
        Self {
            namespace: Namespace::Svg,
            ..Self::new(tag_name)
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Returns the element's `name` attribute value if present.
    pub fn name(&self) -> Option<&str> {
        self.attribute("name")
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether this is an HTML element with the given local name.
    pub fn is_html(&self, local_name: &str) -> bool {
        self.namespace == Namespace::Html && self.tag_name.eq_ignore_ascii_case(local_name)
    }

    /// [§ 4.10.18.1 Form-associated elements](https://html.spec.whatwg.org/multipage/forms.html#category-listed)
    ///
    /// "Listed elements: button, fieldset, input, object, output, select,
    /// textarea". These are the elements whose script objects expose `form`.
    pub fn is_form_associated(&self) -> bool {
        const LISTED: [&str; 7] = [
            "button", "fieldset", "input", "object", "output", "select", "textarea",
        ];
        LISTED.iter().any(|tag| self.is_html(tag))
    }

    /// The element's `on*` attributes, sorted by name.
    ///
    /// [§ 8.1.8.1 Event handlers](https://html.spec.whatwg.org/multipage/webappapis.html#event-handler-content-attributes)
    /// "Event handler content attributes, when specified, must contain valid
    /// JavaScript code".
    pub fn event_handler_attributes(&self) -> Vec<(&str, &str)> {
        let mut handlers: Vec<(&str, &str)> = self
            .attrs
            .iter()
            .filter(|(name, _)| is_event_handler_attribute(name))
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        handlers.sort_unstable_by(|a, b| a.0.cmp(b.0));
        handlers
    }
}

/// Whether an attribute name names an event handler (`onclick`, `onload`...).
pub fn is_event_handler_attribute(name: &str) -> bool {
    name.len() > 2 && name.as_bytes()[..2].eq_ignore_ascii_case(b"on")
}

/// The nodes an inline event handler consults for free identifiers.
///
/// [§ 8.1.8.1 Getting the current value of the event handler](https://html.spec.whatwg.org/multipage/webappapis.html#getting-the-current-value-of-the-event-handler)
/// "Let scope be ... the element's node document ... the element's form
/// owner ... the element".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerScope {
    /// The node owning the handler.
    pub node: NodeId,
    /// The node's form owner, for form-associated elements.
    pub form: Option<NodeId>,
    /// The node's owner document; `None` for the document itself.
    pub document: Option<NodeId>,
}

impl HandlerScope {
    /// Lookup order: the node first, then its form, then its document.
    pub fn lookup_order(&self) -> impl Iterator<Item = NodeId> {
        std::iter::once(self.node).chain(self.form).chain(self.document)
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// All nodes live in a contiguous vector, using indices for all
/// relationships. Removed nodes stay allocated (detached) so their ids stay
/// valid.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    /// The Document node is always at index 0 (NodeId::ROOT).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        };
        DomTree {
            nodes: vec![document],
        }
    }

    /// Get the root document node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Allocate an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        let id = self.alloc(NodeType::Element(element));
        self.append_child(parent, id);
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Appends `child` as the last child of `parent`, updating all relationships.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detaches `child` from `parent`. Returns `false` if `child` was not a
    /// child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(index) = self.children(parent).iter().position(|&c| c == child) else {
            return false;
        };
        let _ = self.nodes[parent.0].children.remove(index);

        let prev = self.nodes[child.0].prev_sibling.take();
        let next = self.nodes[child.0].next_sibling.take();
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
        self.nodes[child.0].parent = None;
        true
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Whether `id` is the document node or one of its descendants.
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.ancestors(id).any(|a| a == NodeId::ROOT)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over the descendants of a node in tree order, excluding the
    /// node itself.
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantIterator { tree: self, stack }
    }

    /// Get element data if this node is an element.
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// [§ 5.1 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// "Return the first element in tree order within node's descendants
    /// whose ID is elementId; otherwise, return null."
    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        if element_id.is_empty() {
            return None;
        }
        self.descendants(NodeId::ROOT)
            .find(|&id| self.as_element(id).and_then(ElementData::id) == Some(element_id))
    }

    /// [§ 4.4 ownerDocument](https://dom.spec.whatwg.org/#dom-node-ownerdocument)
    ///
    /// "The ownerDocument getter steps are to return null, if this is a
    /// document; otherwise this's node document."
    ///
    /// Every node allocated in this arena belongs to its document, even
    /// while detached.
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id)?.node_type {
            NodeType::Document => None,
            _ => Some(NodeId::ROOT),
        }
    }

    /// [§ 4.10.18.3 Association of controls and forms](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#reset-the-form-owner)
    ///
    /// STEP 1: "If element has a form content attribute and is connected,
    ///          then ... set element's form owner to the first element in
    ///          element's tree, in tree order, whose ID is the value of the
    ///          form attribute, if that is a form element."
    /// STEP 2: "Otherwise, if element has an ancestor form element, then
    ///          associate element with the nearest such ancestor form element."
    ///
    /// Returns `None` for elements that are not form-associated.
    pub fn form_owner(&self, id: NodeId) -> Option<NodeId> {
        let element = self.as_element(id)?;
        if !element.is_form_associated() {
            return None;
        }

        if let Some(form_id) = element.attribute("form") {
            if !self.is_connected(id) {
                return None;
            }
            return self
                .element_by_id(form_id)
                .filter(|&candidate| self.is_form(candidate));
        }

        self.ancestors(id).find(|&ancestor| self.is_form(ancestor))
    }

    /// The form-associated elements owned by `form`, in tree order.
    pub fn form_controls(&self, form: NodeId) -> Vec<NodeId> {
        if !self.is_form(form) {
            return Vec::new();
        }
        self.descendants(NodeId::ROOT)
            .filter(|&id| self.form_owner(id) == Some(form))
            .collect()
    }

    /// Resolve the handler scope for `id`: the node, its form owner and its
    /// owner document. Returns `None` if the node does not exist.
    pub fn handler_scope(&self, id: NodeId) -> Option<HandlerScope> {
        let _ = self.get(id)?;
        Some(HandlerScope {
            node: id,
            form: self.form_owner(id),
            document: self.owner_document(id),
        })
    }

    fn is_form(&self, id: NodeId) -> bool {
        self.as_element(id).is_some_and(|e| e.is_html("form"))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
