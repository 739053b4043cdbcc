//! MemoryTarget - In-memory render surface.
//!
//! Nodes live in an index-addressed arena:
//!
//! ```text
//! #0: Element "body"  parent=None  children=[#1]
//! #1: Element "div"   parent=#0    children=[#2]   attrs={class: "a"}
//! #2: Text "hello"    parent=#1
//! ```
//!
//! Handles are never reused, so a handle taken in a test keeps identifying
//! the same node even after it is detached. Every mutation made through the
//! [`RenderTarget`] trait is appended to a log that tests can inspect.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use super::{NodeKind, RenderTarget};
use crate::types::NodeId;
use crate::vnode::{AttrValue, Event, Handler};

/// Names the memory target exposes as live element properties.
const PROPERTIES: [&str; 6] = ["value", "checked", "selected", "disabled", "type", "list"];

// =============================================================================
// Mutation Log
// =============================================================================

/// One recorded mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    CreateElement { node: NodeId, tag: String, svg: bool },
    CreateText { node: NodeId, text: String },
    Insert { parent: NodeId, child: NodeId, before: Option<NodeId> },
    Remove { parent: NodeId, child: NodeId },
    SetText { node: NodeId, text: String },
    SetProperty { node: NodeId, name: String, value: AttrValue },
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    SetStyle { node: NodeId, property: String, value: String },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
}

impl Mutation {
    /// Structural mutations create, move or remove nodes.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::CreateElement { .. }
                | Mutation::CreateText { .. }
                | Mutation::Insert { .. }
                | Mutation::Remove { .. }
        )
    }
}

// =============================================================================
// Document
// =============================================================================

enum Kind {
    Element { tag: String, svg: bool },
    Text(String),
}

struct NodeData {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, AttrValue>,
    style: IndexMap<String, String>,
    listeners: IndexSet<String>,
    handlers: HashMap<String, Handler>,
}

impl NodeData {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
            properties: IndexMap::new(),
            style: IndexMap::new(),
            listeners: IndexSet::new(),
            handlers: HashMap::new(),
        }
    }
}

#[derive(Default)]
struct Document {
    nodes: Vec<NodeData>,
    log: Vec<Mutation>,
}

impl Document {
    fn allocate(&mut self, kind: Kind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        let node = self.nodes.get_mut(id.0);
        if node.is_none() {
            tracing::warn!(%id, "unknown node handle");
        }
        node
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = None;
        }
    }
}

// =============================================================================
// MemoryTarget
// =============================================================================

/// In-memory document implementing [`RenderTarget`].
///
/// Cloning shares the same document.
#[derive(Clone, Default)]
pub struct MemoryTarget {
    doc: Rc<RefCell<Document>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.doc.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.borrow().nodes.is_empty()
    }

    // -------------------------------------------------------------------------
    // Mutation log
    // -------------------------------------------------------------------------

    pub fn mutations(&self) -> Vec<Mutation> {
        self.doc.borrow().log.clone()
    }

    /// Return and clear the mutation log.
    pub fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.doc.borrow_mut().log)
    }

    pub fn clear_mutations(&self) {
        self.doc.borrow_mut().log.clear();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.doc.borrow().node(node)?.kind {
            Kind::Element { tag, .. } => Some(tag.clone()),
            Kind::Text(_) => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.doc.borrow().node(node)?.kind {
            Kind::Text(text) => Some(text.clone()),
            Kind::Element { .. } => None,
        }
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let doc = self.doc.borrow();
        let mut out = String::new();
        collect_text(&doc, node, &mut out);
        out
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.doc.borrow().node(node)?.parent
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.doc.borrow().node(node)?.attributes.get(name).cloned()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.doc.borrow().node(node)?.style.get(property).cloned()
    }

    pub fn has_listener(&self, node: NodeId, event: &str) -> bool {
        self.doc
            .borrow()
            .node(node)
            .is_some_and(|n| n.listeners.contains(event))
    }

    /// Serialise `node` as markup. Properties are not shown.
    pub fn markup(&self, node: NodeId) -> String {
        let doc = self.doc.borrow();
        let mut out = String::new();
        write_markup(&doc, node, &mut out);
        out
    }

    // -------------------------------------------------------------------------
    // Host-side entry points (not logged)
    // -------------------------------------------------------------------------

    /// Deliver `event` to the handler registered on its target.
    ///
    /// Returns `true` when a listener was subscribed and a handler ran.
    pub fn dispatch(&self, event: Event) -> bool {
        let handler = {
            let doc = self.doc.borrow();
            let Some(node) = doc.node(event.target) else {
                return false;
            };
            if !node.listeners.contains(&event.name) {
                return false;
            }
            node.handlers.get(&event.name).cloned()
        };
        // Handlers may call back into the target
        match handler {
            Some(handler) => {
                handler.call(&event);
                true
            }
            None => false,
        }
    }

    /// Simulate user input: change a live property without going through
    /// the reconciler, then dispatch `input`.
    pub fn input(&self, node: NodeId, value: &str) -> bool {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            data.properties.insert("value".to_string(), AttrValue::from(value));
        }
        self.dispatch(Event::new("input", node).with_detail(value))
    }

    fn record(&self, mutation: Mutation) {
        self.doc.borrow_mut().log.push(mutation);
    }
}

impl RenderTarget for MemoryTarget {
    fn create_element(&self, tag: &str, svg: bool) -> NodeId {
        let node = self.doc.borrow_mut().allocate(Kind::Element {
            tag: tag.to_string(),
            svg,
        });
        self.record(Mutation::CreateElement {
            node,
            tag: tag.to_string(),
            svg,
        });
        node
    }

    fn create_text(&self, text: &str) -> NodeId {
        let node = self.doc.borrow_mut().allocate(Kind::Text(text.to_string()));
        self.record(Mutation::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if reference == Some(child) {
            return;
        }
        {
            let mut doc = self.doc.borrow_mut();
            if doc.node(parent).is_none() || doc.node(child).is_none() {
                tracing::warn!(%parent, %child, "insert with unknown node handle");
                return;
            }
            doc.detach(child);
            let Some(parent_node) = doc.node_mut(parent) else { return };
            let position = reference
                .and_then(|r| parent_node.children.iter().position(|&c| c == r))
                .unwrap_or(parent_node.children.len());
            parent_node.children.insert(position, child);
            if let Some(child_node) = doc.node_mut(child) {
                child_node.parent = Some(parent);
            }
        }
        self.record(Mutation::Insert {
            parent,
            child,
            before: reference,
        });
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) {
        {
            let mut doc = self.doc.borrow_mut();
            if doc.node(child).and_then(|n| n.parent) != Some(parent) {
                tracing::warn!(%parent, %child, "remove of a node that is not a child");
                return;
            }
            doc.detach(child);
        }
        self.record(Mutation::Remove { parent, child });
    }

    fn set_text(&self, node: NodeId, text: &str) {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            data.kind = Kind::Text(text.to_string());
        }
        self.record(Mutation::SetText {
            node,
            text: text.to_string(),
        });
    }

    fn has_property(&self, node: NodeId, name: &str) -> bool {
        let doc = self.doc.borrow();
        matches!(doc.node(node).map(|n| &n.kind), Some(Kind::Element { svg: false, .. }))
            && PROPERTIES.contains(&name)
    }

    fn property(&self, node: NodeId, name: &str) -> AttrValue {
        self.doc
            .borrow()
            .node(node)
            .and_then(|n| n.properties.get(name).cloned())
            .unwrap_or_default()
    }

    fn set_property(&self, node: NodeId, name: &str, value: &AttrValue) {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            data.properties.insert(name.to_string(), value.clone());
        }
        self.record(Mutation::SetProperty {
            node,
            name: name.to_string(),
            value: value.clone(),
        });
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            data.attributes.insert(name.to_string(), value.to_string());
        }
        self.record(Mutation::SetAttribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            data.attributes.shift_remove(name);
            if name == "style" {
                data.style.clear();
            }
        }
        self.record(Mutation::RemoveAttribute {
            node,
            name: name.to_string(),
        });
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            if value.is_empty() {
                data.style.shift_remove(property);
            } else {
                data.style.insert(property.to_string(), value.to_string());
            }
        }
        self.record(Mutation::SetStyle {
            node,
            property: property.to_string(),
            value: value.to_string(),
        });
    }

    fn set_style_custom(&self, node: NodeId, property: &str, value: &str) {
        // Custom properties share the declaration map
        self.set_style(node, property, value);
    }

    fn add_event_listener(&self, node: NodeId, event: &str) {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            data.listeners.insert(event.to_string());
        }
        self.record(Mutation::AddListener {
            node,
            event: event.to_string(),
        });
    }

    fn remove_event_listener(&self, node: NodeId, event: &str) {
        if let Some(data) = self.doc.borrow_mut().node_mut(node) {
            data.listeners.shift_remove(event);
        }
        self.record(Mutation::RemoveListener {
            node,
            event: event.to_string(),
        });
    }

    fn set_handler(&self, node: NodeId, event: &str, handler: Option<Handler>) -> Option<Handler> {
        let mut doc = self.doc.borrow_mut();
        let data = doc.node_mut(node)?;
        match handler {
            Some(handler) => data.handlers.insert(event.to_string(), handler),
            None => data.handlers.remove(event),
        }
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.doc
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        match &self.doc.borrow().node(node)?.kind {
            Kind::Element { tag, .. } => Some(NodeKind::Element(tag.clone())),
            Kind::Text(text) => Some(NodeKind::Text(text.clone())),
        }
    }

    fn is_svg(&self, node: NodeId) -> bool {
        matches!(
            self.doc.borrow().node(node).map(|n| &n.kind),
            Some(Kind::Element { svg: true, .. })
        )
    }
}

// =============================================================================
// Serialisation
// =============================================================================

fn collect_text(doc: &Document, node: NodeId, out: &mut String) {
    let Some(data) = doc.node(node) else { return };
    match &data.kind {
        Kind::Text(text) => out.push_str(text),
        Kind::Element { .. } => {
            for &child in &data.children {
                collect_text(doc, child, out);
            }
        }
    }
}

fn write_markup(doc: &Document, node: NodeId, out: &mut String) {
    let Some(data) = doc.node(node) else { return };
    match &data.kind {
        Kind::Text(text) => out.push_str(&escape(text)),
        Kind::Element { tag, .. } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in &data.attributes {
                if name == "style" {
                    continue;
                }
                let _ = write!(out, " {}=\"{}\"", name, escape(value));
            }
            if !data.style.is_empty() {
                let declarations: Vec<String> = data
                    .style
                    .iter()
                    .map(|(property, value)| format!("{}: {}", property, value))
                    .collect();
                let _ = write!(out, " style=\"{}\"", escape(&declarations.join("; ")));
            }
            out.push('>');
            for &child in &data.children {
                write_markup(doc, child, out);
            }
            let _ = write!(out, "</{}>", tag);
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_tree_building_and_markup() {
        let target = MemoryTarget::new();
        let root = target.create_element("div", false);
        let text = target.create_text("a < b");
        target.append_child(root, text);
        target.set_attribute(root, "class", "box");
        target.set_style(root, "color", "red");

        assert_eq!(
            target.markup(root),
            "<div class=\"box\" style=\"color: red\">a &lt; b</div>"
        );
        assert_eq!(target.parent(text), Some(root));
    }

    #[test]
    fn test_insert_before_moves_node() {
        let target = MemoryTarget::new();
        let root = target.create_element("ul", false);
        let a = target.create_element("li", false);
        let b = target.create_element("li", false);
        let c = target.create_element("li", false);
        target.append_child(root, a);
        target.append_child(root, b);
        target.append_child(root, c);

        target.insert_before(root, c, Some(a));
        assert_eq!(target.child_nodes(root), vec![c, a, b]);

        // Self reference is a no-op
        target.clear_mutations();
        target.insert_before(root, a, Some(a));
        assert!(target.mutations().is_empty());
        assert_eq!(target.child_nodes(root), vec![c, a, b]);
    }

    #[test]
    fn test_remove_child() {
        let target = MemoryTarget::new();
        let root = target.create_element("div", false);
        let child = target.create_text("x");
        target.append_child(root, child);

        target.remove_child(root, child);
        assert!(target.child_nodes(root).is_empty());
        assert_eq!(target.parent(child), None);

        // Removing again is ignored
        target.clear_mutations();
        target.remove_child(root, child);
        assert!(target.mutations().is_empty());
    }

    #[test]
    fn test_properties_only_on_html_elements() {
        let target = MemoryTarget::new();
        let input = target.create_element("input", false);
        let circle = target.create_element("circle", true);

        assert!(target.has_property(input, "value"));
        assert!(!target.has_property(input, "class"));
        assert!(!target.has_property(circle, "value"));
        assert!(target.is_svg(circle));
    }

    #[test]
    fn test_dispatch_requires_listener() {
        let target = MemoryTarget::new();
        let button = target.create_element("button", false);
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();

        target.set_handler(button, "click", Some(Handler::new(move |_| {
            clicks_clone.set(clicks_clone.get() + 1);
        })));
        assert!(!target.dispatch(Event::new("click", button)));

        target.add_event_listener(button, "click");
        assert!(target.dispatch(Event::new("click", button)));
        assert_eq!(clicks.get(), 1);

        target.remove_event_listener(button, "click");
        assert!(!target.dispatch(Event::new("click", button)));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_input_changes_live_value_silently() {
        let target = MemoryTarget::new();
        let input = target.create_element("input", false);
        target.clear_mutations();

        target.input(input, "typed");
        assert_eq!(target.property(input, "value"), AttrValue::from("typed"));
        assert!(target.mutations().is_empty());
    }

    #[test]
    fn test_empty_style_clears_property() {
        let target = MemoryTarget::new();
        let node = target.create_element("div", false);
        target.set_style(node, "color", "red");
        target.set_style_custom(node, "--accent", "blue");
        target.set_style(node, "color", "");

        assert_eq!(target.style(node, "color"), None);
        assert_eq!(target.style(node, "--accent"), Some("blue".to_string()));
    }
}
