//! Virtual Nodes - The declarative, diffable description of a view.
//!
//! - [`VNode`] - Element, text leaf, or deferred component
//! - [`attributes`] - Attribute values, handlers, styles and lifecycle hooks
//! - [`builder`] - `h()` / `component()` construction with child flattening
//!
//! # Resolution
//!
//! A [`VNode::Component`] is a function of `(state, actions)`. It is turned
//! into an element or text node by [`resolve`] exactly when the reconciler is
//! about to compare it or create it, never earlier:
//!
//! ```text
//! Component ──resolve──▶ Component ──resolve──▶ Element | Text
//! ```

pub mod attributes;
pub mod builder;

use std::fmt;
use std::rc::Rc;

use crate::actions::WiredActions;
use crate::state::Value;
use crate::types::Key;

pub use attributes::{AttrValue, Attributes, Event, Handler, Hook, Style, HOOK_NAMES};
pub use builder::{component, flatten, h, Child};

// =============================================================================
// Element
// =============================================================================

/// An element node: tag name, attributes and ordered children.
#[derive(Clone, Debug)]
pub struct Element {
    pub name: Rc<str>,
    pub attributes: Attributes,
    pub children: Vec<VNode>,
    /// Copied from the `key` attribute at construction.
    pub key: Option<Key>,
}

impl Element {
    pub fn new(name: impl Into<Rc<str>>, attributes: Attributes, children: Vec<VNode>) -> Self {
        let key = attributes.declared_key();
        Self {
            name: name.into(),
            attributes,
            children,
            key,
        }
    }
}

// =============================================================================
// Component
// =============================================================================

/// Deferred view function of `(state, actions)`.
#[derive(Clone)]
pub struct Component(Rc<dyn Fn(&Value, &WiredActions) -> VNode>);

impl Component {
    pub fn new(f: impl Fn(&Value, &WiredActions) -> VNode + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, state: &Value, actions: &WiredActions) -> VNode {
        (self.0)(state, actions)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// VNode
// =============================================================================

/// A virtual node.
///
/// Elements are reference counted so an unchanged subtree can be reused
/// across renders; reusing the same `Rc` makes the reconciler skip it.
#[derive(Clone, Debug)]
pub enum VNode {
    Element(Rc<Element>),
    Text(Rc<str>),
    Component(Component),
}

impl VNode {
    /// Text leaf.
    pub fn text(content: impl Into<Rc<str>>) -> Self {
        VNode::Text(content.into())
    }

    /// The text node standing for "nothing".
    pub fn empty() -> Self {
        VNode::Text(Rc::from(""))
    }

    /// Deferred component of `(state, actions)`.
    pub fn lazy(f: impl Fn(&Value, &WiredActions) -> VNode + 'static) -> Self {
        VNode::Component(Component::new(f))
    }

    /// Tag name of an element node.
    pub fn name(&self) -> Option<&str> {
        match self {
            VNode::Element(element) => Some(&element.name),
            _ => None,
        }
    }

    /// Key of an element node.
    pub fn key(&self) -> Option<&Key> {
        match self {
            VNode::Element(element) => element.key.as_ref(),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            VNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        self.as_element().map(|element| &element.attributes)
    }

    /// Identity: the same element allocation, the same text, or the same
    /// component function.
    pub fn is_same(&self, other: &VNode) -> bool {
        match (self, other) {
            (VNode::Element(a), VNode::Element(b)) => Rc::ptr_eq(a, b),
            (VNode::Text(a), VNode::Text(b)) => a == b,
            (VNode::Component(a), VNode::Component(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<Element> for VNode {
    fn from(value: Element) -> Self {
        VNode::Element(Rc::new(value))
    }
}

impl From<Component> for VNode {
    fn from(value: Component) -> Self {
        VNode::Component(value)
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        VNode::Text(Rc::from(value))
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        VNode::Text(Rc::from(value))
    }
}

impl From<i32> for VNode {
    fn from(value: i32) -> Self {
        VNode::Text(Rc::from(value.to_string()))
    }
}

impl From<i64> for VNode {
    fn from(value: i64) -> Self {
        VNode::Text(Rc::from(value.to_string()))
    }
}

impl From<usize> for VNode {
    fn from(value: usize) -> Self {
        VNode::Text(Rc::from(value.to_string()))
    }
}

impl From<f64> for VNode {
    fn from(value: f64) -> Self {
        VNode::Text(Rc::from(value.to_string()))
    }
}

impl From<&Value> for VNode {
    fn from(value: &Value) -> Self {
        VNode::Text(Rc::from(value.to_string()))
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve a node to an element or text node.
///
/// Components are invoked with `(state, actions)` until something other than
/// a component comes back.
pub fn resolve(node: VNode, state: &Value, actions: &WiredActions) -> VNode {
    let mut node = node;
    while let VNode::Component(component) = node {
        node = component.call(state, actions);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Actions;
    use crate::state::Map;

    fn actions() -> WiredActions {
        WiredActions::detached(Actions::new())
    }

    #[test]
    fn test_resolve_nested_components() {
        let inner = VNode::lazy(|state, _| VNode::from(state.get("n").cloned().unwrap_or_default().to_string()));
        let outer = VNode::lazy(move |_, _| inner.clone());
        let state = Value::from(Map::new().with("n", 5));

        let resolved = resolve(outer, &state, &actions());
        assert_eq!(resolved.as_text(), Some("5"));
    }

    #[test]
    fn test_resolve_passes_through_primitives() {
        let node = h("div", Attributes::new(), []);
        let resolved = resolve(node.clone(), &Value::Null, &actions());
        assert!(resolved.is_same(&node));
    }

    #[test]
    fn test_identity() {
        let a = h("p", Attributes::new(), []);
        let b = h("p", Attributes::new(), []);
        assert!(a.is_same(&a.clone()));
        assert!(!a.is_same(&b));
        assert!(VNode::from("x").is_same(&VNode::from("x".to_string())));
        assert!(!VNode::from("1").is_same(&a));
    }

    #[test]
    fn test_element_key_copied_from_attributes() {
        let node = h("li", Attributes::new().key("k"), []);
        assert_eq!(node.key(), Some(&Key::from("k")));
        assert_eq!(node.name(), Some("li"));
    }
}
