//! Render Target - The surface the reconciler mutates.
//!
//! The reconciler never touches a concrete display surface directly. Every
//! mutation goes through [`RenderTarget`], which a host implements for its
//! surface (a browser DOM, a terminal widget tree, ...). The crate ships
//! [`MemoryTarget`], an in-memory document used for headless rendering and
//! tests.
//!
//! Methods take `&self`: targets are shared between the reconciler and
//! deferred removal callbacks, so implementations use interior mutability.
//!
//! # Event delegation
//!
//! The reconciler attaches at most one listener per event name on an element
//! and stores the current handler in the target's per-element registry via
//! [`RenderTarget::set_handler`]. Replacing a handler only updates the
//! registry. The target's own dispatch looks the handler up when the event
//! fires.

mod memory;

pub use memory::*;

use crate::types::NodeId;
use crate::vnode::{AttrValue, Handler};

/// Shape of an existing node, as seen when adopting markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with its tag name as stored by the target.
    Element(String),
    /// Text node with its content.
    Text(String),
}

/// Primitive operations of a render surface.
pub trait RenderTarget {
    /// Allocate an element. `svg` selects the SVG namespace.
    fn create_element(&self, tag: &str, svg: bool) -> NodeId;

    /// Allocate a text node.
    fn create_text(&self, text: &str) -> NodeId;

    /// Append `child` as the last child of `parent` (moving it if attached).
    fn append_child(&self, parent: NodeId, child: NodeId);

    /// Insert `child` before `reference` (append when `None`), moving it if
    /// it is already attached somewhere.
    fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>);

    /// Detach `child` from `parent`.
    fn remove_child(&self, parent: NodeId, child: NodeId);

    /// Replace the content of a text node.
    fn set_text(&self, node: NodeId, text: &str);

    /// Whether `name` is a settable property of the element.
    fn has_property(&self, node: NodeId, name: &str) -> bool;

    /// Live value of a property (`AttrValue::Null` when unset).
    fn property(&self, node: NodeId, name: &str) -> AttrValue;

    fn set_property(&self, node: NodeId, name: &str, value: &AttrValue);

    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&self, node: NodeId, name: &str);

    /// Set a regular (camelCase) style property. Empty clears it.
    fn set_style(&self, node: NodeId, property: &str, value: &str);

    /// Set a hyphenated (custom) style property. Empty clears it.
    fn set_style_custom(&self, node: NodeId, property: &str, value: &str);

    /// Subscribe the delegated listener for `event`.
    fn add_event_listener(&self, node: NodeId, event: &str);

    /// Unsubscribe the delegated listener for `event`.
    fn remove_event_listener(&self, node: NodeId, event: &str);

    /// Store (or clear) the registry entry for `event`; returns the previous
    /// entry.
    fn set_handler(&self, node: NodeId, event: &str, handler: Option<Handler>) -> Option<Handler>;

    /// Current children of `node`, elements and text alike, in order.
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// Shape of `node`, or `None` for an unknown handle.
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Whether `node` lives in the SVG namespace.
    fn is_svg(&self, node: NodeId) -> bool;
}
