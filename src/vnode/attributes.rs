//! Attribute values - what an element node declares about itself.
//!
//! Attributes are an insertion-ordered map from name to [`AttrValue`]. Besides
//! plain values they carry event handlers (names starting with `on`), a nested
//! [`Style`] map, lifecycle [`Hook`]s and the reconciliation-only `key`.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::patch::Done;
use crate::state::Value;
use crate::types::{Key, NodeId};

/// Attribute names reserved for lifecycle hooks. Never applied to a target.
pub const HOOK_NAMES: [&str; 4] = ["oncreate", "onupdate", "onremove", "ondestroy"];

// =============================================================================
// Events
// =============================================================================

/// Event delivered to a handler by the render target's dispatch.
#[derive(Clone, Debug)]
pub struct Event {
    /// Event name without the `on` prefix (e.g. `"click"`).
    pub name: String,
    /// Element the event was dispatched on.
    pub target: NodeId,
    /// Optional payload (e.g. the new text of an input).
    pub detail: Value,
}

impl Event {
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            detail: Value::Null,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Event handler callback (Rc for sharing between the vnode and the target's
/// registry). Equality is pointer identity.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// Lifecycle Hooks
// =============================================================================

/// User-declared lifecycle callback.
///
/// - `Create` runs after the pass that created (or adopted) the element.
/// - `Update` runs after the pass that updated the element, with the old
///   attributes.
/// - `Remove` runs when the element is about to be removed; detachment waits
///   until the [`Done`] it receives is called.
/// - `Destroy` runs when the element (or an ancestor) is detached.
#[derive(Clone)]
pub enum Hook {
    Create(Rc<dyn Fn(NodeId)>),
    Update(Rc<dyn Fn(NodeId, &Attributes)>),
    Remove(Rc<dyn Fn(NodeId, Done)>),
    Destroy(Rc<dyn Fn(NodeId)>),
}

impl Hook {
    fn ptr(&self) -> *const u8 {
        match self {
            Hook::Create(f) => Rc::as_ptr(f) as *const u8,
            Hook::Update(f) => Rc::as_ptr(f) as *const u8,
            Hook::Remove(f) => Rc::as_ptr(f) as *const u8,
            Hook::Destroy(f) => Rc::as_ptr(f) as *const u8,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Hook::Create(_) => "Create",
            Hook::Update(_) => "Update",
            Hook::Remove(_) => "Remove",
            Hook::Destroy(_) => "Destroy",
        }
    }
}

impl PartialEq for Hook {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && std::ptr::eq(self.ptr(), other.ptr())
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook::{}({:p})", self.kind(), self.ptr())
    }
}

// =============================================================================
// Style
// =============================================================================

/// Nested style map: property name → value.
///
/// Hyphenated names (`--accent`, `-webkit-...`) are custom properties and are
/// applied through a separate target call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style(IndexMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(property.into(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// AttrValue
// =============================================================================

/// A single attribute value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AttrValue {
    /// Absent. Removes the attribute when diffed in.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(Rc<str>),
    Style(Style),
    Handler(Handler),
    Hook(Hook),
}

impl AttrValue {
    /// `null` or `false`: the attribute is removed from the target.
    #[inline]
    pub fn is_removal(&self) -> bool {
        matches!(self, AttrValue::Null | AttrValue::Bool(false))
    }

    /// Text form for a generic attribute write.
    ///
    /// Returns `None` for values that have no attribute representation.
    pub fn to_attribute_text(&self) -> Option<String> {
        match self {
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Number(n) => Some(n.to_string()),
            AttrValue::Text(s) => Some(s.to_string()),
            AttrValue::Null | AttrValue::Style(_) | AttrValue::Handler(_) | AttrValue::Hook(_) => {
                None
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_style(&self) -> Option<&Style> {
        match self {
            AttrValue::Style(style) => Some(style),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            AttrValue::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// Key declared by this value, when used as the `key` attribute.
    pub fn to_key(&self) -> Option<Key> {
        match self {
            AttrValue::Text(s) => Some(Key::Text(s.clone())),
            AttrValue::Number(n) if n.fract() == 0.0 => Some(Key::Int(*n as i64)),
            AttrValue::Number(n) => Some(Key::from(n.to_string())),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(Rc::from(value))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(Rc::from(value))
    }
}

impl From<Style> for AttrValue {
    fn from(value: Style) -> Self {
        AttrValue::Style(value)
    }
}

impl From<Handler> for AttrValue {
    fn from(value: Handler) -> Self {
        AttrValue::Handler(value)
    }
}

impl From<Key> for AttrValue {
    fn from(value: Key) -> Self {
        match value {
            Key::Text(s) => AttrValue::Text(s),
            Key::Int(n) => AttrValue::Number(n as f64),
        }
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Attribute map of one element node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(IndexMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value` (builder pattern).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Declare the reconciliation key.
    pub fn key(self, key: impl Into<Key>) -> Self {
        let key: Key = key.into();
        self.with("key", key)
    }

    pub fn style(self, style: Style) -> Self {
        self.with("style", style)
    }

    /// Bind an event handler. `event` is the bare event name (`"click"`).
    pub fn on(self, event: &str, f: impl Fn(&Event) + 'static) -> Self {
        self.with(format!("on{}", event), Handler::new(f))
    }

    pub fn oncreate(self, f: impl Fn(NodeId) + 'static) -> Self {
        self.with("oncreate", AttrValue::Hook(Hook::Create(Rc::new(f))))
    }

    pub fn onupdate(self, f: impl Fn(NodeId, &Attributes) + 'static) -> Self {
        self.with("onupdate", AttrValue::Hook(Hook::Update(Rc::new(f))))
    }

    pub fn onremove(self, f: impl Fn(NodeId, Done) + 'static) -> Self {
        self.with("onremove", AttrValue::Hook(Hook::Remove(Rc::new(f))))
    }

    pub fn ondestroy(self, f: impl Fn(NodeId) + 'static) -> Self {
        self.with("ondestroy", AttrValue::Hook(Hook::Destroy(Rc::new(f))))
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key declared through the `key` attribute.
    pub fn declared_key(&self) -> Option<Key> {
        self.get("key").and_then(AttrValue::to_key)
    }

    /// The hook stored under `name`, if it is one.
    pub fn hook(&self, name: &str) -> Option<&Hook> {
        match self.get(name) {
            Some(AttrValue::Hook(hook)) => Some(hook),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
