//! Persistent state values.
//!
//! [`Value`] is the dynamic value stored in the application state and passed
//! to actions as payload. Maps and lists are reference counted and never
//! mutated in place: every write builds a new map that shares all untouched
//! entries with the previous one.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

// =============================================================================
// Value
// =============================================================================

/// A dynamically typed state value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    List(Rc<[Value]>),
    Map(Map),
}

impl Value {
    /// Reference equality: pointer identity for maps and lists, value
    /// equality for scalars.
    ///
    /// This is the check the action wirer uses to decide whether an action
    /// returned the state it was given.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Map(a), Value::Map(b)) => a.same(b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer view of a number. Fractions are truncated.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n as i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Follow `path` through nested maps.
    ///
    /// Returns `Value::Null` when any segment is missing.
    pub fn at(&self, path: &[String]) -> Value {
        let mut current = self;
        for key in path {
            match current.get(key) {
                Some(next) => current = next,
                None => return Value::Null,
            }
        }
        current.clone()
    }

    /// Persistent write: a new root with `value` stored at `path`.
    ///
    /// Every map along the path is shallow-copied; everything else is shared
    /// with `self`. Non-map values along the path are replaced by maps.
    pub fn with_at(&self, path: &[String], value: Value) -> Value {
        let Some((head, rest)) = path.split_first() else {
            return value;
        };
        let base = self.as_map().cloned().unwrap_or_default();
        let inner = base.get(head).cloned().unwrap_or_default();
        Value::Map(base.insert(head.clone(), inner.with_at(rest, value)))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Text rendering used when a value is shown in a text node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Map(_) => f.write_str("[object]"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(Rc::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Map
// =============================================================================

/// Persistent, insertion-ordered string map.
///
/// Cloning is O(1). Writes ([`insert`](Map::insert), [`merge`](Map::merge))
/// return a new map and leave `self` untouched; [`with`](Map::with) consumes
/// the map and never affects other clones.
#[derive(Clone, Debug, Default)]
pub struct Map(Rc<IndexMap<String, Value>>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Map::insert). Writes in place when this
    /// map is not shared.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Rc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    /// A new map with `key` set to `value`.
    pub fn insert(&self, key: String, value: Value) -> Map {
        let mut entries = IndexMap::clone(&self.0);
        entries.insert(key, value);
        Map(Rc::new(entries))
    }

    /// Shallow merge: keys of `other` overwrite, keys absent from `other`
    /// are kept.
    pub fn merge(&self, other: &Map) -> Map {
        let mut entries = IndexMap::clone(&self.0);
        for (key, value) in other.iter() {
            entries.insert(key.clone(), value.clone());
        }
        Map(Rc::new(entries))
    }

    /// Pointer identity.
    #[inline]
    pub fn same(&self, other: &Map) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.same(other) || *self.0 == *other.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Map(Rc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}
