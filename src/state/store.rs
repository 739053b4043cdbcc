//! Store - the application state snapshot holder.
//!
//! The store holds exactly one [`Value`] snapshot at a time. Readers get a
//! cheap clone of the snapshot and keep seeing it even if a write happens
//! afterwards; writers replace the snapshot atomically with a new root built
//! by [`Value::with_at`].

use std::cell::RefCell;
use std::rc::Rc;

use super::path::Path;
use super::value::{Map, Value};

/// Shared handle to the application state.
///
/// Cloning the handle shares the same underlying snapshot slot.
#[derive(Clone, Default)]
pub struct Store {
    current: Rc<RefCell<Value>>,
}

impl Store {
    pub fn new(initial: Value) -> Self {
        Self {
            current: Rc::new(RefCell::new(initial)),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Value {
        self.current.borrow().clone()
    }

    /// The current value at `path` (`Value::Null` when missing).
    pub fn at(&self, path: &Path) -> Value {
        self.current.borrow().at(path.segments())
    }

    /// Replace the value at `path`, sharing every untouched branch.
    pub fn write_at(&self, path: &Path, value: Value) {
        let next = self.current.borrow().with_at(path.segments(), value);
        *self.current.borrow_mut() = next;
    }

    /// Shallow-merge `partial` into the map at `path`.
    ///
    /// A missing or non-map value at `path` is treated as an empty map.
    pub fn merge_at(&self, path: &Path, partial: &Map) {
        let base = self.at(path).as_map().cloned().unwrap_or_default();
        self.write_at(path, Value::Map(base.merge(partial)));
    }

    /// Make sure a map exists at `path`, creating empty maps where needed.
    pub(crate) fn ensure_map_at(&self, path: &Path) {
        if path.is_root() {
            if self.current.borrow().as_map().is_none() {
                *self.current.borrow_mut() = Value::Map(Map::new());
            }
            return;
        }
        if self.at(path).as_map().is_none() {
            self.write_at(path, Value::Map(Map::new()));
        }
    }
}
