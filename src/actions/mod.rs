//! Actions - State transitions bound to namespace paths.
//!
//! An [`Actions`] namespace maps names to action functions or nested
//! namespaces. Wiring it against a [`Store`] produces [`WiredActions`]:
//! invoking a wired action runs the user function, merges its result into the
//! state at the namespace path and asks the scheduler for a render.
//!
//! # Example
//!
//! ```
//! use spark_vdom::{Actions, Map, Update};
//!
//! let actions = Actions::new()
//!     .action("reset", |_| Ok(Update::merge(Map::new().with("count", 0))))
//!     .action("add", |payload| {
//!         Ok(Update::then(move |state, _| {
//!             let count = state.get("count").and_then(|v| v.as_f64()).unwrap_or(0.0);
//!             let step = payload.as_f64().unwrap_or(1.0);
//!             Ok(Update::merge(Map::new().with("count", count + step)))
//!         }))
//!     });
//! assert_eq!(actions.len(), 2);
//! ```

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::scheduler::{RenderScheduler, TaskQueue};
use crate::state::{Map, Path, Store, Value};

// =============================================================================
// Update - what an action returns
// =============================================================================

/// User action function: payload in, update out.
pub type ActionFn = Rc<dyn Fn(Value) -> Result<Update>>;

/// Continuation receiving `(state_at_path, namespace_actions)`.
pub type Continuation = Rc<dyn Fn(&Value, &WiredActions) -> Result<Update>>;

/// Explicit marker for an asynchronous result.
///
/// Carries an arbitrary handle for the caller (a task id, a channel, ...).
/// The wirer never merges it into the state.
#[derive(Clone)]
pub struct Pending(Rc<dyn Any>);

impl Pending {
    pub fn new<T: Any>(handle: T) -> Self {
        Self(Rc::new(handle))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

/// Result of an action.
#[derive(Clone)]
pub enum Update {
    /// Nothing to merge.
    None,
    /// Partial state, shallow-merged into the map at the action's path.
    Merge(Map),
    /// Computed from the current state at the action's path.
    Then(Continuation),
    /// Asynchronous placeholder. Never merged.
    Async(Pending),
}

impl Update {
    pub fn merge(partial: Map) -> Self {
        Update::Merge(partial)
    }

    pub fn then(f: impl Fn(&Value, &WiredActions) -> Result<Update> + 'static) -> Self {
        Update::Then(Rc::new(f))
    }

    pub fn pending<T: Any>(handle: T) -> Self {
        Update::Async(Pending::new(handle))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Update::None)
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::None => f.write_str("None"),
            Update::Merge(partial) => f.debug_tuple("Merge").field(partial).finish(),
            Update::Then(_) => f.write_str("Then(..)"),
            Update::Async(_) => f.write_str("Async(..)"),
        }
    }
}

// =============================================================================
// Actions - unwired namespace
// =============================================================================

#[derive(Clone)]
enum Entry {
    Action(ActionFn),
    Namespace(Actions),
}

/// A namespace of actions, as declared by the application.
#[derive(Clone, Default)]
pub struct Actions {
    entries: IndexMap<String, Entry>,
}

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an action (builder pattern).
    pub fn action(
        mut self,
        name: impl Into<String>,
        f: impl Fn(Value) -> Result<Update> + 'static,
    ) -> Self {
        self.entries.insert(name.into(), Entry::Action(Rc::new(f)));
        self
    }

    /// Declare a nested namespace. Its actions operate on the state map
    /// stored under the same name.
    pub fn namespace(mut self, name: impl Into<String>, actions: Actions) -> Self {
        self.entries.insert(name.into(), Entry::Namespace(actions));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

// =============================================================================
// WiredActions
// =============================================================================

enum WiredEntry {
    Action(ActionFn),
    Namespace(WiredActions),
}

struct Namespace {
    path: Path,
    entries: IndexMap<String, WiredEntry>,
    store: Store,
    scheduler: RenderScheduler,
}

/// A namespace of actions wired to a store and a render scheduler.
///
/// Cloning is cheap and shares the namespace.
#[derive(Clone)]
pub struct WiredActions {
    inner: Rc<Namespace>,
}

impl WiredActions {
    /// Wire `actions` at `path`, recursively.
    ///
    /// A map is created in the state at every namespace path that lacks one.
    pub fn wire(actions: Actions, path: Path, store: &Store, scheduler: &RenderScheduler) -> Self {
        store.ensure_map_at(&path);

        let entries = actions
            .entries
            .into_iter()
            .map(|(name, entry)| {
                let wired = match entry {
                    Entry::Action(f) => WiredEntry::Action(f),
                    Entry::Namespace(nested) => WiredEntry::Namespace(Self::wire(
                        nested,
                        path.child(name.as_str()),
                        store,
                        scheduler,
                    )),
                };
                (name, wired)
            })
            .collect();

        Self {
            inner: Rc::new(Namespace {
                path,
                entries,
                store: store.clone(),
                scheduler: scheduler.clone(),
            }),
        }
    }

    /// Wire against a private empty store whose render requests go nowhere.
    ///
    /// Useful for resolving components outside of a mounted app.
    pub fn detached(actions: Actions) -> Self {
        let scheduler = RenderScheduler::new(Rc::new(TaskQueue::new()));
        Self::wire(actions, Path::root(), &Store::default(), &scheduler)
    }

    /// Namespace path of these actions.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Current state at this namespace's path.
    pub fn state(&self) -> Value {
        self.inner.store.at(&self.inner.path)
    }

    /// Nested namespace `name`.
    pub fn namespace(&self, name: &str) -> Result<WiredActions> {
        match self.inner.entries.get(name) {
            Some(WiredEntry::Namespace(nested)) => Ok(nested.clone()),
            Some(WiredEntry::Action(_)) => Err(Error::NotANamespace {
                path: self.inner.path.clone(),
                name: name.to_string(),
            }),
            None => Err(Error::UnknownAction {
                path: self.inner.path.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Invoke action `name` with `payload`.
    ///
    /// Runs synchronously: the state is updated before this returns, and a
    /// render is requested (never performed). An error from the action
    /// aborts the state write and the render request.
    pub fn call(&self, name: &str, payload: impl Into<Value>) -> Result<Update> {
        let action = match self.inner.entries.get(name) {
            Some(WiredEntry::Action(f)) => f.clone(),
            Some(WiredEntry::Namespace(_)) => {
                return Err(Error::NotAnAction {
                    path: self.inner.path.clone(),
                    name: name.to_string(),
                });
            }
            None => {
                return Err(Error::UnknownAction {
                    path: self.inner.path.clone(),
                    name: name.to_string(),
                });
            }
        };

        let path = &self.inner.path;
        let mut result = action(payload.into()).map_err(|err| err.at_path(path))?;

        if let Update::Then(continuation) = &result {
            let continuation = continuation.clone();
            let current = self.inner.store.at(path);
            result = continuation(&current, self).map_err(|err| err.at_path(path))?;
        }

        if let Update::Merge(partial) = &result {
            let current = self.inner.store.at(path);
            let unchanged = current.as_map().is_some_and(|map| map.same(partial));
            if !unchanged {
                self.inner.store.merge_at(path, partial);
                tracing::trace!(%path, action = name, "state merged");
                self.inner.scheduler.request_render();
            }
        }

        Ok(result)
    }
}

impl fmt::Debug for WiredActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WiredActions")
            .field("path", &self.inner.path)
            .field("names", &self.inner.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
