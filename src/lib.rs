//! # spark-vdom
//!
//! Virtual-DOM reconciliation core for Rust.
//!
//! ## Architecture
//!
//! An application is a state value, a namespace of actions and a view
//! function. Actions update a persistent state store and ask for a render;
//! renders are coalesced into one deferred pass per host tick. Each pass
//! builds a fresh virtual tree from the current state and patches the
//! rendered tree with the fewest mutations it can find in linear time.
//!
//! ```text
//! Actions → Store → RenderScheduler → view(state, actions) → Patcher → RenderTarget
//!                                                               ↓
//!                                                         LifecycleQueue
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (NodeId, Key, PatchFlags)
//! - [`vnode`] - Virtual nodes, attributes, `h()` builder
//! - [`state`] - Persistent state values and the store
//! - [`actions`] - Action namespaces wired to the store
//! - [`scheduler`] - Render scheduling and the host task queue
//! - [`patch`] - Keyed reconciliation, attribute sync, lifecycle hooks
//! - [`target`] - Render target trait and the in-memory document
//! - [`pipeline`] - `mount()` and the app handle

pub mod actions;
pub mod error;
pub mod patch;
pub mod pipeline;
pub mod scheduler;
pub mod state;
pub mod target;
pub mod types;
pub mod vnode;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use vnode::{
    component, flatten, h, resolve, AttrValue, Attributes, Child, Component, Element, Event,
    Handler, Hook, Style, VNode,
};

pub use state::{Map, Path, Store, Value};

pub use actions::{Actions, Pending, Update, WiredActions};

pub use scheduler::{Defer, Phase, RenderScheduler, TaskQueue};

pub use patch::{recycle, Done, LifecycleQueue, Mounted, Patcher};

pub use target::{MemoryTarget, Mutation, NodeKind, RenderTarget};

pub use pipeline::{mount, App, MountOptions};
