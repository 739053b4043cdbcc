//! Mount API - Application lifecycle and render pass.
//!
//! [`mount`] wires the actions to a fresh store, adopts any markup already in
//! the container, and arms the first render. From then on every state change
//! made through the wired actions arms one deferred pass; the pass reads the
//! current state once, rebuilds the view and patches the target.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use spark_vdom::{children, h, mount, Actions, Attributes, Map, MemoryTarget, MountOptions,
//!     RenderTarget, TaskQueue, Update, Value};
//!
//! let target = MemoryTarget::new();
//! let body = target.create_element("body", false);
//! let queue = TaskQueue::new();
//!
//! let actions = Actions::new().action("up", |_| {
//!     Ok(Update::then(|state, _| {
//!         let count = state.get("count").and_then(Value::as_f64).unwrap_or(0.0);
//!         Ok(Update::merge(Map::new().with("count", count + 1.0)))
//!     }))
//! });
//!
//! let app = mount(
//!     Map::new().with("count", 0).into(),
//!     actions,
//!     |state, _| h("h1", Attributes::new(), children![state.get("count").cloned().unwrap_or_default().to_string()]),
//!     Rc::new(target.clone()),
//!     body,
//!     Rc::new(queue.clone()),
//!     MountOptions::default(),
//! )?;
//!
//! queue.run_until_idle();
//! app.actions().call("up", Value::Null)?;
//! queue.run_until_idle();
//! assert_eq!(target.markup(body), "<body><h1>1</h1></body>");
//! # Ok::<(), spark_vdom::Error>(())
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::actions::{Actions, WiredActions};
use crate::error::{Error, Result};
use crate::patch::{first_element, recycle, Mounted, Patcher};
use crate::scheduler::{Defer, Phase, RenderScheduler};
use crate::state::{Path, Store, Value};
use crate::target::{NodeKind, RenderTarget};
use crate::types::{NodeId, PatchFlags};
use crate::vnode::{Component, VNode};

// =============================================================================
// Options
// =============================================================================

/// Mount configuration.
#[derive(Clone, Debug)]
pub struct MountOptions {
    /// Adopt markup already present in the container on the first pass.
    pub recycle: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self { recycle: true }
    }
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recycle(mut self, recycle: bool) -> Self {
        self.recycle = recycle;
        self
    }
}

// =============================================================================
// App Handle
// =============================================================================

struct AppInner {
    store: Store,
    actions: WiredActions,
    scheduler: RenderScheduler,
    target: Rc<dyn RenderTarget>,
    container: NodeId,
    view: Component,
    root: RefCell<Option<Mounted>>,
    /// Set until the first pass has run over adopted markup.
    recycling: Cell<bool>,
    flags: PatchFlags,
}

impl AppInner {
    fn render(&self) {
        let state = self.store.snapshot();
        let mut flags = self.flags;
        if self.recycling.replace(false) {
            flags |= PatchFlags::RECYCLING;
        }

        let mut patcher = Patcher::new(self.target.clone(), state, self.actions.clone());
        // Released while patching: components and hooks may query the app
        let old = self.root.borrow_mut().take();
        let mounted = patcher.patch(
            self.container,
            None,
            old,
            VNode::Component(self.view.clone()),
            flags,
        );
        let root = mounted.element;
        *self.root.borrow_mut() = Some(mounted);

        let hooks = patcher.finish().drain();
        tracing::debug!(%root, hooks, recycled = flags.contains(PatchFlags::RECYCLING), "render pass applied");
    }
}

/// Handle to a mounted application.
///
/// Cloning shares the same application. Dropping every handle stops future
/// passes; already rendered content stays in the target.
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

impl App {
    /// Wired root actions.
    pub fn actions(&self) -> WiredActions {
        self.inner.actions.clone()
    }

    /// Current state snapshot.
    pub fn state(&self) -> Value {
        self.inner.store.snapshot()
    }

    /// Number of completed render passes.
    pub fn passes(&self) -> usize {
        self.inner.scheduler.passes()
    }

    pub fn phase(&self) -> Phase {
        self.inner.scheduler.phase()
    }

    /// Root element of the last pass, `None` before the first one.
    pub fn root(&self) -> Option<NodeId> {
        self.inner.root.borrow().as_ref().map(|mounted| mounted.element)
    }

    pub fn container(&self) -> NodeId {
        self.inner.container
    }

    /// Arm a pass without changing state.
    pub fn request_render(&self) {
        self.inner.scheduler.request_render();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount an application into `container`.
///
/// This sets up:
/// 1. The state store, seeded with `state`
/// 2. Wired actions (a map is created at every namespace path)
/// 3. The adopted tree, when `options.recycle` is on and the container
///    already has an element child
/// 4. The first render, armed through `defer`
///
/// Fails with [`Error::InvalidContainer`] when `container` is not an element
/// of `target`.
pub fn mount(
    state: Value,
    actions: Actions,
    view: impl Fn(&Value, &WiredActions) -> VNode + 'static,
    target: Rc<dyn RenderTarget>,
    container: NodeId,
    defer: Rc<dyn Defer>,
    options: MountOptions,
) -> Result<App> {
    if !matches!(target.node_kind(container), Some(NodeKind::Element(_))) {
        return Err(Error::InvalidContainer(container));
    }

    let store = Store::new(state);
    let scheduler = RenderScheduler::new(defer);
    let actions = WiredActions::wire(actions, Path::root(), &store, &scheduler);

    let root = if options.recycle {
        first_element(target.as_ref(), container).and_then(|element| recycle(target.as_ref(), element))
    } else {
        None
    };
    tracing::debug!(%container, adopted = root.is_some(), "mounting");

    let mut flags = PatchFlags::NONE;
    if target.is_svg(container) {
        flags |= PatchFlags::SVG;
    }

    let inner = Rc::new(AppInner {
        store,
        actions,
        scheduler: scheduler.clone(),
        target,
        container,
        view: Component::new(view),
        root: RefCell::new(root),
        recycling: Cell::new(options.recycle),
        flags,
    });

    let weak: Weak<AppInner> = Rc::downgrade(&inner);
    scheduler.set_pass(move || {
        if let Some(inner) = weak.upgrade() {
            inner.render();
        }
    });
    scheduler.request_render();

    Ok(App { inner })
}
