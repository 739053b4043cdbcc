//! Patch - Reconciles a new virtual tree against the mounted one.
//!
//! - [`Patcher`] - One reconciliation pass over a render target
//! - [`Mounted`] - The last rendered node paired with its target element
//! - [`Done`] - Completion handle of a deferred removal
//! - [`LifecycleQueue`] - Hooks collected during a pass
//!
//! # Node rules
//!
//! ```text
//! old == new (same allocation)      → nothing
//! no old, or different names        → create new, insert, remove old
//! text → text                       → replace content in place
//! element → element (same name)     → update attributes, patch children
//! ```
//!
//! # Children
//!
//! Children are matched positionally when unkeyed and by key when keyed.
//! Keyed children are moved instead of rebuilt; a key claimed once is never
//! claimed again in the same list. Whatever old children end up unmatched
//! are removed once the new list has been walked.

mod attributes;
mod lifecycle;
mod recycle;

pub use lifecycle::LifecycleQueue;
pub use recycle::recycle;
pub(crate) use recycle::first_element;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::actions::WiredActions;
use crate::state::Value;
use crate::target::RenderTarget;
use crate::types::{Key, NodeId, PatchFlags};
use crate::vnode::{resolve, Hook, VNode};

// =============================================================================
// Mounted
// =============================================================================

/// A resolved node together with the target element it produced.
///
/// `children` mirrors the element's children in order. Components never
/// appear here; they are resolved before mounting.
#[derive(Clone, Debug)]
pub struct Mounted {
    pub node: VNode,
    pub element: NodeId,
    pub children: Vec<Mounted>,
}

impl Mounted {
    fn key(&self) -> Option<Key> {
        self.node.key().cloned()
    }

    /// Run `ondestroy` hooks of this subtree, children before parents.
    fn destroy(&self) {
        for child in &self.children {
            child.destroy();
        }
        if let Some(Hook::Destroy(f)) = self.node.attributes().and_then(|a| a.hook("ondestroy")) {
            f(self.element);
        }
    }
}

// =============================================================================
// Done - deferred removal
// =============================================================================

/// Finishes the removal of an element.
///
/// An `onremove` hook receives this handle and decides when the element is
/// actually detached. Until [`Done::done`] is called the element stays in
/// the target. Dropping it without calling leaves the element attached.
pub struct Done {
    target: Rc<dyn RenderTarget>,
    parent: NodeId,
    mounted: Mounted,
}

impl Done {
    fn new(target: Rc<dyn RenderTarget>, parent: NodeId, mounted: Mounted) -> Self {
        Self { target, parent, mounted }
    }

    /// The element waiting to be removed.
    pub fn element(&self) -> NodeId {
        self.mounted.element
    }

    /// Run the subtree's destroy hooks and detach the element.
    pub fn done(self) {
        self.mounted.destroy();
        self.target.remove_child(self.parent, self.mounted.element);
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("parent", &self.parent)
            .field("element", &self.mounted.element)
            .finish()
    }
}

// =============================================================================
// Patcher
// =============================================================================

/// One reconciliation pass.
///
/// Holds the state snapshot and wired actions handed to components, and the
/// lifecycle hooks collected along the way. Call [`Patcher::finish`] after
/// the last patch and drain the returned queue.
pub struct Patcher {
    target: Rc<dyn RenderTarget>,
    state: Value,
    actions: WiredActions,
    lifecycle: LifecycleQueue,
}

impl Patcher {
    pub fn new(target: Rc<dyn RenderTarget>, state: Value, actions: WiredActions) -> Self {
        Self {
            target,
            state,
            actions,
            lifecycle: LifecycleQueue::new(),
        }
    }

    /// Hooks collected so far.
    pub fn finish(self) -> LifecycleQueue {
        self.lifecycle
    }

    /// Patch `old` (mounted under `parent`) into `node`.
    ///
    /// When there is no old node the new element is inserted before `anchor`
    /// (appended when `None`). Returns the mounted result, whose element may
    /// be a fresh one.
    pub fn patch(
        &mut self,
        parent: NodeId,
        anchor: Option<NodeId>,
        old: Option<Mounted>,
        node: VNode,
        flags: PatchFlags,
    ) -> Mounted {
        let node = resolve(node, &self.state, &self.actions);

        match old {
            Some(old) if node.is_same(&old.node) => old,
            Some(old) if node.name().is_some() && node.name() == old.node.name() => {
                self.update(old, node, flags)
            }
            Some(old) if node.name().is_none() && old.node.name().is_none() => {
                // Text to text
                self.target.set_text(old.element, node.as_text().unwrap_or_default());
                Mounted {
                    node,
                    element: old.element,
                    children: Vec::new(),
                }
            }
            old => {
                let created = self.create(node, flags);
                let anchor = old.as_ref().map(|o| o.element).or(anchor);
                self.target.insert_before(parent, created.element, anchor);
                if let Some(old) = old {
                    self.remove(parent, old);
                }
                created
            }
        }
    }

    /// Build a detached target subtree for `node`.
    fn create(&mut self, node: VNode, flags: PatchFlags) -> Mounted {
        let node = resolve(node, &self.state, &self.actions);

        let element_node = match &node {
            VNode::Element(element_node) => Some(Rc::clone(element_node)),
            _ => None,
        };
        let Some(element_node) = element_node else {
            let element = self.target.create_text(node.as_text().unwrap_or_default());
            return Mounted {
                node,
                element,
                children: Vec::new(),
            };
        };

        let flags = flags.entering(&element_node.name);
        let element = self
            .target
            .create_element(&element_node.name, flags.contains(PatchFlags::SVG));

        // Enqueued before the children so their hooks run first
        if let Some(Hook::Create(f)) = element_node.attributes.hook("oncreate") {
            let f = f.clone();
            self.lifecycle.push(move || f(element));
        }

        let children = element_node
            .children
            .iter()
            .map(|child| {
                let mounted = self.create(child.clone(), flags);
                self.target.append_child(element, mounted.element);
                mounted
            })
            .collect();

        for (name, value) in element_node.attributes.iter() {
            self.update_attribute(element, name, value, &Default::default(), flags);
        }

        Mounted { node, element, children }
    }

    /// Same-name element update.
    fn update(&mut self, old: Mounted, node: VNode, flags: PatchFlags) -> Mounted {
        let Mounted {
            node: old_node,
            element,
            children: old_children,
        } = old;

        let (Some(old_element), Some(new_element)) = (old_node.as_element(), node.as_element()) else {
            return Mounted {
                node,
                element,
                children: old_children,
            };
        };

        let flags = flags.entering(&new_element.name);
        self.update_element(element, &old_element.attributes, &new_element.attributes, flags);
        let children = self.patch_children(element, old_children, &new_element.children, flags);

        Mounted { node, element, children }
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    fn patch_children(
        &mut self,
        element: NodeId,
        old_children: Vec<Mounted>,
        new_children: &[VNode],
        flags: PatchFlags,
    ) -> Vec<Mounted> {
        let old_keys: Vec<Option<Key>> = old_children.iter().map(Mounted::key).collect();
        let old_elements: Vec<NodeId> = old_children.iter().map(|m| m.element).collect();
        let mut slots: Vec<Option<Mounted>> = old_children.into_iter().map(Some).collect();

        // Duplicate keys: the last occurrence wins
        let mut old_keyed: HashMap<Key, usize> = HashMap::new();
        for (index, key) in old_keys.iter().enumerate() {
            if let Some(key) = key {
                old_keyed.insert(key.clone(), index);
            }
        }

        let mut claimed: HashSet<Key> = HashSet::new();
        let mut mounted = Vec::with_capacity(new_children.len());
        let recycling = flags.contains(PatchFlags::RECYCLING);
        let key_at = |index: usize| old_keys.get(index).cloned().flatten();

        let mut i = 0;
        let mut k = 0;
        // Each new child is resolved once, then reused while i advances
        let mut current: Option<VNode> = None;

        while k < new_children.len() {
            let old_key = key_at(i);
            let child = match current.take() {
                Some(child) => child,
                None => resolve(new_children[k].clone(), &self.state, &self.actions),
            };
            let new_key = child.key().cloned();
            let anchor = old_elements.get(i).copied();

            if old_key.as_ref().is_some_and(|key| claimed.contains(key)) {
                i += 1;
                current = Some(child);
                continue;
            }

            if new_key.is_some() && new_key == key_at(i + 1) {
                if old_key.is_none() {
                    if let Some(old) = slots.get_mut(i).and_then(Option::take) {
                        self.remove(element, old);
                    }
                }
                i += 1;
                current = Some(child);
                continue;
            }

            match new_key {
                Some(new_key) if !recycling => {
                    let keyed = old_keyed.get(&new_key).copied();
                    if old_key.as_ref() == Some(&new_key) {
                        let old = keyed.and_then(|index| slots[index].take());
                        mounted.push(self.patch(element, anchor, old, child, flags));
                        i += 1;
                    } else if let Some(old) = keyed.and_then(|index| slots[index].take()) {
                        tracing::trace!(key = %new_key, element = %old.element, "moving keyed child");
                        self.target.insert_before(element, old.element, anchor);
                        mounted.push(self.patch(element, anchor, Some(old), child, flags));
                    } else {
                        mounted.push(self.patch(element, anchor, None, child, flags));
                    }
                    claimed.insert(new_key);
                    k += 1;
                }
                _ => {
                    if old_key.is_none() {
                        let old = slots.get_mut(i).and_then(Option::take);
                        mounted.push(self.patch(element, anchor, old, child, flags));
                        k += 1;
                    } else {
                        current = Some(child);
                    }
                    i += 1;
                }
            }
        }

        // Unkeyed leftovers past the cursor, then every unclaimed keyed child
        for index in i..slots.len() {
            if old_keys[index].is_none() {
                if let Some(old) = slots[index].take() {
                    self.remove(element, old);
                }
            }
        }
        for old in slots.into_iter().flatten() {
            self.remove(element, old);
        }

        mounted
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Remove a mounted subtree from `parent`, deferring to its `onremove`
    /// hook when it has one.
    fn remove(&mut self, parent: NodeId, old: Mounted) {
        let hook = match old.node.attributes().and_then(|a| a.hook("onremove")) {
            Some(Hook::Remove(f)) => Some(f.clone()),
            _ => None,
        };
        let element = old.element;
        let done = Done::new(self.target.clone(), parent, old);

        match hook {
            Some(f) => {
                tracing::trace!(%element, "removal deferred to onremove");
                f(element, done);
            }
            None => done.done(),
        }
    }
}
