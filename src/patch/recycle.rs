//! Recycle - Adopt existing markup as the previous tree.
//!
//! The first render over a container that already holds content (for
//! example server-produced markup) patches against a tree synthesised from
//! that content instead of starting empty. Synthesised elements carry no
//! attributes and no keys; tag names are lowercased.

use super::Mounted;
use crate::target::{NodeKind, RenderTarget};
use crate::types::NodeId;
use crate::vnode::{Attributes, Element, VNode};

/// Build a mounted tree mirroring `node` and everything under it.
///
/// Returns `None` for a handle the target does not know.
pub fn recycle(target: &dyn RenderTarget, node: NodeId) -> Option<Mounted> {
    match target.node_kind(node)? {
        NodeKind::Text(text) => Some(Mounted {
            node: VNode::text(text),
            element: node,
            children: Vec::new(),
        }),
        NodeKind::Element(tag) => {
            let children: Vec<Mounted> = target
                .child_nodes(node)
                .into_iter()
                .filter_map(|child| recycle(target, child))
                .collect();
            let element = Element::new(
                tag.to_lowercase(),
                Attributes::new(),
                children.iter().map(|child| child.node.clone()).collect(),
            );
            Some(Mounted {
                node: VNode::from(element),
                element: node,
                children,
            })
        }
    }
}

/// The first element child of `container`, where adopted markup starts.
pub(crate) fn first_element(target: &dyn RenderTarget, container: NodeId) -> Option<NodeId> {
    target
        .child_nodes(container)
        .into_iter()
        .find(|&child| matches!(target.node_kind(child), Some(NodeKind::Element(_))))
}
