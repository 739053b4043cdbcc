//! Builder - `h()` and `component()`.
//!
//! Children arrive as a loose sequence of [`Child`] values: nodes, nested
//! lists, and "nothing" markers. They are flattened depth-first, nothing
//! markers (`None`, `true`, `false`, `()`) are dropped, and primitives become
//! text leaves.
//!
//! ```ignore
//! let view = h("ul", Attributes::new(), children![
//!     h("li", Attributes::new(), children!["first"]),
//!     show_second.then(|| h("li", Attributes::new(), children!["second"])),
//!     items.iter().map(|i| h("li", Attributes::new().key(*i), children![*i])).collect::<Vec<_>>(),
//! ]);
//! ```

use super::{Attributes, Component, Element, VNode};

/// One entry of a child sequence before flattening.
#[derive(Clone, Debug)]
pub enum Child {
    Node(VNode),
    List(Vec<Child>),
    /// Contributes nothing.
    Skip,
}

impl From<VNode> for Child {
    fn from(value: VNode) -> Self {
        Child::Node(value)
    }
}

impl From<Component> for Child {
    fn from(value: Component) -> Self {
        Child::Node(VNode::Component(value))
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Node(VNode::from(value))
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Node(VNode::from(value))
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Child::Node(VNode::from(value.as_str()))
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Node(VNode::from(value))
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Node(VNode::from(value))
    }
}

impl From<usize> for Child {
    fn from(value: usize) -> Self {
        Child::Node(VNode::from(value))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Node(VNode::from(value))
    }
}

/// Booleans render nothing, so `cond && node` style children work.
impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Child::Skip
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Skip
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Child::Skip,
        }
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(value: Vec<T>) -> Self {
        Child::List(value.into_iter().map(Into::into).collect())
    }
}

/// Build a `Vec<Child>` from heterogeneous child expressions.
#[macro_export]
macro_rules! children {
    () => {
        ::std::vec::Vec::<$crate::vnode::Child>::new()
    };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::vnode::Child::from($child)),+]
    };
}

/// Flatten a child sequence depth-first, dropping nothing markers.
pub fn flatten(children: impl IntoIterator<Item = Child>) -> Vec<VNode> {
    let mut out = Vec::new();
    let mut stack: Vec<std::vec::IntoIter<Child>> = vec![children.into_iter().collect::<Vec<_>>().into_iter()];

    while let Some(top) = stack.last_mut() {
        match top.next() {
            Some(Child::Node(node)) => out.push(node),
            Some(Child::List(list)) => stack.push(list.into_iter()),
            Some(Child::Skip) => {}
            None => {
                stack.pop();
            }
        }
    }
    out
}

/// Build an element node. The `key` attribute, when present, becomes the
/// node's key.
pub fn h(name: &str, attributes: Attributes, children: impl IntoIterator<Item = Child>) -> VNode {
    VNode::from(Element::new(name, attributes, flatten(children)))
}

/// Call a view function with `(attributes, flattened children)` and return
/// whatever it builds.
pub fn component(
    view: impl FnOnce(Attributes, Vec<VNode>) -> VNode,
    attributes: Attributes,
    children: impl IntoIterator<Item = Child>,
) -> VNode {
    view(attributes, flatten(children))
}
