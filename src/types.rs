//! Core types shared across the crate.
//!
//! - [`NodeId`] - Handle to an element allocated by a render target
//! - [`Key`] - Identity token for keyed child reconciliation
//! - [`PatchFlags`] - Context bits threaded through a reconciliation pass
//! - [`Task`] - Deferred unit of work handed to the host loop

use std::fmt;
use std::rc::Rc;

// =============================================================================
// NodeId
// =============================================================================

/// Opaque handle to a node owned by a [`RenderTarget`](crate::target::RenderTarget).
///
/// Handles are only meaningful to the target that allocated them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Raw index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Key
// =============================================================================

/// Identity token of a keyed child.
///
/// Keys are either text or integers. A key of `"1"` and a key of `1` are
/// different keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Text(Rc<str>),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Text(text) => write!(f, "{:?}", text),
            Key::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(Rc::from(value))
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

// =============================================================================
// Patch Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Context bits for one recursive patch.
    ///
    /// `SVG` is inherited by every descendant of an `svg` element.
    /// `RECYCLING` is set only for the first pass over adopted markup.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PatchFlags: u8 {
        const NONE = 0;
        const SVG = 1 << 0;
        const RECYCLING = 1 << 1;
    }
}

impl PatchFlags {
    /// Flags for the children of an element named `name`.
    #[inline]
    pub fn entering(self, name: &str) -> Self {
        if name == "svg" { self | PatchFlags::SVG } else { self }
    }
}

// =============================================================================
// Task
// =============================================================================

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;
