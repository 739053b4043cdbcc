//! Namespace paths into the application state.
//!
//! A path is a sequence of map keys. Actions are bound to the path of the
//! namespace they were declared in; the root namespace has the empty path.

use std::fmt;

/// A location in the state tree, as a sequence of map keys.
///
/// ```
/// use spark_vdom::Path;
///
/// let path = Path::root().key("todos").key("filter");
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), ".todos.filter");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// The empty path.
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a key and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(k.into());
        self
    }

    /// Append a key and return a new path (non-mutating).
    #[inline]
    pub fn child(&self, k: impl Into<String>) -> Path {
        self.clone().key(k)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The keys of this path, outermost first.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for key in &self.0 {
            write!(f, ".{}", key)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}
