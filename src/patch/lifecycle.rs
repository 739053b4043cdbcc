//! Lifecycle Queue - Post-patch callbacks of one render pass.
//!
//! Hooks are captured while the tree is patched and run only after the whole
//! pass is done, most recently enqueued first. Because an element's `oncreate`
//! is enqueued before its children are created, children run their hooks
//! before their parents.

use crate::types::Task;

/// Ordered buffer of callbacks, drained once per render.
#[derive(Default)]
pub struct LifecycleQueue {
    callbacks: Vec<Task>,
}

impl LifecycleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: impl FnOnce() + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback in reverse registration order. Returns how many ran.
    pub fn drain(mut self) -> usize {
        let mut ran = 0;
        while let Some(callback) = self.callbacks.pop() {
            callback();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_drain_runs_in_reverse() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut queue = LifecycleQueue::new();

        for i in 0..3 {
            let order = order.clone();
            queue.push(move || order.borrow_mut().push(i));
        }
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain(), 3);
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_empty_drain() {
        assert_eq!(LifecycleQueue::new().drain(), 0);
    }
}
