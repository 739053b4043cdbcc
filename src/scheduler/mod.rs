//! Render Scheduler - Coalesces render requests into one pass per tick.
//!
//! # State machine
//!
//! ```text
//!            request_render()              deferred task fires
//!   Idle ─────────────────────▶ Armed ─────────────────────────▶ Running
//!    ▲                            │ request_render(): no-op          │
//!    └────────────────────────────┴──────────────────────────────────┘
//!                       pass finished (re-arms if requested while Running)
//! ```
//!
//! The pass itself never runs synchronously from `request_render()`. It is
//! handed to the host through the [`Defer`] seam and runs when the host gets
//! to it, reading whatever state is current at that moment.
//!
//! # Host loop
//!
//! [`TaskQueue`] is a minimal cooperative host: `defer` pushes onto a queue
//! and the embedder drives it with [`TaskQueue::tick`] or
//! [`TaskQueue::run_until_idle`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::types::Task;

// =============================================================================
// Defer - host seam
// =============================================================================

/// Host hook that runs a task once the current synchronous work unwinds.
pub trait Defer {
    fn defer(&self, task: Task);
}

/// Cooperative FIFO task queue.
///
/// Cloning shares the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the tasks that were queued when the tick began.
    ///
    /// Tasks queued while ticking wait for the next tick. Returns the number
    /// of tasks run.
    pub fn tick(&self) -> usize {
        let budget = self.len();
        let mut ran = 0;
        while ran < budget {
            let Some(task) = self.pop() else { break };
            task();
            ran += 1;
        }
        ran
    }

    /// Run tasks until the queue is empty, including tasks queued meanwhile.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop() {
            task();
            ran += 1;
        }
        ran
    }

    // The borrow must end before the task runs; tasks may defer more tasks.
    fn pop(&self) -> Option<Task> {
        self.tasks.borrow_mut().pop_front()
    }
}

impl Defer for TaskQueue {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

// =============================================================================
// RenderScheduler
// =============================================================================

/// Scheduler state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No pass pending.
    Idle,
    /// A pass is scheduled with the host and has not started.
    Armed,
    /// A pass is executing.
    Running,
}

struct SchedulerInner {
    phase: Cell<Phase>,
    /// Set when a render is requested while Running.
    rearm: Cell<bool>,
    passes: Cell<usize>,
    defer: Rc<dyn Defer>,
    pass: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Shared handle to the render scheduler of one app.
#[derive(Clone)]
pub struct RenderScheduler {
    inner: Rc<SchedulerInner>,
}

impl RenderScheduler {
    pub fn new(defer: Rc<dyn Defer>) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                phase: Cell::new(Phase::Idle),
                rearm: Cell::new(false),
                passes: Cell::new(0),
                defer,
                pass: RefCell::new(None),
            }),
        }
    }

    /// Install the reconciliation pass run by each armed task.
    pub fn set_pass(&self, pass: impl Fn() + 'static) {
        *self.inner.pass.borrow_mut() = Some(Rc::new(pass));
    }

    /// Ask for a render. At most one pass is armed at a time.
    pub fn request_render(&self) {
        match self.inner.phase.get() {
            Phase::Idle => {
                self.inner.phase.set(Phase::Armed);
                tracing::debug!("render armed");
                let weak: Weak<SchedulerInner> = Rc::downgrade(&self.inner);
                self.inner.defer.defer(Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        RenderScheduler { inner }.run();
                    }
                }));
            }
            Phase::Armed => {}
            Phase::Running => self.inner.rearm.set(true),
        }
    }

    fn run(&self) {
        if self.inner.phase.get() != Phase::Armed {
            return;
        }
        self.inner.phase.set(Phase::Running);

        let pass = self.inner.pass.borrow().clone();
        if let Some(pass) = pass {
            pass();
        }

        let passes = self.inner.passes.get() + 1;
        self.inner.passes.set(passes);
        self.inner.phase.set(Phase::Idle);
        tracing::debug!(passes, "render pass finished");

        if self.inner.rearm.replace(false) {
            self.request_render();
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    /// Number of completed passes.
    pub fn passes(&self) -> usize {
        self.inner.passes.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> (TaskQueue, RenderScheduler, Rc<Cell<usize>>) {
        let queue = TaskQueue::new();
        let scheduler = RenderScheduler::new(Rc::new(queue.clone()));
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        scheduler.set_pass(move || runs_clone.set(runs_clone.get() + 1));
        (queue, scheduler, runs)
    }

    #[test]
    fn test_request_arms_once() {
        let (queue, scheduler, runs) = scheduler();

        scheduler.request_render();
        scheduler.request_render();
        scheduler.request_render();

        assert_eq!(scheduler.phase(), Phase::Armed);
        assert_eq!(queue.len(), 1);
        assert_eq!(runs.get(), 0);

        queue.run_until_idle();
        assert_eq!(runs.get(), 1);
        assert_eq!(scheduler.passes(), 1);
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[test]
    fn test_request_after_pass_arms_again() {
        let (queue, scheduler, runs) = scheduler();

        scheduler.request_render();
        queue.run_until_idle();
        scheduler.request_render();
        queue.run_until_idle();

        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_request_while_running_rearms() {
        let queue = TaskQueue::new();
        let scheduler = RenderScheduler::new(Rc::new(queue.clone()));
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let handle = scheduler.clone();
        scheduler.set_pass(move || {
            runs_clone.set(runs_clone.get() + 1);
            if runs_clone.get() == 1 {
                handle.request_render();
                // Never reentrant
                assert_eq!(handle.phase(), Phase::Running);
            }
        });

        scheduler.request_render();
        assert_eq!(queue.tick(), 1);
        assert_eq!(runs.get(), 1);
        assert_eq!(scheduler.phase(), Phase::Armed);

        assert_eq!(queue.tick(), 1);
        assert_eq!(runs.get(), 2);
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[test]
    fn test_dropped_scheduler_skips_pass() {
        let (queue, scheduler, runs) = scheduler();
        scheduler.request_render();
        drop(scheduler);

        queue.run_until_idle();
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_tick_defers_new_tasks() {
        let queue = TaskQueue::new();
        let inner = queue.clone();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        queue.defer(Box::new(move || {
            let count_inner = count_clone.clone();
            inner.defer(Box::new(move || count_inner.set(count_inner.get() + 1)));
        }));

        assert_eq!(queue.tick(), 1);
        assert_eq!(count.get(), 0);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.run_until_idle(), 1);
        assert_eq!(count.get(), 1);
    }
}
