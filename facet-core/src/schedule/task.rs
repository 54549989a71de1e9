//! Scheduled Tasks
//!
//! A task is a unit of deferred work with a stable identity. The identity
//! matters: the scheduler de-duplicates by the task's "scheduled" flag, so
//! every producer that wants to coalesce must schedule the same [`Task`]
//! handle rather than a fresh closure.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Generate a new unique task ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

struct TaskInner {
    id: TaskId,

    /// Set while the task sits in a queue waiting for the current flush.
    scheduled: Cell<bool>,

    run: Box<dyn Fn()>,
}

/// A handle to a schedulable unit of work.
///
/// Cloning a `Task` yields another handle to the **same** task: clones share
/// the scheduled flag, so scheduling any of them twice in one flush runs the
/// work once.
#[derive(Clone)]
pub struct Task {
    inner: Rc<TaskInner>,
}

impl Task {
    /// Create a task that runs `run` each time it is executed.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            inner: Rc::new(TaskInner {
                id: TaskId::new(),
                scheduled: Cell::new(false),
                run: Box::new(run),
            }),
        }
    }

    /// Get the task's unique ID.
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// Whether the task is waiting in a queue.
    pub fn is_scheduled(&self) -> bool {
        self.inner.scheduled.get()
    }

    /// Flag the task as scheduled. Returns `false` if it already was.
    pub(crate) fn mark_scheduled(&self) -> bool {
        !self.inner.scheduled.replace(true)
    }

    /// Clear the flag. Returns whether it was set.
    pub(crate) fn take_scheduled(&self) -> bool {
        self.inner.scheduled.replace(false)
    }

    pub(crate) fn run(&self) {
        (self.inner.run)();
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Task {}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("scheduled", &self.is_scheduled())
            .finish()
    }
}
