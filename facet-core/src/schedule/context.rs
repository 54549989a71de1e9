//! Scheduler Context
//!
//! Facets capture a scheduler when they are built. Which one is decided by a
//! thread-local stack: the innermost entered [`SchedulerContext`] wins, and
//! without one every thread falls back to its own default scheduler.
//!
//! This keeps the common case (one scheduler per thread) free of plumbing
//! while letting tests and embedders run fully isolated graphs.

use std::cell::RefCell;

use super::scheduler::Scheduler;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Scheduler>> = RefCell::new(Vec::new());

    static DEFAULT_SCHEDULER: Scheduler = Scheduler::new();
}

/// Guard that keeps a scheduler current until dropped.
#[must_use = "the scheduler is only current while the guard is alive"]
pub struct SchedulerContext {
    scheduler: Scheduler,
}

impl SchedulerContext {
    /// Make `scheduler` current for facets built on this thread.
    pub fn enter(scheduler: &Scheduler) -> Self {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(scheduler.clone()));

        Self {
            scheduler: scheduler.clone(),
        }
    }

    /// Check if a scheduler has been entered on this thread.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The innermost entered scheduler, or the thread default.
    pub fn current() -> Scheduler {
        CONTEXT_STACK
            .with(|stack| stack.borrow().last().cloned())
            .unwrap_or_else(|| DEFAULT_SCHEDULER.with(Scheduler::clone))
    }
}

impl Drop for SchedulerContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(popped) = popped {
                debug_assert!(
                    popped.ptr_eq(&self.scheduler),
                    "SchedulerContext dropped out of order"
                );
            }
        });
    }
}
