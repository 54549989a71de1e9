//! Scheduling
//!
//! Batching and deferred notification. Every [`set`] on a facet runs inside
//! a batch; listeners of derived facets schedule [`Task`]s instead of
//! recomputing on the spot, and the outermost batch flushes them once.
//!
//! The free functions here act on [`Scheduler::current`]. Code that owns a
//! specific [`Scheduler`] should call its methods directly.
//!
//! [`set`]: crate::reactive::WritableFacet::set

mod context;
mod scheduler;
mod task;

pub use context::SchedulerContext;
pub use scheduler::Scheduler;
pub use task::{Task, TaskId};

/// Run `f` in a batch on the current scheduler.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    Scheduler::current().batch(f)
}

/// Run `f` in a transition batch on the current scheduler.
pub fn batch_transition<R>(f: impl FnOnce() -> R) -> R {
    Scheduler::current().batch_transition(f)
}

/// Schedule `task` on the current scheduler.
pub fn schedule_task(task: &Task) {
    Scheduler::current().schedule_task(task);
}

/// Cancel `task` if it is queued.
pub fn cancel_scheduled_task(task: &Task) {
    Scheduler::current().cancel_scheduled_task(task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn free_functions_use_the_entered_scheduler() {
        let scheduler = Scheduler::new();
        let _context = scheduler.enter();

        let log = Rc::new(RefCell::new(Vec::new()));
        let task = |name: &'static str| {
            let log = Rc::clone(&log);
            Task::new(move || log.borrow_mut().push(name))
        };
        let (ordinary, deferred, canceled) = (task("ordinary"), task("deferred"), task("canceled"));

        batch(|| {
            assert_eq!(scheduler.depth(), 1);

            batch_transition(|| {
                assert!(scheduler.is_within_transition());
                schedule_task(&deferred);
            });
            schedule_task(&ordinary);
            schedule_task(&canceled);
            cancel_scheduled_task(&canceled);

            assert_eq!(scheduler.pending_tasks(), 2);
        });

        assert_eq!(*log.borrow(), vec!["ordinary", "deferred"]);
        assert!(!scheduler.is_batching());
    }
}
