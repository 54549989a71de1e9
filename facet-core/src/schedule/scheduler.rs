//! Batch Scheduler
//!
//! The scheduler defers notification work while a batch is open and flushes
//! it when the outermost batch closes.
//!
//! # Algorithm
//!
//! 1. `schedule_task` outside any batch runs the task immediately. Batching
//!    is an optimization, never a requirement for correctness.
//! 2. Inside a batch, a task is flagged and appended to the active queue.
//!    A task that is already flagged is not queued again; this is what turns
//!    diamond-shaped fan-out into one downstream run per update.
//! 3. When the outermost batch exits, the queue is drained to a fixed point:
//!    - take the whole queue as this pass's snapshot, leaving it empty
//!    - run every snapshot task that is still flagged, clearing the flag first
//!    - tasks scheduled while the pass runs land in the fresh queue and run
//!      in the next pass
//! 4. The ordinary queue settles first, then the transition queue.
//!
//! The outermost batch keeps its depth while flushing, so tasks and nested
//! batches run during a flush are deferred to the next pass instead of
//! flushing recursively.
//!
//! # Failure
//!
//! A panic inside a pass unschedules the rest of that pass, drops whatever
//! was queued, and unwinds out of `batch`. Effects of tasks that already ran
//! are kept.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::SchedulerConfig;
use crate::error::FlushError;

use super::context::SchedulerContext;
use super::task::Task;

/// Which queue a task is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Ordinary,
    Transition,
}

#[derive(Default)]
struct SchedulerState {
    /// Number of open batch scopes.
    depth: usize,

    queue: Vec<Task>,

    transition_queue: Vec<Task>,

    /// Set between the entry and exit of the root transition batch.
    within_transition: bool,
}

impl SchedulerState {
    fn active_lane(&self) -> Lane {
        if self.within_transition {
            Lane::Transition
        } else {
            Lane::Ordinary
        }
    }

    fn lane_mut(&mut self, lane: Lane) -> &mut Vec<Task> {
        match lane {
            Lane::Ordinary => &mut self.queue,
            Lane::Transition => &mut self.transition_queue,
        }
    }
}

struct SchedulerInner {
    config: SchedulerConfig,
    state: RefCell<SchedulerState>,
}

/// A batching task scheduler.
///
/// Cloning a `Scheduler` yields another handle to the **same** queues and
/// batch depth. Independent instances never share state, which keeps tests
/// isolated from each other.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = Scheduler::new();
/// let task = Task::new(|| println!("ran"));
///
/// scheduler.batch(|| {
///     scheduler.schedule_task(&task);
///     scheduler.schedule_task(&task); // already queued, no-op
/// }); // prints "ran" once
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    /// Create a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                config,
                state: RefCell::new(SchedulerState::default()),
            }),
        }
    }

    /// The scheduler selected by the innermost [`SchedulerContext`], or this
    /// thread's default scheduler.
    pub fn current() -> Self {
        SchedulerContext::current()
    }

    /// Make this scheduler current until the returned guard drops.
    pub fn enter(&self) -> SchedulerContext {
        SchedulerContext::enter(self)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Number of open batch scopes.
    pub fn depth(&self) -> usize {
        self.inner.state.borrow().depth
    }

    pub fn is_batching(&self) -> bool {
        self.depth() > 0
    }

    pub fn is_within_transition(&self) -> bool {
        self.inner.state.borrow().within_transition
    }

    /// Number of queued tasks that will still run, across both queues.
    pub fn pending_tasks(&self) -> usize {
        let state = self.inner.state.borrow();
        state
            .queue
            .iter()
            .chain(state.transition_queue.iter())
            .filter(|task| task.is_scheduled())
            .count()
    }

    /// Whether both handles refer to the same scheduler.
    pub fn ptr_eq(&self, other: &Scheduler) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `task` now, or queue it for the end of the current batch.
    ///
    /// Scheduling a task that is already queued is a no-op.
    pub fn schedule_task(&self, task: &Task) {
        let mut state = self.inner.state.borrow_mut();

        if state.depth == 0 {
            drop(state);
            task.run();
            return;
        }

        if !task.mark_scheduled() {
            return;
        }

        let lane = state.active_lane();
        state.lane_mut(lane).push(task.clone());
    }

    /// Unflag a queued task so the flush skips it.
    ///
    /// A task that is currently running is not interrupted.
    pub fn cancel_scheduled_task(&self, task: &Task) {
        task.take_scheduled();
    }

    /// Run `f` inside a batch scope.
    ///
    /// Only the outermost scope flushes, so batches composed across call
    /// sites coalesce into a single flush. Returns after the flush completes.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let scope = BatchScope::enter(self, false);
        let result = f();
        scope.exit();
        result
    }

    /// Run `f` inside a transition batch.
    ///
    /// Tasks scheduled anywhere inside the root transition, including in
    /// nested ordinary batches, go to the transition queue, which is drained
    /// after the ordinary queue.
    pub fn batch_transition<R>(&self, f: impl FnOnce() -> R) -> R {
        let scope = BatchScope::enter(self, true);
        let result = f();
        scope.exit();
        result
    }

    /// Like [`batch`](Self::batch), but a panic from `f` or from a flushed
    /// task is returned as an error instead of unwinding further.
    pub fn try_batch<R>(&self, f: impl FnOnce() -> R) -> Result<R, FlushError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.batch(f))).map_err(FlushError::from_panic)
    }

    fn set_within_transition(&self, within: bool) {
        self.inner.state.borrow_mut().within_transition = within;
    }

    /// Drain both queues. Called by the outermost scope, which still holds
    /// its depth.
    fn flush(&self) {
        let mut passes = 0;
        let within = self.is_within_transition();

        self.set_within_transition(false);
        self.drain(Lane::Ordinary, &mut passes);
        self.set_within_transition(true);
        self.drain(Lane::Transition, &mut passes);
        self.set_within_transition(within);

        if passes > 0 {
            debug!(passes, "flush settled");
        }
    }

    fn drain(&self, lane: Lane, passes: &mut usize) {
        loop {
            let tasks = mem::take(self.inner.state.borrow_mut().lane_mut(lane));
            if tasks.is_empty() {
                return;
            }

            *passes += 1;
            if let Some(limit) = self.inner.config.max_flush_passes {
                if *passes > limit {
                    for task in &tasks {
                        task.take_scheduled();
                    }
                    self.discard(lane);
                    warn!(limit, ?lane, "flush pass limit exceeded, queued tasks dropped");
                    panic::panic_any(FlushError::PassLimitExceeded { limit });
                }
            }

            trace!(pass = *passes, ?lane, tasks = tasks.len(), "flush pass");
            FlushPass {
                scheduler: self,
                lane,
                tasks,
                next: 0,
                completed: false,
            }
            .run();
        }
    }

    /// Drop everything queued in `lane`, clearing the flags.
    fn discard(&self, lane: Lane) {
        let dropped = mem::take(self.inner.state.borrow_mut().lane_mut(lane));
        for task in &dropped {
            task.take_scheduled();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("depth", &self.depth())
            .field("pending_tasks", &self.pending_tasks())
            .field("within_transition", &self.is_within_transition())
            .field("config", &self.inner.config)
            .finish()
    }
}

/// One pass over a queue snapshot.
///
/// If a task panics, dropping the pass during unwinding unschedules the tasks
/// it did not reach and clears the live queue.
struct FlushPass<'a> {
    scheduler: &'a Scheduler,
    lane: Lane,
    tasks: Vec<Task>,
    next: usize,
    completed: bool,
}

impl FlushPass<'_> {
    fn run(mut self) {
        while let Some(task) = self.tasks.get(self.next).cloned() {
            self.next += 1;
            if task.take_scheduled() {
                task.run();
            }
        }
        self.completed = true;
    }
}

impl Drop for FlushPass<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        let skipped = &self.tasks[self.next..];
        for task in skipped {
            task.take_scheduled();
        }
        self.scheduler.discard(self.lane);
        warn!(lane = ?self.lane, skipped = skipped.len(), "task panicked, flush aborted");
    }
}

/// Guard for one `batch`/`batch_transition` call.
///
/// Leaving normally flushes if this is the outermost scope. Leaving by
/// unwinding restores the depth, and the outermost scope drops whatever is
/// still queued.
struct BatchScope<'a> {
    scheduler: &'a Scheduler,
    root_transition: bool,
    finished: bool,
}

impl<'a> BatchScope<'a> {
    fn enter(scheduler: &'a Scheduler, transition: bool) -> Self {
        let mut state = scheduler.inner.state.borrow_mut();
        state.depth += 1;
        let root_transition = transition && !state.within_transition;
        if transition {
            state.within_transition = true;
        }

        Self {
            scheduler,
            root_transition,
            finished: false,
        }
    }

    fn exit(mut self) {
        if self.scheduler.depth() == 1 {
            self.scheduler.flush();
        }
        self.finished = true;
        self.leave();
    }

    /// Pop this scope. Returns the remaining depth.
    fn leave(&self) -> usize {
        let mut state = self.scheduler.inner.state.borrow_mut();
        state.depth -= 1;
        if self.root_transition {
            state.within_transition = false;
        }
        state.depth
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if self.leave() == 0 {
            self.scheduler.set_within_transition(false);
            self.scheduler.discard(Lane::Ordinary);
            self.scheduler.discard(Lane::Transition);
        }
    }
}
