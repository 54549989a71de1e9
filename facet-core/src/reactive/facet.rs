//! Facet Implementation
//!
//! A facet is the observable container: it holds a current value (or no
//! value yet), notifies listeners when the value changes, and can be fed
//! lazily by an upstream source.
//!
//! # How Facets Work
//!
//! 1. `set` runs inside a batch. The equality check decides whether the new
//!    value differs; if not, nothing happens at all.
//! 2. Otherwise the value is stored and every listener registered at that
//!    moment is called synchronously.
//! 3. `observe` delivers the current value immediately when there is one,
//!    so late subscribers catch up.
//! 4. A facet built with a start subscription starts it when the first
//!    listener arrives and tears it down when the last one leaves, resetting
//!    to its initial value.
//!
//! # Memory Layout
//!
//! [`WritableFacet`] and [`Facet`] are handles over shared state. A
//! [`Subscription`] keeps the facet it listens to alive; the [`Updater`]
//! passed into a start subscription does not, so a facet never keeps itself
//! alive through its own upstream.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::equality::{Comparator, DefaultEquality, EqualityCheck};
use crate::schedule::Scheduler;

use super::subscription::{Cleanup, ListenerId, Subscription};

/// Counter for generating unique facet IDs.
static FACET_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_facet_id() -> u64 {
    FACET_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A registered listener.
pub type Listener<T> = Rc<dyn Fn(&T)>;

/// Upstream source of a facet: called with an [`Updater`] on the first
/// listener, returns what to run after the last one leaves.
pub type StartSubscription<T> = Rc<dyn Fn(Updater<T>) -> Cleanup>;

/// The read side shared by every kind of facet.
pub trait Observable<T> {
    /// The current value, `None` if no value has been produced yet.
    fn get(&self) -> Option<T>;

    /// Register `listener`. Dropping the returned subscription removes it.
    fn observe_listener(&self, listener: Listener<T>) -> Subscription;

    /// The scheduler this facet batches its updates on.
    fn scheduler(&self) -> Scheduler;
}

/// A read-only facet handle.
///
/// Cloning a `Facet` creates a new handle to the **same** facet.
pub struct Facet<T> {
    source: Rc<dyn Observable<T>>,
}

impl<T: 'static> Facet<T> {
    /// Wrap any observable implementation.
    pub fn from_observable<O>(observable: O) -> Self
    where
        O: Observable<T> + 'static,
    {
        Self {
            source: Rc::new(observable),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.source.get()
    }

    /// Listen for values. If the facet has a value, `listener` is called
    /// with it before `observe` returns.
    pub fn observe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        self.source.observe_listener(Rc::new(listener))
    }

    pub fn observe_listener(&self, listener: Listener<T>) -> Subscription {
        self.source.observe_listener(listener)
    }

    pub fn scheduler(&self) -> Scheduler {
        self.source.scheduler()
    }
}

impl<T: Clone + 'static> Facet<T> {
    /// A facet that always holds `value` and never changes.
    pub fn constant(value: T) -> Self {
        Self::from_observable(ConstantFacet {
            value,
            scheduler: Scheduler::current(),
        })
    }
}

impl<T: Clone + DefaultEquality + 'static> Facet<T> {
    /// A facet fed only by `start`, with no public setter.
    pub fn read_only<F>(initial: Option<T>, start: F) -> Self
    where
        F: Fn(Updater<T>) -> Cleanup + 'static,
    {
        WritableFacet::builder(initial)
            .start_subscription(start)
            .build()
            .facet()
    }
}

impl<T> Clone for Facet<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Facet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet").field("value", &self.get()).finish()
    }
}

struct ConstantFacet<T> {
    value: T,
    scheduler: Scheduler,
}

impl<T: Clone> Observable<T> for ConstantFacet<T> {
    fn get(&self) -> Option<T> {
        Some(self.value.clone())
    }

    fn observe_listener(&self, listener: Listener<T>) -> Subscription {
        listener(&self.value);
        Subscription::empty()
    }

    fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }
}

/// Equality strategy as configured on a builder.
enum CheckChoice<T> {
    /// Inlined default check, no comparator allocation.
    Default(fn(&T, &T) -> bool),
    Custom(EqualityCheck<T>),
    Never,
}

/// Equality strategy of a live facet.
enum Check<T> {
    /// Compares against the facet's own current value.
    Default(fn(&T, &T) -> bool),
    /// A comparator that lives until the facet loses its value, then is
    /// rebuilt from `check`.
    Custom {
        check: EqualityCheck<T>,
        comparator: RefCell<Comparator<T>>,
    },
    Never,
}

struct FacetInner<T> {
    id: u64,
    scheduler: Scheduler,

    /// Restored when the start subscription is torn down.
    initial: Option<T>,

    value: RefCell<Option<T>>,

    /// Insertion-ordered so notification follows registration order.
    listeners: RefCell<IndexMap<ListenerId, Listener<T>>>,

    start: Option<StartSubscription<T>>,

    /// Present while the start subscription is running.
    cleanup: RefCell<Option<Cleanup>>,

    check: Check<T>,
}

impl<T: Clone + 'static> FacetInner<T> {
    fn set(&self, value: T) {
        self.scheduler.batch(|| self.apply(value));
    }

    fn is_unchanged(&self, value: &T) -> bool {
        match &self.check {
            Check::Default(same) => self
                .value
                .borrow()
                .as_ref()
                .is_some_and(|current| same(current, value)),
            Check::Custom { comparator, .. } => {
                let mut comparator = comparator.borrow_mut();
                (*comparator)(value)
            }
            Check::Never => false,
        }
    }

    fn apply(&self, value: T) {
        if self.is_unchanged(&value) {
            return;
        }

        *self.value.borrow_mut() = Some(value.clone());
        self.notify(&value);
    }

    /// Call the listeners registered when notification starts.
    ///
    /// Listeners added during the loop wait for the next value; listeners
    /// removed before their turn are skipped.
    fn notify(&self, value: &T) {
        let snapshot: SmallVec<[(ListenerId, Listener<T>); 4]> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        for (id, listener) in snapshot {
            let registered = self.listeners.borrow().contains_key(&id);
            if registered {
                listener(value);
            }
        }
    }

    fn remove_listener(&self, id: ListenerId) {
        let emptied = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.shift_remove(&id).is_some() && listeners.is_empty()
        };

        if emptied {
            self.stop();
        }
    }

    fn stop(&self) {
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup.run();
            self.reset(self.initial.clone());
            trace!(facet = self.id, "upstream subscription stopped");
        }
    }

    /// Replace the value without notifying, forgetting what the comparator
    /// has seen.
    fn reset(&self, value: Option<T>) {
        *self.value.borrow_mut() = value;
        if let Check::Custom { check, comparator } = &self.check {
            *comparator.borrow_mut() = check.comparator();
        }
    }
}

/// The `update` handle given to a start subscription.
///
/// Holds the facet weakly: updates after the facet is gone are ignored.
pub struct Updater<T> {
    facet: Weak<FacetInner<T>>,
}

impl<T: Clone + 'static> Updater<T> {
    /// Set the facet's value, as [`WritableFacet::set`] would.
    pub fn update(&self, value: T) {
        if let Some(inner) = self.facet.upgrade() {
            inner.set(value);
        }
    }
}

impl<T> Clone for Updater<T> {
    fn clone(&self) -> Self {
        Self {
            facet: Weak::clone(&self.facet),
        }
    }
}

impl<T> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("alive", &(self.facet.strong_count() > 0))
            .finish()
    }
}

/// Configures a [`WritableFacet`] before it is built.
pub struct FacetBuilder<T> {
    initial: Option<T>,
    check: CheckChoice<T>,
    start: Option<StartSubscription<T>>,
    scheduler: Option<Scheduler>,
}

impl<T: Clone + 'static> FacetBuilder<T> {
    /// A builder with no equality check: every `set` notifies.
    pub fn new(initial: Option<T>) -> Self {
        Self {
            initial,
            check: CheckChoice::Never,
            start: None,
            scheduler: None,
        }
    }

    /// Suppress updates that `check` reports as unchanged.
    pub fn equality_check(mut self, check: EqualityCheck<T>) -> Self {
        self.check = CheckChoice::Custom(check);
        self
    }

    /// Notify on every `set`, even with an identical value.
    pub fn no_equality_check(mut self) -> Self {
        self.check = CheckChoice::Never;
        self
    }

    /// Feed the facet from `start` while it has listeners.
    pub fn start_subscription<F>(mut self, start: F) -> Self
    where
        F: Fn(Updater<T>) -> Cleanup + 'static,
    {
        self.start = Some(Rc::new(start));
        self
    }

    /// Batch on `scheduler` instead of [`Scheduler::current`].
    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> WritableFacet<T> {
        let check = match self.check {
            CheckChoice::Default(same) => Check::Default(same),
            CheckChoice::Custom(check) => Check::Custom {
                comparator: RefCell::new(check.comparator()),
                check,
            },
            CheckChoice::Never => Check::Never,
        };

        WritableFacet {
            inner: Rc::new(FacetInner {
                id: next_facet_id(),
                scheduler: self.scheduler.unwrap_or_else(Scheduler::current),
                value: RefCell::new(self.initial.clone()),
                initial: self.initial,
                listeners: RefCell::new(IndexMap::new()),
                start: self.start,
                cleanup: RefCell::new(None),
                check,
            }),
        }
    }
}

/// A facet that can be written to.
///
/// # Example
///
/// ```rust,ignore
/// let count = WritableFacet::new(0);
///
/// let subscription = count.observe(|value| println!("count: {value}"));
/// // prints "count: 0"
///
/// count.set(5);  // prints "count: 5"
/// count.set(5);  // unchanged, prints nothing
/// ```
pub struct WritableFacet<T> {
    inner: Rc<FacetInner<T>>,
}

impl<T: Clone + DefaultEquality + 'static> WritableFacet<T> {
    /// A facet holding `value`, using the default equality check.
    pub fn new(value: T) -> Self {
        Self::builder(Some(value)).build()
    }

    /// A facet with no value yet, using the default equality check.
    pub fn empty() -> Self {
        Self::builder(None).build()
    }

    /// A builder preset with the default equality check.
    pub fn builder(initial: Option<T>) -> FacetBuilder<T> {
        FacetBuilder {
            check: CheckChoice::Default(T::default_eq),
            ..FacetBuilder::new(initial)
        }
    }
}

impl<T: Clone + 'static> WritableFacet<T> {
    /// Get the facet's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn get(&self) -> Option<T> {
        self.inner.value.borrow().clone()
    }

    /// Store `value` and notify listeners, unless the equality check
    /// reports it unchanged.
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }

    /// Compute the next value from the current one.
    ///
    /// Returning `None` retracts the value: the facet goes back to having no
    /// value, no listener is notified, and the equality check starts over.
    pub fn set_with_callback<F>(&self, f: F)
    where
        F: FnOnce(Option<&T>) -> Option<T>,
    {
        self.inner.scheduler.batch(|| {
            let current = self.get();
            match f(current.as_ref()) {
                Some(next) => self.inner.apply(next),
                None => self.inner.reset(None),
            }
        });
    }

    pub fn observe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        self.observe_listener(Rc::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn has_listeners(&self) -> bool {
        self.listener_count() > 0
    }

    /// A read-only handle to this facet.
    pub fn facet(&self) -> Facet<T> {
        Facet::from_observable(self.clone())
    }

    /// An update handle, as a start subscription would receive.
    pub fn updater(&self) -> Updater<T> {
        Updater {
            facet: Rc::downgrade(&self.inner),
        }
    }

    fn start(&self, start: &StartSubscription<T>) {
        trace!(facet = self.inner.id, "upstream subscription started");
        let cleanup = start(self.updater());

        // Every listener may already be gone if one unsubscribed while the
        // start subscription was delivering its first value.
        if self.has_listeners() {
            *self.inner.cleanup.borrow_mut() = Some(cleanup);
        } else {
            cleanup.run();
            self.inner.reset(self.inner.initial.clone());
        }
    }
}

impl<T: Clone + 'static> Observable<T> for WritableFacet<T> {
    fn get(&self) -> Option<T> {
        WritableFacet::get(self)
    }

    fn observe_listener(&self, listener: Listener<T>) -> Subscription {
        let id = ListenerId::new();
        let first = {
            let mut listeners = self.inner.listeners.borrow_mut();
            listeners.insert(id, Rc::clone(&listener));
            listeners.len() == 1
        };

        if let Some(value) = self.get() {
            listener(&value);
        }

        if first {
            if let Some(start) = self.inner.start.clone() {
                self.start(&start);
            }
        }

        let inner = Rc::clone(&self.inner);
        Subscription::new(move || inner.remove_listener(id))
    }

    fn scheduler(&self) -> Scheduler {
        self.inner.scheduler.clone()
    }
}

impl<T> Clone for WritableFacet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> From<WritableFacet<T>> for Facet<T> {
    fn from(facet: WritableFacet<T>) -> Self {
        Facet::from_observable(facet)
    }
}

impl<T: fmt::Debug> fmt::Debug for WritableFacet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritableFacet")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("listener_count", &self.inner.listeners.borrow().len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equality::strict_equality_check;
    use std::cell::Cell;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value: &T| sink.borrow_mut().push(value.clone()))
    }

    #[test]
    fn get_and_set() {
        let facet = WritableFacet::new(0);
        assert_eq!(facet.get(), Some(0));

        facet.set(42);
        assert_eq!(facet.get(), Some(42));
    }

    #[test]
    fn observe_catches_up_then_follows() {
        let facet = WritableFacet::new(1);
        let (seen, listener) = recorder::<i32>();

        let _subscription = facet.observe(listener);
        facet.set(2);
        facet.set(3);

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_facet_does_not_call_on_observe() {
        let facet = WritableFacet::<i32>::empty();
        let (seen, listener) = recorder::<i32>();

        let _subscription = facet.observe(listener);
        assert!(seen.borrow().is_empty());

        facet.set(7);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn default_check_suppresses_same_primitive() {
        let facet = WritableFacet::new(String::from("a"));
        let (seen, listener) = recorder::<String>();
        let _subscription = facet.observe(listener);

        facet.set("a".to_string());
        facet.set("b".to_string());
        facet.set("b".to_string());

        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn default_check_never_suppresses_compound_values() {
        let facet = WritableFacet::new(vec![1]);
        let (seen, listener) = recorder::<Vec<i32>>();
        let _subscription = facet.observe(listener);

        facet.set(vec![1]);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn custom_check_suppresses() {
        let facet = FacetBuilder::new(Some(vec![1, 2]))
            .equality_check(strict_equality_check())
            .build();
        let (seen, listener) = recorder::<Vec<i32>>();
        let _subscription = facet.observe(listener);

        // The comparator has never seen a value, so the first set notifies.
        facet.set(vec![1, 2]);
        facet.set(vec![1, 2]);
        facet.set(vec![3]);

        assert_eq!(*seen.borrow(), vec![vec![1, 2], vec![1, 2], vec![3]]);
    }

    #[test]
    fn custom_check_starts_over_after_restart() {
        let facet = FacetBuilder::<i32>::new(None)
            .equality_check(strict_equality_check())
            .start_subscription(|update| {
                update.update(7);
                Cleanup::none()
            })
            .build();

        let (first_seen, listener) = recorder::<i32>();
        let first = facet.observe(listener);
        assert_eq!(*first_seen.borrow(), vec![7]);
        drop(first);
        assert_eq!(facet.get(), None);

        let (second_seen, listener) = recorder::<i32>();
        let _second = facet.observe(listener);
        assert_eq!(*second_seen.borrow(), vec![7]);
        assert_eq!(facet.get(), Some(7));
    }

    #[test]
    fn custom_check_starts_over_after_retraction() {
        let facet = FacetBuilder::<i32>::new(None)
            .equality_check(strict_equality_check())
            .build();
        let (seen, listener) = recorder::<i32>();
        let _subscription = facet.observe(listener);

        facet.set(4);
        facet.set_with_callback(|_| None);
        facet.set(4);

        assert_eq!(*seen.borrow(), vec![4, 4]);
    }

    #[test]
    fn no_equality_check_notifies_every_set() {
        let facet = WritableFacet::builder(Some(1)).no_equality_check().build();
        let (seen, listener) = recorder::<i32>();
        let _subscription = facet.observe(listener);

        facet.set(1);
        facet.set(1);
        assert_eq!(*seen.borrow(), vec![1, 1, 1]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let facet = WritableFacet::new(0);
        let (seen, listener) = recorder::<i32>();
        let subscription = facet.observe(listener);

        facet.set(1);
        subscription.unsubscribe();
        facet.set(2);

        assert_eq!(*seen.borrow(), vec![0, 1]);
        assert!(!facet.has_listeners());
    }

    #[test]
    fn self_unsubscribe_during_notify_does_not_skip_others() {
        let facet = WritableFacet::new(0);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let first = {
            let slot = Rc::clone(&slot);
            facet.observe(move |value| {
                if *value == 1 {
                    slot.borrow_mut().take();
                }
            })
        };
        *slot.borrow_mut() = Some(first);

        let (seen, listener) = recorder::<i32>();
        let _second = facet.observe(listener);

        facet.set(1);
        assert_eq!(*seen.borrow(), vec![0, 1]);
        assert_eq!(facet.listener_count(), 1);
    }

    #[test]
    fn listener_added_during_notify_waits_for_next_value() {
        let facet = WritableFacet::new(0);
        let late_seen = Rc::new(RefCell::new(Vec::new()));
        let late_subscription: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let _adder = {
            let facet = facet.clone();
            let late_seen = Rc::clone(&late_seen);
            let late_subscription = Rc::clone(&late_subscription);
            facet.clone().observe(move |value| {
                if *value == 1 && late_subscription.borrow().is_none() {
                    let sink = Rc::clone(&late_seen);
                    let subscription = facet.observe(move |v| sink.borrow_mut().push(*v));
                    *late_subscription.borrow_mut() = Some(subscription);
                }
            })
        };

        facet.set(1);
        // Catch-up delivery only, not the emission in progress.
        assert_eq!(*late_seen.borrow(), vec![1]);

        facet.set(2);
        assert_eq!(*late_seen.borrow(), vec![1, 2]);

        late_subscription.borrow_mut().take();
    }

    #[test]
    fn set_with_callback_uses_previous() {
        let facet = WritableFacet::new(10);
        let (seen, listener) = recorder::<i32>();
        let _subscription = facet.observe(listener);

        facet.set_with_callback(|previous| previous.map(|v| v + 5));
        assert_eq!(facet.get(), Some(15));
        assert_eq!(*seen.borrow(), vec![10, 15]);
    }

    #[test]
    fn set_with_callback_retracts_silently() {
        let facet = WritableFacet::new(10);
        let (seen, listener) = recorder::<i32>();
        let _subscription = facet.observe(listener);

        facet.set_with_callback(|_| None);
        assert_eq!(facet.get(), None);
        assert_eq!(*seen.borrow(), vec![10]);

        // Setting the old value again is a change from "no value".
        facet.set(10);
        assert_eq!(*seen.borrow(), vec![10, 10]);
    }

    #[test]
    fn start_subscription_lifecycle() {
        let starts = Rc::new(Cell::new(0));
        let stops = Rc::new(Cell::new(0));

        let facet = {
            let starts = Rc::clone(&starts);
            let stops = Rc::clone(&stops);
            WritableFacet::<i32>::builder(None)
                .start_subscription(move |update| {
                    starts.set(starts.get() + 1);
                    update.update(5);
                    let stops = Rc::clone(&stops);
                    Cleanup::new(move || stops.set(stops.get() + 1))
                })
                .build()
        };

        let (seen, listener) = recorder::<i32>();
        let first = facet.observe(listener);
        assert_eq!(*seen.borrow(), vec![5]);
        assert_eq!(facet.get(), Some(5));

        let second = facet.observe(|_| {});
        let third = facet.observe(|_| {});
        drop(second);
        assert_eq!((starts.get(), stops.get()), (1, 0));

        drop(first);
        drop(third);
        assert_eq!((starts.get(), stops.get()), (1, 1));
        assert_eq!(facet.get(), None);

        let again = facet.observe(|_| {});
        assert_eq!((starts.get(), stops.get()), (2, 1));
        drop(again);
        assert_eq!((starts.get(), stops.get()), (2, 2));
    }

    #[test]
    fn facet_without_start_keeps_value_after_last_listener() {
        let facet = WritableFacet::new(1);
        let subscription = facet.observe(|_| {});
        facet.set(2);
        drop(subscription);
        assert_eq!(facet.get(), Some(2));
    }

    #[test]
    fn updater_outlives_facet_safely() {
        let facet = WritableFacet::new(1);
        let updater = facet.updater();
        drop(facet);
        updater.update(2);
    }

    #[test]
    fn reentrant_set_from_listener() {
        let facet = WritableFacet::new(0);
        let (seen, listener) = recorder::<i32>();
        let _recorder = facet.observe(listener);

        let _bump = {
            let facet = facet.clone();
            facet.clone().observe(move |value| {
                if *value < 3 {
                    facet.set(value + 1);
                }
            })
        };

        assert_eq!(facet.get(), Some(3));
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn constant_facet() {
        let facet = Facet::constant("fixed");
        let (seen, listener) = recorder::<&'static str>();
        let _subscription = facet.observe(listener);

        assert_eq!(facet.get(), Some("fixed"));
        assert_eq!(*seen.borrow(), vec!["fixed"]);
    }

    #[test]
    fn read_only_facet() {
        let facet = Facet::read_only(Some(0_u8), |update| {
            update.update(9);
            Cleanup::none()
        });
        assert_eq!(facet.get(), Some(0));

        let (seen, listener) = recorder::<u8>();
        let subscription = facet.observe(listener);
        assert_eq!(*seen.borrow(), vec![0, 9]);

        drop(subscription);
        assert_eq!(facet.get(), Some(0));
    }

    #[test]
    fn uses_builder_scheduler() {
        let scheduler = Scheduler::new();
        let facet = WritableFacet::builder(Some(1)).scheduler(scheduler.clone()).build();
        assert!(facet.facet().scheduler().ptr_eq(&scheduler));

        let depth = Rc::new(Cell::new(0));
        let seen_depth = Rc::clone(&depth);
        let probe = scheduler.clone();
        let _subscription = facet.observe(move |_| seen_depth.set(probe.depth()));

        facet.set(2);
        assert_eq!(depth.get(), 1);
    }
}
