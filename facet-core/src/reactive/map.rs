//! Derived facets.
//!
//! Two strategies are offered for every arity:
//!
//! - **cached**: the derived facet is a [`WritableFacet`] fed by a start
//!   subscription. The combine function runs once per upstream change no
//!   matter how many listeners there are, and the result is stored.
//! - **lightweight**: nothing is stored. `get` pulls fresh values from the
//!   sources, and every `observe` call builds its own private pipeline,
//!   including its own comparator when an equality check is given.
//!
//! A combine function returning `None` produces no value: listeners are not
//! called and a cached facet keeps what it had.
//!
//! With several sources, source callbacks only fill slots and schedule a
//! task; the combine step runs when the task is flushed. A batch touching
//! multiple sources therefore produces one combined emission, and a diamond
//! (two derivations of the same root combined again) never sees a half
//! updated pair.

use std::cell::RefCell;
use std::rc::Rc;

use crate::equality::{DefaultEquality, EqualityCheck};
use crate::schedule::{Scheduler, Task};

use super::facet::{Facet, FacetBuilder, Listener, Observable, Updater, WritableFacet};
use super::sources::FacetSources;
use super::subscription::{Cleanup, Subscription};

/// Cached derivation of a single facet, with the default equality check.
pub fn map_facet_cached<S, T, F>(source: &Facet<S>, f: F) -> Facet<T>
where
    S: 'static,
    T: Clone + DefaultEquality + 'static,
    F: Fn(&S) -> Option<T> + 'static,
{
    cached_single(source, f, WritableFacet::builder(None))
}

/// Cached derivation of a single facet with a custom equality check.
pub fn map_facet_cached_with<S, T, F>(source: &Facet<S>, f: F, check: EqualityCheck<T>) -> Facet<T>
where
    S: 'static,
    T: Clone + 'static,
    F: Fn(&S) -> Option<T> + 'static,
{
    cached_single(source, f, FacetBuilder::new(None).equality_check(check))
}

/// Cached derivation of several facets, with the default equality check.
pub fn map_facets_cached<Src, T, F>(sources: Src, f: F) -> Facet<T>
where
    Src: FacetSources,
    T: Clone + DefaultEquality + 'static,
    F: Fn(&Src::Values) -> Option<T> + 'static,
{
    cached_many(sources, f, WritableFacet::builder(None))
}

/// Cached derivation of several facets with a custom equality check.
pub fn map_facets_cached_with<Src, T, F>(sources: Src, f: F, check: EqualityCheck<T>) -> Facet<T>
where
    Src: FacetSources,
    T: Clone + 'static,
    F: Fn(&Src::Values) -> Option<T> + 'static,
{
    cached_many(sources, f, FacetBuilder::new(None).equality_check(check))
}

/// Lightweight derivation of a single facet. Every value is forwarded.
pub fn map_facet_lightweight<S, T, F>(source: &Facet<S>, f: F) -> Facet<T>
where
    S: 'static,
    T: 'static,
    F: Fn(&S) -> Option<T> + 'static,
{
    Facet::from_observable(LightweightSingle {
        source: source.clone(),
        f: Rc::new(f),
        check: None,
    })
}

/// Lightweight derivation of a single facet with a per-observer equality
/// check.
pub fn map_facet_lightweight_with<S, T, F>(
    source: &Facet<S>,
    f: F,
    check: EqualityCheck<T>,
) -> Facet<T>
where
    S: 'static,
    T: 'static,
    F: Fn(&S) -> Option<T> + 'static,
{
    Facet::from_observable(LightweightSingle {
        source: source.clone(),
        f: Rc::new(f),
        check: Some(check),
    })
}

/// Lightweight derivation of several facets.
pub fn map_facets_lightweight<Src, T, F>(sources: Src, f: F) -> Facet<T>
where
    Src: FacetSources,
    T: 'static,
    F: Fn(&Src::Values) -> Option<T> + 'static,
{
    Facet::from_observable(LightweightMany::new(sources, f, None))
}

/// Lightweight derivation of several facets with a per-observer equality
/// check.
pub fn map_facets_lightweight_with<Src, T, F>(
    sources: Src,
    f: F,
    check: EqualityCheck<T>,
) -> Facet<T>
where
    Src: FacetSources,
    T: 'static,
    F: Fn(&Src::Values) -> Option<T> + 'static,
{
    Facet::from_observable(LightweightMany::new(sources, f, Some(check)))
}

fn cached_single<S, T, F>(source: &Facet<S>, f: F, builder: FacetBuilder<T>) -> Facet<T>
where
    S: 'static,
    T: Clone + 'static,
    F: Fn(&S) -> Option<T> + 'static,
{
    let source = source.clone();
    let f = Rc::new(f);

    builder
        .scheduler(source.scheduler())
        .start_subscription(move |update: Updater<T>| {
            let f = Rc::clone(&f);
            let subscription = source.observe(move |value: &S| {
                if let Some(result) = f(value) {
                    update.update(result);
                }
            });
            Cleanup::from(subscription)
        })
        .build()
        .facet()
}

fn cached_many<Src, T, F>(sources: Src, f: F, builder: FacetBuilder<T>) -> Facet<T>
where
    Src: FacetSources,
    T: Clone + 'static,
    F: Fn(&Src::Values) -> Option<T> + 'static,
{
    let scheduler = sources.scheduler();
    let f = Rc::new(f);

    builder
        .scheduler(scheduler.clone())
        .start_subscription(move |update: Updater<T>| {
            let slots = Rc::new(RefCell::new(sources.empty_slots()));

            let task = {
                let slots = Rc::clone(&slots);
                let f = Rc::clone(&f);
                Task::new(move || {
                    let values = Src::filled(&slots.borrow());
                    if let Some(result) = values.and_then(|values| f(&values)) {
                        update.update(result);
                    }
                })
            };

            let subscriptions = sources.observe_into(&slots, &schedule_on_change(&scheduler, &task));

            let scheduler = scheduler.clone();
            Cleanup::new(move || {
                scheduler.cancel_scheduled_task(&task);
                drop(subscriptions);
            })
        })
        .build()
        .facet()
}

fn schedule_on_change(scheduler: &Scheduler, task: &Task) -> Rc<dyn Fn()> {
    let scheduler = scheduler.clone();
    let task = task.clone();
    Rc::new(move || scheduler.schedule_task(&task))
}

struct LightweightSingle<S, T, F> {
    source: Facet<S>,
    f: Rc<F>,
    check: Option<EqualityCheck<T>>,
}

impl<S, T, F> Observable<T> for LightweightSingle<S, T, F>
where
    S: 'static,
    T: 'static,
    F: Fn(&S) -> Option<T> + 'static,
{
    fn get(&self) -> Option<T> {
        self.source.get().and_then(|value| (self.f)(&value))
    }

    fn observe_listener(&self, listener: Listener<T>) -> Subscription {
        let f = Rc::clone(&self.f);
        let comparator = RefCell::new(self.check.as_ref().map(EqualityCheck::comparator));

        self.source.observe(move |value: &S| {
            let Some(result) = f(value) else {
                return;
            };
            let unchanged = match comparator.borrow_mut().as_mut() {
                Some(comparator) => comparator(&result),
                None => false,
            };
            if !unchanged {
                listener(&result);
            }
        })
    }

    fn scheduler(&self) -> Scheduler {
        self.source.scheduler()
    }
}

struct LightweightMany<Src, T, F> {
    sources: Src,
    f: Rc<F>,
    check: Option<EqualityCheck<T>>,
    scheduler: Scheduler,
}

impl<Src: FacetSources, T, F> LightweightMany<Src, T, F> {
    fn new(sources: Src, f: F, check: Option<EqualityCheck<T>>) -> Self {
        Self {
            scheduler: sources.scheduler(),
            sources,
            f: Rc::new(f),
            check,
        }
    }
}

impl<Src, T, F> Observable<T> for LightweightMany<Src, T, F>
where
    Src: FacetSources,
    T: 'static,
    F: Fn(&Src::Values) -> Option<T> + 'static,
{
    fn get(&self) -> Option<T> {
        self.sources.pull().and_then(|values| (self.f)(&values))
    }

    fn observe_listener(&self, listener: Listener<T>) -> Subscription {
        let slots = Rc::new(RefCell::new(self.sources.empty_slots()));
        let comparator = RefCell::new(self.check.as_ref().map(EqualityCheck::comparator));

        let task = {
            let slots = Rc::clone(&slots);
            let f = Rc::clone(&self.f);
            Task::new(move || {
                let values = Src::filled(&slots.borrow());
                let Some(result) = values.and_then(|values| f(&values)) else {
                    return;
                };
                let unchanged = match comparator.borrow_mut().as_mut() {
                    Some(comparator) => comparator(&result),
                    None => false,
                };
                if !unchanged {
                    listener(&result);
                }
            })
        };

        let subscriptions = self
            .sources
            .observe_into(&slots, &schedule_on_change(&self.scheduler, &task));

        let scheduler = self.scheduler.clone();
        Subscription::new(move || {
            scheduler.cancel_scheduled_task(&task);
            drop(subscriptions);
        })
    }

    fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }
}
