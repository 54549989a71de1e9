//! Source sets for multi-facet derivation.
//!
//! A derived facet over several sources keeps one slot per source holding the
//! latest value seen from it. The combine function only runs once every slot
//! is filled.

use std::cell::RefCell;
use std::rc::Rc;

use crate::schedule::Scheduler;

use super::facet::Facet;
use super::subscription::Subscription;

/// A fixed set of facets that can be observed together.
///
/// Implemented for `Vec<Facet<S>>` (homogeneous sources) and for tuples of
/// two to six facets of any types.
pub trait FacetSources: 'static {
    /// What the combine function receives once every source has a value.
    type Values;

    /// Latest value per source.
    type Slots: 'static;

    /// Scheduler of the first source. An empty set uses the current one.
    fn scheduler(&self) -> Scheduler;

    fn empty_slots(&self) -> Self::Slots;

    /// The combined values, if every slot is filled.
    fn filled(slots: &Self::Slots) -> Option<Self::Values>;

    /// Read every source's current value.
    fn pull(&self) -> Option<Self::Values>;

    /// Observe every source, writing into `slots` and then calling `changed`.
    fn observe_into(
        &self,
        slots: &Rc<RefCell<Self::Slots>>,
        changed: &Rc<dyn Fn()>,
    ) -> Vec<Subscription>;
}

impl<S: Clone + 'static> FacetSources for Vec<Facet<S>> {
    type Values = Vec<S>;
    type Slots = Vec<Option<S>>;

    fn scheduler(&self) -> Scheduler {
        self.first()
            .map(Facet::scheduler)
            .unwrap_or_else(Scheduler::current)
    }

    fn empty_slots(&self) -> Self::Slots {
        vec![None; self.len()]
    }

    fn filled(slots: &Self::Slots) -> Option<Self::Values> {
        slots.iter().cloned().collect()
    }

    fn pull(&self) -> Option<Self::Values> {
        self.iter().map(Facet::get).collect()
    }

    fn observe_into(
        &self,
        slots: &Rc<RefCell<Self::Slots>>,
        changed: &Rc<dyn Fn()>,
    ) -> Vec<Subscription> {
        self.iter()
            .enumerate()
            .map(|(index, source)| {
                let slots = Rc::clone(slots);
                let changed = Rc::clone(changed);
                source.observe(move |value: &S| {
                    slots.borrow_mut()[index] = Some(value.clone());
                    changed();
                })
            })
            .collect()
    }
}

macro_rules! impl_facet_sources_for_tuple {
    ($first:ident : $first_idx:tt $(, $S:ident : $idx:tt)*) => {
        impl<$first, $($S),*> FacetSources for (Facet<$first>, $(Facet<$S>),*)
        where
            $first: Clone + 'static,
            $($S: Clone + 'static,)*
        {
            type Values = ($first, $($S),*);
            type Slots = (Option<$first>, $(Option<$S>),*);

            fn scheduler(&self) -> Scheduler {
                self.$first_idx.scheduler()
            }

            fn empty_slots(&self) -> Self::Slots {
                (None, $(None::<$S>),*)
            }

            fn filled(slots: &Self::Slots) -> Option<Self::Values> {
                Some((slots.$first_idx.clone()?, $(slots.$idx.clone()?),*))
            }

            fn pull(&self) -> Option<Self::Values> {
                Some((self.$first_idx.get()?, $(self.$idx.get()?),*))
            }

            fn observe_into(
                &self,
                slots: &Rc<RefCell<Self::Slots>>,
                changed: &Rc<dyn Fn()>,
            ) -> Vec<Subscription> {
                vec![
                    {
                        let slots = Rc::clone(slots);
                        let changed = Rc::clone(changed);
                        self.$first_idx.observe(move |value: &$first| {
                            slots.borrow_mut().$first_idx = Some(value.clone());
                            changed();
                        })
                    },
                    $({
                        let slots = Rc::clone(slots);
                        let changed = Rc::clone(changed);
                        self.$idx.observe(move |value: &$S| {
                            slots.borrow_mut().$idx = Some(value.clone());
                            changed();
                        })
                    }),*
                ]
            }
        }
    };
}

impl_facet_sources_for_tuple!(A: 0, B: 1);
impl_facet_sources_for_tuple!(A: 0, B: 1, C: 2);
impl_facet_sources_for_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_facet_sources_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_facet_sources_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
