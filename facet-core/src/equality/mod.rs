//! Equality Checks
//!
//! An equality check decides whether a value differs from the previous one
//! seen by a particular consumer. It is a factory: every call to
//! [`EqualityCheck::comparator`] yields an independent, stateful
//! [`Comparator`] that remembers its own previous value. Comparators are
//! never shared between unrelated subscriptions.
//!
//! A comparator returns `true` when the value should be treated as
//! unchanged (and the update suppressed). The first call on a fresh
//! comparator always returns `false`.
//!
//! # Built-in checks
//!
//! - [`strict_equality_check`]: `PartialEq` against the previous value.
//! - [`default_equality_check`]: by value for primitive-like types only, see
//!   [`DefaultEquality`].
//! - [`shallow_object_equality_check`], [`shallow_array_equality_check`]
//! - [`create_uniform_array_equality_check`],
//!   [`create_uniform_object_equality_check`]: one item check applied per
//!   index or per key.
//! - [`create_object_with_key_specific_equality_check`]: one check per
//!   named key.
//! - [`create_optional_value_equality_check`]: `None` as its own class.

mod keyed;
mod optional;
mod uniform;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

pub use keyed::{create_object_with_key_specific_equality_check, KeySpecificEqualityCheck};
pub use optional::create_optional_value_equality_check;
pub use uniform::{
    create_uniform_array_equality_check, create_uniform_object_equality_check,
    shallow_array_equality_check, shallow_object_equality_check, ObjectEntries,
};

/// A stateful comparator. Returns `true` for "unchanged".
pub type Comparator<T> = Box<dyn FnMut(&T) -> bool>;

/// A factory of independent comparators.
///
/// Cloning an `EqualityCheck` clones the factory, not any comparator state.
pub struct EqualityCheck<T> {
    factory: Rc<dyn Fn() -> Comparator<T>>,
}

impl<T> EqualityCheck<T> {
    /// Wrap a comparator factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Comparator<T> + 'static,
    {
        Self {
            factory: Rc::new(factory),
        }
    }

    /// Create a fresh comparator with no previous value.
    pub fn comparator(&self) -> Comparator<T> {
        (self.factory)()
    }
}

impl<T> Clone for EqualityCheck<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for EqualityCheck<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityCheck").finish_non_exhaustive()
    }
}

/// Build a check that compares each value against the last one it saw.
fn previous_value_check<T>(same: fn(&T, &T) -> bool) -> EqualityCheck<T>
where
    T: Clone + 'static,
{
    EqualityCheck::new(move || {
        let mut previous: Option<T> = None;
        Box::new(move |current: &T| {
            let unchanged = previous.as_ref().is_some_and(|previous| same(previous, current));
            if !unchanged {
                previous = Some(current.clone());
            }
            unchanged
        })
    })
}

/// Suppress values that are `==` to the previous one.
///
/// Suitable for primitives and for handles whose `PartialEq` is identity,
/// such as a newtype over `Rc::ptr_eq`.
pub fn strict_equality_check<T>() -> EqualityCheck<T>
where
    T: PartialEq + Clone + 'static,
{
    previous_value_check(|previous, current| previous == current)
}

/// The check used when none is supplied.
///
/// Compares by value only for types whose [`DefaultEquality`] says so;
/// everything else is reported as changed on every call.
pub fn default_equality_check<T>() -> EqualityCheck<T>
where
    T: DefaultEquality + Clone + 'static,
{
    previous_value_check(T::default_eq)
}

/// How the default equality check treats a type.
///
/// Primitive-like values (numbers, `bool`, `char`, strings, `()`) compare by
/// value. Containers, shared pointers and other compound values can be
/// mutated behind the facet's back, so the default never assumes they are
/// stable: the provided method returns `false`. A user type opts into the
/// default check with an empty impl, or overrides `default_eq` when it is
/// immutable.
///
/// `Option<P>` plays the role of a nullable primitive: `None == None` is
/// unchanged, any `None`/`Some` transition is changed.
pub trait DefaultEquality {
    fn default_eq(&self, other: &Self) -> bool {
        let _ = other;
        false
    }
}

macro_rules! compare_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl DefaultEquality for $t {
                fn default_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

compare_by_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, (),
    String, &'static str,
);

impl<T: DefaultEquality> DefaultEquality for Option<T> {
    fn default_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(previous), Some(current)) => previous.default_eq(current),
            _ => false,
        }
    }
}

impl<T> DefaultEquality for Vec<T> {}
impl<T> DefaultEquality for VecDeque<T> {}
impl<T: ?Sized> DefaultEquality for Box<T> {}
impl<T: ?Sized> DefaultEquality for Rc<T> {}
impl<T: ?Sized> DefaultEquality for Arc<T> {}
impl<K, V, S> DefaultEquality for HashMap<K, V, S> {}
impl<K, V> DefaultEquality for BTreeMap<K, V> {}
impl<K, V, S> DefaultEquality for IndexMap<K, V, S> {}
impl<T, S> DefaultEquality for HashSet<T, S> {}
impl<T> DefaultEquality for BTreeSet<T> {}

macro_rules! always_changed_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> DefaultEquality for ($($name,)+) {}
    };
}

always_changed_tuple!(A);
always_changed_tuple!(A, B);
always_changed_tuple!(A, B, C);
always_changed_tuple!(A, B, C, D);
always_changed_tuple!(A, B, C, D, E);
always_changed_tuple!(A, B, C, D, E, F);
