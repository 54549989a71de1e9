//! Uniform collection checks.
//!
//! These apply one item check to every slot of an array or every entry of a
//! map, keeping one comparator per slot so each slot remembers its own
//! previous value. Every slot is evaluated on every call, even after a
//! difference has been found, so no slot's state falls behind.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

use super::{strict_equality_check, Comparator, EqualityCheck};

/// Map-like values that can be checked key by key.
pub trait ObjectEntries {
    type Key: Clone + Eq + Hash + 'static;
    type Value: 'static;

    /// Visit every entry.
    fn for_each_entry(&self, visit: &mut dyn FnMut(&Self::Key, &Self::Value));

    fn entry_count(&self) -> usize;
}

impl<K, V, S> ObjectEntries for HashMap<K, V, S>
where
    K: Clone + Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn for_each_entry(&self, visit: &mut dyn FnMut(&K, &V)) {
        for (key, value) in self {
            visit(key, value);
        }
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

impl<K, V> ObjectEntries for BTreeMap<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: 'static,
{
    type Key = K;
    type Value = V;

    fn for_each_entry(&self, visit: &mut dyn FnMut(&K, &V)) {
        for (key, value) in self {
            visit(key, value);
        }
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> ObjectEntries for IndexMap<K, V, S>
where
    K: Clone + Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn for_each_entry(&self, visit: &mut dyn FnMut(&K, &V)) {
        for (key, value) in self {
            visit(key, value);
        }
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

/// Apply `item` to every index of a `Vec`.
///
/// Unchanged only if the length is the same and every slot is unchanged.
/// Slots past the current length are dropped, so an index that reappears
/// later is compared with a fresh comparator.
pub fn create_uniform_array_equality_check<I>(item: EqualityCheck<I>) -> EqualityCheck<Vec<I>>
where
    I: 'static,
{
    EqualityCheck::new(move || {
        let item = item.clone();
        let mut slots: Vec<Comparator<I>> = Vec::new();
        let mut primed = false;

        Box::new(move |current: &Vec<I>| {
            let mut unchanged = primed && slots.len() == current.len();

            for (index, value) in current.iter().enumerate() {
                if index == slots.len() {
                    slots.push(item.comparator());
                }
                let slot = &mut slots[index];
                if !slot(value) {
                    unchanged = false;
                }
            }

            slots.truncate(current.len());
            primed = true;
            unchanged
        })
    })
}

/// Apply `item` to every entry of a map, keyed by entry key.
///
/// Unchanged only if the key set is the same and every entry is unchanged.
/// State for keys that disappeared is dropped.
pub fn create_uniform_object_equality_check<M>(item: EqualityCheck<M::Value>) -> EqualityCheck<M>
where
    M: ObjectEntries + 'static,
{
    EqualityCheck::new(move || {
        let item = item.clone();
        let mut slots: IndexMap<M::Key, Comparator<M::Value>> = IndexMap::new();
        let mut primed = false;

        Box::new(move |current: &M| {
            let mut unchanged = primed;
            let mut next = IndexMap::with_capacity(current.entry_count());

            current.for_each_entry(&mut |key: &M::Key, value: &M::Value| {
                let mut comparator = match slots.swap_remove(key) {
                    Some(comparator) => comparator,
                    None => {
                        unchanged = false;
                        item.comparator()
                    }
                };
                if !comparator(value) {
                    unchanged = false;
                }
                next.insert(key.clone(), comparator);
            });

            // Leftovers are keys the new value no longer has.
            if !slots.is_empty() {
                unchanged = false;
            }

            slots = next;
            primed = true;
            unchanged
        })
    })
}

/// Per-key `==` comparison of a map against the previous map.
///
/// For nullable maps wrap it with
/// [`create_optional_value_equality_check`](super::create_optional_value_equality_check).
pub fn shallow_object_equality_check<M>() -> EqualityCheck<M>
where
    M: ObjectEntries + 'static,
    M::Value: PartialEq + Clone,
{
    create_uniform_object_equality_check(strict_equality_check())
}

/// Per-index `==` comparison of a `Vec` against the previous one.
pub fn shallow_array_equality_check<I>() -> EqualityCheck<Vec<I>>
where
    I: PartialEq + Clone + 'static,
{
    create_uniform_array_equality_check(strict_equality_check())
}
