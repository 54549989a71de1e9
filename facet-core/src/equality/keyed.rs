//! Key-specific checks for struct-like values.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use super::{Comparator, EqualityCheck};

struct KeyCheck<T> {
    name: &'static str,
    comparator: Rc<dyn Fn() -> Comparator<T>>,
}

/// Builder for a check that gives every named key its own comparator.
///
/// ```rust,ignore
/// let check = create_object_with_key_specific_equality_check::<Player>()
///     .key("name", |p| &p.name, strict_equality_check())
///     .key("tags", |p| &p.tags, shallow_array_equality_check())
///     .build();
/// ```
pub struct KeySpecificEqualityCheck<T> {
    keys: Vec<KeyCheck<T>>,
}

/// Start building a key-specific check for `T`.
pub fn create_object_with_key_specific_equality_check<T: 'static>() -> KeySpecificEqualityCheck<T> {
    KeySpecificEqualityCheck { keys: Vec::new() }
}

impl<T: 'static> KeySpecificEqualityCheck<T> {
    /// Check the value projected by `project` with `check`.
    pub fn key<V, P>(mut self, name: &'static str, project: P, check: EqualityCheck<V>) -> Self
    where
        V: 'static,
        P: for<'a> Fn(&'a T) -> &'a V + 'static,
    {
        let project = Rc::new(project);
        self.keys.push(KeyCheck {
            name,
            comparator: Rc::new(move || -> Comparator<T> {
                let project = Rc::clone(&project);
                let mut comparator = check.comparator();
                Box::new(move |value: &T| comparator(project(value)))
            }),
        });
        self
    }

    /// Names of the configured keys, in evaluation order.
    pub fn key_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keys.iter().map(|key| key.name)
    }

    /// Finish the check. Every key is evaluated on every call and the result
    /// is the AND of all keys.
    pub fn build(self) -> EqualityCheck<T> {
        let keys: Rc<[KeyCheck<T>]> = self.keys.into();

        EqualityCheck::new(move || {
            let mut comparators: SmallVec<[Comparator<T>; 4]> =
                keys.iter().map(|key| (key.comparator)()).collect();
            let mut primed = false;

            Box::new(move |current: &T| {
                let mut unchanged = primed;
                for comparator in comparators.iter_mut() {
                    if !comparator(current) {
                        unchanged = false;
                    }
                }
                primed = true;
                unchanged
            })
        })
    }
}

impl<T: 'static> fmt::Debug for KeySpecificEqualityCheck<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.key_names())
            .finish()
    }
}
