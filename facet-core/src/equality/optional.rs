//! Nullable values.

use super::EqualityCheck;

/// Treat `None` as its own equality class around `inner`.
///
/// `None` after `None` is unchanged; any `None`/`Some` transition is changed.
/// The inner comparator is recreated whenever the value becomes `None`, so a
/// later return to the same `Some` value is reported as changed again.
pub fn create_optional_value_equality_check<T>(inner: EqualityCheck<T>) -> EqualityCheck<Option<T>>
where
    T: 'static,
{
    EqualityCheck::new(move || {
        let inner = inner.clone();
        let mut comparator = inner.comparator();
        // Whether the previous value was present; `None` before the first call.
        let mut was_present: Option<bool> = None;

        Box::new(move |current: &Option<T>| match current {
            None => {
                let unchanged = was_present == Some(false);
                if !unchanged {
                    comparator = inner.comparator();
                }
                was_present = Some(false);
                unchanged
            }
            Some(value) => {
                let continues = was_present == Some(true);
                was_present = Some(true);
                let inner_unchanged = comparator(value);
                continues && inner_unchanged
            }
        })
    })
}
