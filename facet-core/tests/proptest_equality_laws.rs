//! Property-based tests for the equality-check framework.
//!
//! These tests verify laws that must hold for any input:
//!
//! 1. A fresh comparator reports its first value as changed.
//! 2. Value-based checks report an immediate repeat as unchanged.
//! 3. The default check never treats compound values as stable.
//! 4. Uniform array checks notice any single-slot edit or length change.
//! 5. Uniform and key-specific checks evaluate every slot, so no slot
//!    falls behind after a multi-slot change.
//! 6. Optional checks forget the inner value when it becomes `None`.

use std::collections::BTreeMap;

use facet_core::equality::{
    create_object_with_key_specific_equality_check, create_optional_value_equality_check,
    default_equality_check, shallow_array_equality_check, shallow_object_equality_check,
    strict_equality_check,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Player {
    name: String,
    score: i64,
}

fn player_strategy() -> impl Strategy<Value = Player> {
    ("[a-z]{1,8}", any::<i64>()).prop_map(|(name, score)| Player { name, score })
}

fn map_strategy() -> impl Strategy<Value = BTreeMap<String, i32>> {
    prop::collection::btree_map("[a-d]", any::<i32>(), 0..4)
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn strict_first_call_changed_then_stable(value in any::<i64>()) {
        let mut comparator = strict_equality_check::<i64>().comparator();
        prop_assert!(!comparator(&value));
        prop_assert!(comparator(&value));
    }

    #[test]
    fn strict_detects_any_difference(a in any::<i64>(), b in any::<i64>()) {
        let mut comparator = strict_equality_check::<i64>().comparator();
        comparator(&a);
        prop_assert_eq!(comparator(&b), a == b);
    }

    #[test]
    fn default_compares_strings_by_value(value in ".{0,16}") {
        let mut comparator = default_equality_check::<String>().comparator();
        prop_assert!(!comparator(&value));
        prop_assert!(comparator(&value.clone()));
    }

    #[test]
    fn default_never_trusts_vectors(values in prop::collection::vec(any::<i32>(), 0..8)) {
        let mut comparator = default_equality_check::<Vec<i32>>().comparator();
        for _ in 0..3 {
            prop_assert!(!comparator(&values));
        }
    }

    #[test]
    fn comparators_from_one_check_are_independent(a in any::<u16>(), b in any::<u16>()) {
        let check = strict_equality_check::<u16>();
        let mut first = check.comparator();
        let mut second = check.comparator();

        first(&a);
        prop_assert!(!second(&b));
        prop_assert!(first(&a));
    }

    #[test]
    fn shallow_array_repeat_is_unchanged(values in prop::collection::vec(any::<i32>(), 0..8)) {
        let mut comparator = shallow_array_equality_check::<i32>().comparator();
        prop_assert!(!comparator(&values));
        prop_assert!(comparator(&values.clone()));
    }

    #[test]
    fn shallow_array_notices_single_edit(
        values in prop::collection::vec(any::<i32>(), 1..8),
        index in any::<prop::sample::Index>(),
    ) {
        let mut comparator = shallow_array_equality_check::<i32>().comparator();
        comparator(&values);

        let mut edited = values.clone();
        let slot = index.index(edited.len());
        edited[slot] = edited[slot].wrapping_add(1);
        prop_assert!(!comparator(&edited));

        // Every slot was re-evaluated, so the edited array is now the baseline.
        prop_assert!(comparator(&edited));
    }

    #[test]
    fn shallow_array_notices_length_change(
        values in prop::collection::vec(any::<i32>(), 0..8),
        extra in any::<i32>(),
    ) {
        let mut comparator = shallow_array_equality_check::<i32>().comparator();
        comparator(&values);

        let mut longer = values.clone();
        longer.push(extra);
        prop_assert!(!comparator(&longer));
        prop_assert!(!comparator(&values));
    }

    #[test]
    fn shallow_object_matches_map_equality(a in map_strategy(), b in map_strategy()) {
        let mut comparator = shallow_object_equality_check::<BTreeMap<String, i32>>().comparator();
        prop_assert!(!comparator(&a));
        prop_assert_eq!(comparator(&b), a == b);
        prop_assert!(comparator(&b));
    }

    #[test]
    fn key_specific_evaluates_every_key(before in player_strategy(), after in player_strategy()) {
        let check = create_object_with_key_specific_equality_check::<Player>()
            .key("name", |player| &player.name, strict_equality_check())
            .key("score", |player| &player.score, strict_equality_check())
            .build();
        let mut comparator = check.comparator();

        prop_assert!(!comparator(&before));
        let unchanged = before.name == after.name && before.score == after.score;
        prop_assert_eq!(comparator(&after), unchanged);
        prop_assert!(comparator(&after));
    }

    #[test]
    fn optional_forgets_inner_value_on_none(value in any::<i32>()) {
        let mut comparator = create_optional_value_equality_check(strict_equality_check::<i32>())
            .comparator();

        prop_assert!(!comparator(&Some(value)));
        prop_assert!(comparator(&Some(value)));
        prop_assert!(!comparator(&None));
        prop_assert!(comparator(&None));
        prop_assert!(!comparator(&Some(value)));
    }
}
