use apkdeploy_dedupe::{UrlSet, dedupe_ordered};
use proptest::prelude::*;
use std::collections::HashSet;

fn values() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof![Just(String::new()), "[a-c]{1,2}"], 0..20)
}

proptest! {
    #[test]
    fn no_duplicates_and_no_empties(items in values()) {
        let out = dedupe_ordered(items.iter().map(String::as_str));
        let unique: HashSet<&String> = out.iter().collect();
        prop_assert_eq!(unique.len(), out.len());
        prop_assert!(out.iter().all(|v| !v.is_empty()));
    }

    #[test]
    fn every_non_empty_input_survives(items in values()) {
        let out = dedupe_ordered(items.iter().map(String::as_str));
        for item in items.iter().filter(|v| !v.is_empty()) {
            prop_assert!(out.contains(item));
        }
    }

    #[test]
    fn output_follows_first_occurrence(items in values()) {
        let out = dedupe_ordered(items.iter().map(String::as_str));
        let firsts: Vec<usize> = out
            .iter()
            .map(|v| items.iter().position(|i| i == v).unwrap())
            .collect();
        prop_assert!(firsts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn last_is_final_non_empty(items in values()) {
        let set: UrlSet = items.iter().map(String::as_str).collect();
        let expected = items.iter().rev().find(|v| !v.is_empty()).map(String::as_str);
        prop_assert_eq!(set.last(), expected);
    }

    #[test]
    fn deduping_twice_changes_nothing(items in values()) {
        let once = dedupe_ordered(items.iter().map(String::as_str));
        let twice = dedupe_ordered(once.iter().map(String::as_str));
        prop_assert_eq!(once, twice);
    }
}
