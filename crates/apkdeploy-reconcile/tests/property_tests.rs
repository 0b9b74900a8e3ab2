//! Property tests for apkdeploy-reconcile
//!
//! Positional pairing invariants for package and mapping lists.

use apkdeploy_reconcile::{Notice, PathInput, reconcile};
use proptest::prelude::*;

fn strategy_path() -> impl Strategy<Value = String> {
    "[a-z]{1,8}\\.(apk|txt)"
}

fn strategy_distinct_packages(max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z]{1,8}\\.apk", 1..max)
        .prop_map(|set| set.into_iter().collect())
}

fn list_input(packages: Vec<String>, mappings: Vec<String>) -> PathInput {
    PathInput::Merged {
        single_package: String::new(),
        package_list: packages,
        single_mapping: String::new(),
        mapping_list: mappings,
    }
}

// ============================================================================
// Pairing
// ============================================================================

proptest! {
    // A lone package with no mappings gives exactly one target without a mapping.
    #[test]
    fn prop_single_package_yields_one_target(package in strategy_path()) {
        let r = reconcile(&PathInput::Merged {
            single_package: package.clone(),
            package_list: vec![],
            single_mapping: String::new(),
            mapping_list: vec![],
        });
        prop_assert_eq!(r.targets.len(), 1);
        prop_assert_eq!(&r.targets[0].package_path, &package);
        prop_assert_eq!(&r.targets[0].mapping_path, "");
    }

    // Short mapping lists are padded with empty entries up to the package count.
    #[test]
    fn prop_short_mapping_list_is_padded(
        packages in strategy_distinct_packages(10),
        mappings in proptest::collection::vec(strategy_path(), 0..10),
    ) {
        prop_assume!(mappings.len() < packages.len());
        let r = reconcile(&list_input(packages.clone(), mappings.clone()));
        let got = r.mapping_paths();
        prop_assert_eq!(got.len(), packages.len());
        for (i, m) in got.iter().enumerate() {
            if i < mappings.len() {
                prop_assert_eq!(*m, mappings[i].as_str());
            } else {
                prop_assert_eq!(*m, "");
            }
        }
        prop_assert!(r.notices.is_empty());
    }

    // Long mapping lists are truncated and the excess is reported.
    #[test]
    fn prop_long_mapping_list_is_truncated(
        packages in strategy_distinct_packages(6),
        mappings in proptest::collection::vec(strategy_path(), 1..12),
    ) {
        prop_assume!(mappings.len() > packages.len());
        let r = reconcile(&list_input(packages.clone(), mappings.clone()));
        prop_assert_eq!(r.mapping_paths().len(), packages.len());
        let expected = Notice::ExcessMappings { ignored: mappings[packages.len()..].to_vec() };
        prop_assert_eq!(r.notices, vec![expected]);
    }

    // Reconciling an already fully paired list changes nothing.
    #[test]
    fn prop_reconciled_lists_are_a_fixed_point(
        packages in strategy_distinct_packages(8),
        seed in proptest::collection::vec(strategy_path(), 8),
    ) {
        let mappings: Vec<String> = seed.into_iter().take(packages.len()).collect();
        let first = reconcile(&list_input(packages.clone(), mappings.clone()));
        prop_assert_eq!(first.package_paths(), packages.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(first.mapping_paths(), mappings.iter().map(String::as_str).collect::<Vec<_>>());

        let again = reconcile(&list_input(
            first.package_paths().into_iter().map(String::from).collect(),
            first.mapping_paths().into_iter().map(String::from).collect(),
        ));
        prop_assert_eq!(again, first);
    }

    // When the single mapping disagrees with a non-empty list entry, the list entry wins.
    #[test]
    fn prop_list_mapping_wins_on_conflict(
        packages in strategy_distinct_packages(6),
        pick in any::<prop::sample::Index>(),
        other in "[a-z]{1,8}\\.map",
    ) {
        let mappings: Vec<String> = packages.iter().map(|p| format!("{p}.txt")).collect();
        let idx = pick.index(packages.len());
        let r = reconcile(&PathInput::Merged {
            single_package: packages[idx].clone(),
            package_list: packages.clone(),
            single_mapping: other,
            mapping_list: mappings.clone(),
        });
        prop_assert_eq!(r.targets.len(), packages.len());
        prop_assert_eq!(&r.targets[idx].mapping_path, &mappings[idx]);
        prop_assert_eq!(r.notices.len(), 1);
    }

    // The target count never depends on the mapping list length.
    #[test]
    fn prop_target_count_follows_packages(
        packages in proptest::collection::vec(strategy_path(), 0..10),
        mappings in proptest::collection::vec(strategy_path(), 0..10),
    ) {
        let r = reconcile(&PathInput::List { package_list: packages.clone(), mapping_list: mappings });
        prop_assert_eq!(r.targets.len(), packages.len());
    }
}
