//! Fuzz harness for path reconciliation.
//!
//! Input is split on NUL into the four path fields; a leading byte picks the
//! toggle. Reconciliation must never panic and list modes must never produce
//! more targets than packages supplied.

#![no_main]

use apkdeploy_env::split_list;
use apkdeploy_reconcile::{PathInput, RawPaths, reconcile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&toggle, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };

    let mut fields = text.split('\0');
    let mut next = || fields.next().unwrap_or_default().to_string();
    let single_package = next();
    let package_list = split_list(&next());
    let single_mapping = next();
    let mapping_list = split_list(&next());

    let use_list = match toggle % 3 {
        0 => None,
        1 => Some(true),
        _ => Some(false),
    };

    let input = PathInput::from_raw(RawPaths {
        single_package,
        package_list: package_list.clone(),
        single_mapping,
        mapping_list,
        use_list,
    });
    let out = reconcile(&input);

    if let PathInput::List { .. } | PathInput::Toggle { use_list: true, .. } = input {
        assert_eq!(out.targets.len(), package_list.len());
    }
    if let PathInput::Merged { .. } = input {
        assert!(out.targets.len() <= package_list.len() + 1);
    }
});
