//! Fuzz harness for `|`-delimited list parsing.

#![no_main]

use apkdeploy_env::split_list;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let items = split_list(input);
    if input.trim().is_empty() {
        assert!(items.is_empty());
        return;
    }
    assert_eq!(items.len(), input.matches('|').count() + 1);
    for item in &items {
        assert!(!item.contains('|'));
        assert_eq!(item.trim(), item);
    }
});
