//! Environment variable utilities for apkdeploy.
//!
//! CI steps receive every input as an environment variable. Reading goes
//! through an [`EnvLookup`] so callers can substitute a fixed map in tests
//! instead of mutating the process environment.

use std::collections::HashMap;
use std::env;

/// Separator for list-valued inputs.
pub const LIST_SEPARATOR: char = '|';

/// Source of environment values.
pub trait EnvLookup {
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// A fixed set of variables.
#[derive(Clone, Debug, Default)]
pub struct MapEnv(pub HashMap<String, String>);

impl MapEnv {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl EnvLookup for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Gets a variable, treating unset as empty.
pub fn get_var_or_empty(env: &dyn EnvLookup, name: &str) -> String {
    env.get(name).unwrap_or_default()
}

/// Gets a variable, returning None if unset or blank.
pub fn get_non_empty(env: &dyn EnvLookup, name: &str) -> Option<String> {
    env.get(name).filter(|v| !v.trim().is_empty())
}

/// Truthy values: "1", "true", "yes", "on" (case-insensitive).
pub fn is_truthy(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "1" || lower == "true" || lower == "yes" || lower == "on"
}

/// Falsy values: "0", "false", "no", "off" (case-insensitive).
pub fn is_falsy(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "0" || lower == "false" || lower == "no" || lower == "off"
}

/// Parses an optional boolean toggle. Blank or unrecognised values are None.
pub fn parse_toggle(value: &str) -> Option<bool> {
    if is_truthy(value) {
        Some(true)
    } else if is_falsy(value) {
        Some(false)
    } else {
        None
    }
}

/// Splits a `|`-delimited value into trimmed entries.
///
/// A blank value yields an empty list. Blank entries between separators are
/// kept so validation can reject them.
pub fn split_list(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value
        .split(LIST_SEPARATOR)
        .map(|s| s.trim().to_string())
        .collect()
}

/// Reads a list-valued variable.
pub fn get_list(env: &dyn EnvLookup, name: &str) -> Vec<String> {
    env.get(name).map(|v| split_list(&v)).unwrap_or_default()
}
