//! Ordered deduplication of result URLs.
//!
//! A run produces up to three URLs per target. Each kind is folded into an
//! [`UrlSet`]: distinct non-empty values in first-seen order, plus the most
//! recent non-empty value, which may repeat something already in the list.

use apkdeploy_schema::{RunOutcome, RunStatus, UploadResult};
use apkdeploy_schema::outputs::LIST_SEPARATOR;
use serde::Serialize;
use std::collections::HashSet;

/// Distinct values in encounter order plus the last value seen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UrlSet {
    values: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
    last: Option<String>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value. Empty and absent values are ignored entirely: they
    /// neither join the list nor replace the last value.
    ///
    /// Returns `true` when the value was new to the list.
    pub fn push(&mut self, value: Option<&str>) -> bool {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return false;
        };
        self.last = Some(value.to_string());
        if self.seen.insert(value.to_string()) {
            self.values.push(value.to_string());
            true
        } else {
            false
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    /// Pipe-joined list, or an empty string when nothing was recorded.
    pub fn joined(&self) -> String {
        self.values.join(LIST_SEPARATOR)
    }

    pub fn into_parts(self) -> (Vec<String>, Option<String>) {
        (self.values, self.last)
    }
}

impl<'a> FromIterator<&'a str> for UrlSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = UrlSet::new();
        for value in iter {
            set.push(Some(value));
        }
        set
    }
}

/// Accumulates the three URL kinds across a run.
#[derive(Clone, Debug, Default)]
pub struct UrlAccumulator {
    pub config: UrlSet,
    pub build: UrlSet,
    pub public: UrlSet,
    uploaded: usize,
}

impl UrlAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one successful upload result in.
    pub fn record(&mut self, result: &UploadResult) {
        self.config.push(result.config_url.as_deref());
        self.build.push(result.build_url.as_deref());
        self.public.push(result.public_url.as_deref());
        self.uploaded += 1;
    }

    pub fn uploaded(&self) -> usize {
        self.uploaded
    }

    pub fn into_outcome(self, status: RunStatus) -> RunOutcome {
        let (config_urls, last_config_url) = self.config.into_parts();
        let (build_urls, last_build_url) = self.build.into_parts();
        let (public_urls, last_public_url) = self.public.into_parts();
        RunOutcome {
            status,
            config_urls,
            build_urls,
            public_urls,
            last_config_url,
            last_build_url,
            last_public_url,
            uploaded: self.uploaded,
        }
    }
}

/// Distinct non-empty values of `items`, first occurrence kept.
pub fn dedupe_ordered<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    items.into_iter().collect::<UrlSet>().into_parts().0
}
