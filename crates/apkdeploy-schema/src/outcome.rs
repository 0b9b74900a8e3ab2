use serde::{Deserialize, Serialize};
use std::fmt;

/// What the distribution service returned for one target.
///
/// Every field is optional on the wire. Empty strings are folded into `None`
/// by [`UploadResult::normalized`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub config_url: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub build_url: Option<String>,
}

impl UploadResult {
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            config_url: keep(self.config_url),
            public_url: keep(self.public_url),
            build_url: keep(self.build_url),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated state of a whole run.
///
/// The URL lists hold distinct, non-empty values in encounter order. The
/// `last_*` fields hold the most recent non-empty value of each kind, which
/// may repeat an earlier list entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub config_urls: Vec<String>,
    pub build_urls: Vec<String>,
    pub public_urls: Vec<String>,
    pub last_config_url: Option<String>,
    pub last_build_url: Option<String>,
    pub last_public_url: Option<String>,
    /// Number of targets that completed before the run ended.
    pub uploaded: usize,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
