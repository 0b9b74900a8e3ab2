use serde::{Deserialize, Serialize};

/// Metadata shared by every upload in a run.
///
/// Supplied once at startup and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub notes: String,
    pub notes_type: String,
    pub notify: String,
    pub status: String,
    pub mandatory: String,
    pub tags: String,
    pub commit_sha: String,
    pub build_server_url: String,
    pub repository_url: String,
    /// Selects the per-app upload endpoint when present.
    pub app_id: Option<String>,
    pub api_token: String,
}

impl UploadMetadata {
    /// Plain form fields sent with every upload, in a stable order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("notes", self.notes.clone()),
            ("notes_type", self.notes_type.clone()),
            ("notify", self.notify.clone()),
            ("status", self.status.clone()),
            ("mandatory", self.mandatory.clone()),
            ("tags", self.tags.clone()),
            ("commit_sha", self.commit_sha.clone()),
            ("build_server_url", self.build_server_url.clone()),
            ("repository_url", self.repository_url.clone()),
        ]
    }

    /// Names and values of the fields that must not be empty.
    pub fn required_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("api_token", self.api_token.as_str()),
            ("notes_type", self.notes_type.as_str()),
            ("notify", self.notify.as_str()),
            ("status", self.status.as_str()),
            ("mandatory", self.mandatory.as_str()),
        ]
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref().filter(|id| !id.is_empty())
    }
}
