use serde::{Deserialize, Serialize};
use std::path::Path;

/// One (package, mapping) pair uploaded in a single request.
///
/// An empty `mapping_path` means the package has no mapping file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub package_path: String,
    #[serde(default)]
    pub mapping_path: String,
}

impl UploadTarget {
    pub fn new(package_path: impl Into<String>, mapping_path: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            mapping_path: mapping_path.into(),
        }
    }

    /// A target without a mapping file.
    pub fn package_only(package_path: impl Into<String>) -> Self {
        Self::new(package_path, "")
    }

    pub fn package(&self) -> &Path {
        Path::new(&self.package_path)
    }

    pub fn mapping(&self) -> Option<&Path> {
        if self.mapping_path.is_empty() {
            None
        } else {
            Some(Path::new(&self.mapping_path))
        }
    }

    pub fn has_mapping(&self) -> bool {
        !self.mapping_path.is_empty()
    }
}
