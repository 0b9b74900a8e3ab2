use apkdeploy_error::Result;
use apkdeploy_schema::{UploadMetadata, UploadResult, UploadTarget};

/// Sends one target to the distribution service.
///
/// Implementations perform exactly one attempt. A failure is final for the
/// target and, by extension, for the run.
pub trait Uploader {
    fn upload(&self, target: &UploadTarget, metadata: &UploadMetadata) -> Result<UploadResult>;
}

/// Key/value store that later pipeline steps read outputs from.
///
/// The default adapter shells out once per key; see `apkdeploy-export`.
pub trait OutputSink {
    fn export(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: Uploader + ?Sized> Uploader for &T {
    fn upload(&self, target: &UploadTarget, metadata: &UploadMetadata) -> Result<UploadResult> {
        (**self).upload(target, metadata)
    }
}

impl<T: OutputSink + ?Sized> OutputSink for &T {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        (**self).export(key, value)
    }
}
