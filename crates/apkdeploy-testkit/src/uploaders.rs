//! Uploader doubles.

use apkdeploy_error::{Result, transport_error};
use apkdeploy_ports::Uploader;
use apkdeploy_schema::{UploadMetadata, UploadResult, UploadTarget};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Answers each call with the next scripted result and records the targets
/// it was asked to upload. Calls past the end of the script fail.
#[derive(Debug, Default)]
pub struct ScriptedUploader {
    script: RefCell<VecDeque<Result<UploadResult>>>,
    calls: RefCell<Vec<UploadTarget>>,
}

impl ScriptedUploader {
    pub fn new(script: impl IntoIterator<Item = Result<UploadResult>>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            calls: RefCell::default(),
        }
    }

    /// Every call succeeds with the given public URLs, in order.
    pub fn with_public_urls<'a>(urls: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(urls.into_iter().map(|u| Ok(result_with_public(u))))
    }

    pub fn calls(&self) -> Vec<UploadTarget> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Uploader for ScriptedUploader {
    fn upload(&self, target: &UploadTarget, _metadata: &UploadMetadata) -> Result<UploadResult> {
        self.calls.borrow_mut().push(target.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(transport_error("no scripted result")))
    }
}

pub fn result_with_public(url: &str) -> UploadResult {
    UploadResult {
        public_url: Some(url.to_string()),
        ..UploadResult::default()
    }
}
