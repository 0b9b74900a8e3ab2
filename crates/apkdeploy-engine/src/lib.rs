//! Orchestration for a deploy run.
//!
//! [`plan`] turns the configured path inputs into a validated target list.
//! [`Engine::run`] uploads the targets strictly in order, stops at the first
//! failure, and publishes outputs through the configured sink.

use apkdeploy_dedupe::UrlAccumulator;
use apkdeploy_error::Result;
use apkdeploy_export::{export_failed_status, export_outcome};
use apkdeploy_logging::Logger;
use apkdeploy_ports::{OutputSink, Uploader};
use apkdeploy_reconcile::{PathInput, reconcile};
use apkdeploy_schema::{RunOutcome, RunStatus, UploadMetadata, UploadTarget};
use apkdeploy_validate::validate;

/// Reconcile and validate. Reconciliation notices are logged as warnings.
///
/// Errors from here are configuration errors: nothing has been sent and
/// nothing should be exported.
pub fn plan(paths: &PathInput, metadata: &UploadMetadata, log: &Logger) -> Result<Vec<UploadTarget>> {
    let reconciled = reconcile(paths);
    for notice in &reconciled.notices {
        log.warn(notice);
    }

    validate(metadata, &reconciled.targets)?;

    log.debug(format_args!(
        "{} target(s) from {} path input",
        reconciled.targets.len(),
        paths.mode()
    ));
    Ok(reconciled.targets)
}

pub struct Engine<'a> {
    pub uploader: &'a dyn Uploader,
    pub sink: &'a dyn OutputSink,
    pub log: &'a Logger,
}

impl<'a> Engine<'a> {
    pub fn new(uploader: &'a dyn Uploader, sink: &'a dyn OutputSink, log: &'a Logger) -> Self {
        Self {
            uploader,
            sink,
            log,
        }
    }

    /// Upload every target in order.
    ///
    /// The first failing target ends the run: later targets are not
    /// attempted, `status=failed` is exported, and the error is returned with
    /// the failing package attached as context. On success the status and URL
    /// outputs are exported. Export failures only produce warnings.
    pub fn run(&self, targets: &[UploadTarget], metadata: &UploadMetadata) -> Result<RunOutcome> {
        let mut urls = UrlAccumulator::new();
        let total = targets.len();

        for (idx, target) in targets.iter().enumerate() {
            self.log.info(format_args!(
                "Uploading ({}/{}) {}",
                idx + 1,
                total,
                target.package_path
            ));
            if let Some(mapping) = target.mapping() {
                self.log.detail(format_args!("mapping: {}", mapping.display()));
            }

            match self.uploader.upload(target, metadata) {
                Ok(result) => urls.record(&result),
                Err(err) => {
                    let err = err.with_context("package", target.package_path.as_str());
                    self.log.error(format_args!("Upload failed: {err}"));
                    if idx + 1 < total {
                        self.log.warn(format_args!(
                            "skipping {} remaining target(s)",
                            total - idx - 1
                        ));
                    }
                    export_failed_status(self.sink, self.log);
                    return Err(err);
                }
            }
        }

        let outcome = urls.into_outcome(RunStatus::Success);
        self.log.info("Exporting outputs");
        export_outcome(self.sink, self.log, &outcome);
        self.log.done(format_args!("Uploaded {} package(s)", outcome.uploaded));
        Ok(outcome)
    }
}
