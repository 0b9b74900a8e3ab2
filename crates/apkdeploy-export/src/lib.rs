//! Publishing run outputs.
//!
//! [`EnvmanSink`] is the production adapter: one `envman add --key K` process
//! per key with the value fed on stdin. [`MemorySink`] records exports for
//! tests and dry runs. Publishing is always best-effort: a failed export is a
//! warning in the log and never changes the run's result.

use apkdeploy_error::{DeployError, ErrorCategory, Result, export_error};
use apkdeploy_logging::Logger;
use apkdeploy_ports::OutputSink;
use apkdeploy_schema::outputs;
use apkdeploy_schema::{RunOutcome, RunStatus};
use std::cell::RefCell;
use std::collections::HashSet;
use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Stdio};

/// Writes each key through the `envman` CLI.
#[derive(Clone, Debug)]
pub struct EnvmanSink {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Default for EnvmanSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvmanSink {
    pub fn new() -> Self {
        Self::with_command("envman", Vec::<OsString>::new())
    }

    /// Run `program leading_args... add --key K` instead of `envman`.
    pub fn with_command<P, I, A>(program: P, leading_args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    fn command(&self, key: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(["add", "--key", key])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl OutputSink for EnvmanSink {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        let mut child = self.command(key).spawn().map_err(|e| {
            DeployError::with_source("failed to start envman", ErrorCategory::Export, e)
                .with_context("key", key)
        })?;

        // A child that exits without reading closes the pipe early; its exit
        // status below is the meaningful result in that case.
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(value.as_bytes()) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(DeployError::with_source(
                        "failed to write value to envman",
                        ErrorCategory::Export,
                        e,
                    )
                    .with_context("key", key));
                }
            }
        }

        let output = child.wait_with_output().map_err(|e| {
            DeployError::with_source("failed to wait for envman", ErrorCategory::Export, e)
                .with_context("key", key)
        })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let mut err = export_error(format!("envman exited with {}", output.status))
            .with_context("key", key);
        if !stderr.is_empty() {
            err = err.with_context("stderr", stderr);
        }
        Err(err)
    }
}

/// Keeps every export in memory, in order. Keys registered with
/// [`MemorySink::failing_on`] are rejected.
#[derive(Debug, Default)]
pub struct MemorySink {
    exports: RefCell<Vec<(String, String)>>,
    failing: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            exports: RefCell::default(),
            failing: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exports(&self) -> Vec<(String, String)> {
        self.exports.borrow().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.exports.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Most recent value exported under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.exports
            .borrow()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.exports.borrow().is_empty()
    }
}

impl OutputSink for MemorySink {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        if self.failing.contains(key) {
            return Err(export_error("export rejected").with_context("key", key));
        }
        self.exports
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Export one key; a failure is logged as a warning. Returns whether the
/// export went through.
pub fn export_or_warn(sink: &dyn OutputSink, log: &Logger, key: &str, value: &str) -> bool {
    match sink.export(key, value) {
        Ok(()) => true,
        Err(e) => {
            log.warn(format_args!("Failed to export {key}, error: {e}"));
            false
        }
    }
}

/// Key/value pairs for a finished run, in publishing order.
///
/// A failed run publishes only its status. A successful one publishes the
/// status, the last URL of each kind, then the joined lists. Absent URLs are
/// published as empty strings so later steps see every key.
pub fn outcome_exports(outcome: &RunOutcome) -> Vec<(&'static str, String)> {
    let mut pairs = vec![(outputs::STATUS, outcome.status.as_str().to_string())];
    if outcome.status == RunStatus::Failed {
        return pairs;
    }
    let last = |v: &Option<String>| v.clone().unwrap_or_default();
    let join = |v: &[String]| v.join(outputs::LIST_SEPARATOR);
    pairs.extend([
        (outputs::PUBLIC_URL, last(&outcome.last_public_url)),
        (outputs::BUILD_URL, last(&outcome.last_build_url)),
        (outputs::CONFIG_URL, last(&outcome.last_config_url)),
        (outputs::PUBLIC_URL_LIST, join(&outcome.public_urls)),
        (outputs::BUILD_URL_LIST, join(&outcome.build_urls)),
        (outputs::CONFIG_URL_LIST, join(&outcome.config_urls)),
    ]);
    pairs
}

/// Publish everything [`outcome_exports`] lists. Returns the number of keys
/// that failed.
pub fn export_outcome(sink: &dyn OutputSink, log: &Logger, outcome: &RunOutcome) -> usize {
    outcome_exports(outcome)
        .into_iter()
        .filter(|(key, value)| !export_or_warn(sink, log, key, value))
        .count()
}

/// Publish `status=failed` for an aborted run.
pub fn export_failed_status(sink: &dyn OutputSink, log: &Logger) -> bool {
    export_or_warn(sink, log, outputs::STATUS, RunStatus::Failed.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkdeploy_logging::{LogLevel, LoggingConfig};

    fn outcome(status: RunStatus) -> RunOutcome {
        RunOutcome {
            status,
            config_urls: vec!["c1".into()],
            build_urls: vec!["b1".into(), "b2".into()],
            public_urls: vec![],
            last_config_url: Some("c1".into()),
            last_build_url: Some("b2".into()),
            last_public_url: None,
            uploaded: 2,
        }
    }

    #[test]
    fn success_exports_status_first_then_urls() {
        let pairs = outcome_exports(&outcome(RunStatus::Success));
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                outputs::STATUS,
                outputs::PUBLIC_URL,
                outputs::BUILD_URL,
                outputs::CONFIG_URL,
                outputs::PUBLIC_URL_LIST,
                outputs::BUILD_URL_LIST,
                outputs::CONFIG_URL_LIST,
            ]
        );
        assert_eq!(pairs[0].1, "success");
        assert_eq!(pairs[1].1, "");
        assert_eq!(pairs[2].1, "b2");
        assert_eq!(pairs[5].1, "b1|b2");
    }

    #[test]
    fn failure_exports_status_only() {
        let pairs = outcome_exports(&outcome(RunStatus::Failed));
        assert_eq!(pairs, vec![(outputs::STATUS, "failed".to_string())]);
    }

    #[test]
    fn failed_export_is_a_warning() {
        let sink = MemorySink::failing_on([outputs::BUILD_URL]);
        let log = Logger::capturing(LoggingConfig::default());

        let failures = export_outcome(&sink, &log, &outcome(RunStatus::Success));

        assert_eq!(failures, 1);
        assert_eq!(sink.exports().len(), 6);
        assert!(sink.get(outputs::BUILD_URL).is_none());
        let warnings = log.messages_at(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to export HOCKEYAPP_DEPLOY_BUILD_URL"));
    }

    #[test]
    fn failed_status_export() {
        let sink = MemorySink::new();
        let log = Logger::capturing(LoggingConfig::default());
        assert!(export_failed_status(&sink, &log));
        assert_eq!(sink.exports(), vec![(outputs::STATUS.to_string(), "failed".to_string())]);
    }

    #[test]
    fn failed_status_export_failure_is_swallowed() {
        let sink = MemorySink::failing_on([outputs::STATUS]);
        let log = Logger::capturing(LoggingConfig::default());
        assert!(!export_failed_status(&sink, &log));
        assert!(sink.is_empty());
    }

    #[test]
    fn memory_sink_keeps_latest_value() {
        let sink = MemorySink::new();
        sink.export("K", "1").unwrap();
        sink.export("K", "2").unwrap();
        assert_eq!(sink.get("K").as_deref(), Some("2"));
        assert_eq!(sink.keys(), vec!["K", "K"]);
    }

    #[test]
    fn missing_envman_is_export_error() {
        let sink = EnvmanSink::with_command("apkdeploy-no-such-binary-for-tests", Vec::<OsString>::new());
        let err = sink.export("K", "v").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Export);
        assert_eq!(err.context_value("key"), Some("K"));
    }
}
