//! Step logging for apkdeploy.
//!
//! CI logs are read by people scrolling a build page, so the plain format is
//! the step vocabulary a deploy step usually prints: section headers, indented
//! details, green "done" lines, warnings, and the final failure. The JSON
//! format emits one [`LogEntry`] per line for machine consumers.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// Check if this level should log messages at the given level
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= *self
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Plain
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// ANSI colours in plain output
    #[serde(default = "default_true")]
    pub colors: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Plain,
            colors: true,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }
}

/// How a line is presented in plain output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Section header, e.g. "Configs:".
    Header,
    /// Indented detail under a header.
    Detail,
    /// A step that completed.
    Done,
    /// Warnings and errors; prefixed with the level.
    Alert,
}

/// A log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, style: Style, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            style,
            component: None,
            message: message.into(),
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }
}

const RED: &str = "\x1b[31;1m";
const YELLOW: &str = "\x1b[33;1m";
const GREEN: &str = "\x1b[32;1m";
const BLUE: &str = "\x1b[34;1m";
const RESET: &str = "\x1b[0m";

/// Render an entry as a single plain-text line.
pub fn render_plain(entry: &LogEntry, colors: bool) -> String {
    let text = match (entry.style, entry.level) {
        (Style::Detail, _) => format!("  {}", entry.message),
        (Style::Alert, LogLevel::Error) => format!("ERROR: {}", entry.message),
        (Style::Alert, LogLevel::Warn) => format!("WARN: {}", entry.message),
        _ => entry.message.clone(),
    };
    let text = match &entry.component {
        Some(c) => format!("[{c}] {text}"),
        None => text,
    };
    if !colors {
        return text;
    }
    let color = match (entry.style, entry.level) {
        (Style::Header, _) => BLUE,
        (Style::Done, _) => GREEN,
        (Style::Alert, LogLevel::Error) => RED,
        (Style::Alert, _) => YELLOW,
        (Style::Detail, _) => return text,
    };
    format!("{color}{text}{RESET}")
}

/// Render an entry as one JSON line.
pub fn render_json(entry: &LogEntry) -> String {
    serde_json::to_string(entry).unwrap_or_else(|_| entry.message.clone())
}

/// Step logger.
///
/// Plain and JSON lines go to stdout. A capturing logger keeps entries in
/// memory instead of printing them.
#[derive(Debug)]
pub struct Logger {
    config: LoggingConfig,
    captured: Option<RefCell<Vec<LogEntry>>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LoggingConfig::default())
    }
}

impl Logger {
    pub fn new(config: LoggingConfig) -> Self {
        Self {
            config,
            captured: None,
        }
    }

    pub fn capturing(config: LoggingConfig) -> Self {
        Self {
            config,
            captured: Some(RefCell::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    pub fn log(&self, entry: LogEntry) {
        if !self.config.level.should_log(entry.level) {
            return;
        }
        if let Some(captured) = &self.captured {
            captured.borrow_mut().push(entry);
            return;
        }
        let line = match self.config.format {
            LogFormat::Plain => render_plain(&entry, self.config.colors),
            LogFormat::Json => render_json(&entry),
        };
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogEntry::new(LogLevel::Info, Style::Header, message.to_string()));
    }

    pub fn detail(&self, message: impl fmt::Display) {
        self.log(LogEntry::new(LogLevel::Info, Style::Detail, message.to_string()));
    }

    pub fn done(&self, message: impl fmt::Display) {
        self.log(LogEntry::new(LogLevel::Info, Style::Done, message.to_string()));
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogEntry::new(LogLevel::Warn, Style::Alert, message.to_string()));
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogEntry::new(LogLevel::Error, Style::Alert, message.to_string()));
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogEntry::new(LogLevel::Debug, Style::Detail, message.to_string()));
    }

    /// Captured entries. Empty for a printing logger.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.captured
            .as_ref()
            .map(|c| c.borrow().clone())
            .unwrap_or_default()
    }

    /// Captured messages at the given level.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_ordering() {
        assert!(LogLevel::Info.should_log(LogLevel::Info));
        assert!(LogLevel::Info.should_log(LogLevel::Warn));
        assert!(LogLevel::Info.should_log(LogLevel::Error));
        assert!(!LogLevel::Info.should_log(LogLevel::Debug));
        assert!(!LogLevel::Error.should_log(LogLevel::Warn));
    }

    #[test]
    fn parse_level_and_format() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Plain);
        assert!(config.colors);
    }

    #[test]
    fn plain_rendering() {
        let warn = LogEntry::new(LogLevel::Warn, Style::Alert, "failed to export KEY");
        insta::assert_snapshot!(render_plain(&warn, false), @"WARN: failed to export KEY");

        let err = LogEntry::new(LogLevel::Error, Style::Alert, "upload failed");
        insta::assert_snapshot!(render_plain(&err, false), @"ERROR: upload failed");

        let done = LogEntry::new(LogLevel::Info, Style::Done, "Public URL: https://x/pub")
            .with_component("upload");
        insta::assert_snapshot!(render_plain(&done, false), @"[upload] Public URL: https://x/pub");
    }

    #[test]
    fn detail_is_indented() {
        let detail = LogEntry::new(LogLevel::Info, Style::Detail, "- Notify: 2");
        assert_eq!(render_plain(&detail, false), "  - Notify: 2");
    }

    #[test]
    fn colours_wrap_the_line() {
        let done = LogEntry::new(LogLevel::Info, Style::Done, "ok");
        let line = render_plain(&done, true);
        assert!(line.starts_with(GREEN));
        assert!(line.ends_with(RESET));
    }

    #[test]
    fn json_rendering() {
        let entry = LogEntry::new(LogLevel::Info, Style::Header, "Configs:");
        let v: serde_json::Value = serde_json::from_str(&render_json(&entry)).unwrap();
        assert_eq!(v["level"], "info");
        assert_eq!(v["style"], "header");
        assert_eq!(v["message"], "Configs:");
        assert!(v.get("component").is_none());
    }

    #[test]
    fn capturing_logger_filters_by_level() {
        let log = Logger::capturing(LoggingConfig::new().with_level(LogLevel::Warn));
        log.info("hidden");
        log.debug("hidden");
        log.warn("shown");
        log.error("shown too");
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.messages_at(LogLevel::Warn), vec!["shown".to_string()]);
    }

    #[test]
    fn printing_logger_captures_nothing() {
        let log = Logger::new(LoggingConfig::default());
        assert!(log.entries().is_empty());
    }
}
