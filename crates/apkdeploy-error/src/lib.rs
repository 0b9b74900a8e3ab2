//! Error handling for apkdeploy.
//!
//! Every failure a deploy run can hit falls into one [`ErrorCategory`]. The
//! category decides whether anything gets exported and which exit code the
//! binary returns; the message and context pairs are what ends up in the log.

use std::fmt;

/// Where in a deploy run an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing required input or a path that does not exist. Raised before
    /// any network activity.
    Configuration,
    /// Local I/O failure while encoding the multipart body.
    RequestConstruction,
    /// Network-level failure performing the POST.
    Transport,
    /// The service answered with a non-success status.
    Server,
    /// The service answered with a body that is not the expected JSON.
    ResponseParse,
    /// Writing an output key to the environment store failed.
    Export,
}

impl ErrorCategory {
    /// Process exit code for a run that ended with this category.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCategory::Configuration => 1,
            ErrorCategory::RequestConstruction
            | ErrorCategory::Transport
            | ErrorCategory::Server
            | ErrorCategory::ResponseParse => 2,
            ErrorCategory::Export => 0,
        }
    }

    /// Failures that happen while a target is being processed.
    pub fn is_target_failure(&self) -> bool {
        matches!(
            self,
            ErrorCategory::RequestConstruction
                | ErrorCategory::Transport
                | ErrorCategory::Server
                | ErrorCategory::ResponseParse
        )
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::RequestConstruction => write!(f, "request"),
            ErrorCategory::Transport => write!(f, "transport"),
            ErrorCategory::Server => write!(f, "server"),
            ErrorCategory::ResponseParse => write!(f, "response"),
            ErrorCategory::Export => write!(f, "export"),
        }
    }
}

/// A categorized deploy error with ordered context pairs.
#[derive(Debug)]
pub struct DeployError {
    message: String,
    category: ErrorCategory,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    context: Vec<(String, String)>,
}

impl DeployError {
    pub fn new(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            message: message.into(),
            category,
            source: None,
            context: Vec::new(),
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        category: ErrorCategory,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            category,
            source: Some(source.into()),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Look up a context value by key.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category == ErrorCategory::Configuration
    }

    pub fn is_server_error(&self) -> bool {
        self.category == ErrorCategory::Server
    }

    pub fn is_target_failure(&self) -> bool {
        self.category.is_target_failure()
    }
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)?;

        if !self.context.is_empty() {
            write!(f, " (")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            write!(f, ")")?;
        }

        if let Some(source) = &self.source {
            write!(f, "\nCaused by: {}", source)?;
        }

        Ok(())
    }
}

impl std::error::Error for DeployError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

pub fn configuration_error(message: impl Into<String>) -> DeployError {
    DeployError::new(message, ErrorCategory::Configuration)
}

pub fn request_error(message: impl Into<String>) -> DeployError {
    DeployError::new(message, ErrorCategory::RequestConstruction)
}

pub fn transport_error(message: impl Into<String>) -> DeployError {
    DeployError::new(message, ErrorCategory::Transport)
}

/// A non-success response. The status and body are kept as context so they
/// show up in the failure line.
pub fn server_error(status: u16, body: impl Into<String>) -> DeployError {
    DeployError::new(
        format!("upload request failed, status code: {status}"),
        ErrorCategory::Server,
    )
    .with_context("status", status.to_string())
    .with_context("body", body)
}

pub fn response_parse_error(message: impl Into<String>) -> DeployError {
    DeployError::new(message, ErrorCategory::ResponseParse)
}

pub fn export_error(message: impl Into<String>) -> DeployError {
    DeployError::new(message, ErrorCategory::Export)
}
