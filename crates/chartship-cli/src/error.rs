//! CLI error types with exit code handling
//!
//! Library errors are mapped onto a small set of user-facing categories,
//! each with its own exit code and, where it helps, a hint.

use chartship_core::CoreError;
use chartship_helm::HelmError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Invalid arguments, target or secret handle
    #[error("{message}")]
    #[diagnostic(code(chartship::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Invalid settings
    #[error("Configuration error: {message}")]
    #[diagnostic(code(chartship::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Missing chart or unreadable Chart.yaml field
    #[error("Chart error: {message}")]
    #[diagnostic(code(chartship::cli::chart))]
    Chart {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// An external tool failed or could not be started
    #[error("{message}")]
    #[diagnostic(code(chartship::cli::tool))]
    Tool {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Existence check got no definite answer
    #[error("{message}")]
    #[diagnostic(
        code(chartship::cli::probe),
        help("Only 200 and 404 are accepted; check the repository URL and credentials")
    )]
    Probe { message: String },

    /// Registry login failed
    #[error("{message}")]
    #[diagnostic(
        code(chartship::cli::auth),
        help("Check the username and password for this registry")
    )]
    Auth { message: String },

    /// One check of a suite failed
    #[error("Check '{name}' failed: {message}")]
    #[diagnostic(code(chartship::cli::check))]
    Check {
        name: String,
        message: String,
        #[help]
        help: Option<String>,
        exit_code: i32,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chartship::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chartship::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Chart { .. } => exit_codes::CHART_ERROR,
            CliError::Tool { .. } => exit_codes::TOOL_ERROR,
            CliError::Probe { .. } => exit_codes::PROBE_ERROR,
            CliError::Auth { .. } => exit_codes::AUTH_ERROR,
            CliError::Check { exit_code, .. } => *exit_code,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    fn help_text(&self) -> Option<String> {
        match self {
            CliError::Usage { help, .. }
            | CliError::Config { help, .. }
            | CliError::Chart { help, .. }
            | CliError::Tool { help, .. }
            | CliError::Check { help, .. } => help.clone(),
            _ => None,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ChartNotFound { .. } => CliError::Chart {
                message,
                help: Some(
                    "Point --directory at a chart directory containing Chart.yaml".to_string(),
                ),
            },
            CoreError::Spawn { program, .. } => CliError::Tool {
                message,
                help: Some(format!(
                    "Install {} or point chartship at it through the config file or CHARTSHIP_* variables; --executor container runs the tools from an image instead",
                    program
                )),
            },
            CoreError::Walk(_) => CliError::Chart {
                message,
                help: Some(
                    "Fix or remove unreadable files and broken symlinks in the chart".to_string(),
                ),
            },
            CoreError::Config { .. } | CoreError::YamlParse(_) => CliError::Config {
                message,
                help: Some("Run with --config to use another settings file".to_string()),
            },
            CoreError::Secret { .. } => CliError::Usage {
                message,
                help: Some("Pass the password as env:NAME, file:PATH or prompt".to_string()),
            },
            CoreError::InvalidTarget { .. } => CliError::Usage {
                message,
                help: Some("--registry takes a host such as ghcr.io, without scheme".to_string()),
            },
            CoreError::Cleanup { .. } | CoreError::Io(_) => CliError::Io { message },
        }
    }
}

impl From<HelmError> for CliError {
    fn from(err: HelmError) -> Self {
        match err {
            HelmError::ToolFailed { .. } => CliError::Tool {
                message: err.to_string(),
                help: Some("Re-run with --debug to log every command chartship runs".to_string()),
            },
            HelmError::UnparsableOutput { .. } => CliError::Chart {
                message: err.to_string(),
                help: Some("Check that Chart.yaml declares this field".to_string()),
            },
            HelmError::Probe { .. } => CliError::Probe {
                message: err.to_string(),
            },
            HelmError::Auth { .. } => CliError::Auth {
                message: err.to_string(),
            },
            HelmError::CheckFailed { name, source } => {
                let inner = CliError::from(*source);
                CliError::Check {
                    name,
                    message: inner.to_string(),
                    help: inner.help_text(),
                    exit_code: inner.exit_code(),
                }
            }
            HelmError::Core(core) => CliError::from(core),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
