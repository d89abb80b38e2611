//! Error types for helm operations

use chartship_core::CoreError;
use thiserror::Error;

/// Helm operation errors
#[derive(Debug, Error)]
pub enum HelmError {
    // ============ External Tool Errors ============
    #[error("{step} failed: `{command}` exited with status {exit_code}: {}", .stderr.trim())]
    ToolFailed {
        step: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("{step} failed: could not interpret output {output:?}")]
    UnparsableOutput { step: String, output: String },

    // ============ Registry Errors ============
    #[error("Server returned error code {status} checking for chart existence at {url}")]
    Probe { status: String, url: String },

    #[error("Login to {registry} failed: {message}")]
    Auth { registry: String, message: String },

    // ============ Suite Errors ============
    #[error("Check '{name}' failed: {source}")]
    CheckFailed {
        name: String,
        #[source]
        source: Box<HelmError>,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl HelmError {
    /// The innermost error, looking through suite wrappers
    pub fn root(&self) -> &HelmError {
        match self {
            HelmError::CheckFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for helm operations
pub type Result<T> = std::result::Result<T, HelmError>;
