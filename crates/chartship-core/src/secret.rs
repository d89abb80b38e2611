//! Secret values and the handles they are resolved from
//!
//! A [`Secret`] never prints its value. It is only ever handed to a child
//! process through its environment or stdin, never through argv.

use std::fmt;
use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// An opaque secret value (registry password, token)
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the plain value. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Where a secret is read from
///
/// Accepted forms: `env:NAME`, `file:PATH` and `prompt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    Env(String),
    File(PathBuf),
    Prompt,
}

impl SecretSource {
    /// Parse a secret handle
    pub fn parse(handle: &str) -> Result<Self> {
        if handle == "prompt" {
            return Ok(SecretSource::Prompt);
        }

        match handle.split_once(':') {
            Some(("env", name)) if !name.is_empty() => Ok(SecretSource::Env(name.to_string())),
            Some(("file", path)) if !path.is_empty() => Ok(SecretSource::File(PathBuf::from(path))),
            _ => Err(CoreError::Secret {
                message: format!(
                    "unsupported secret handle '{}' (expected env:NAME, file:PATH or prompt)",
                    redact_handle(handle)
                ),
            }),
        }
    }

    /// Read the secret value
    pub fn resolve(&self) -> Result<Secret> {
        match self {
            SecretSource::Env(name) => std::env::var(name).map(Secret).map_err(|_| {
                CoreError::Secret {
                    message: format!("environment variable {} is not set", name),
                }
            }),
            SecretSource::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| CoreError::Secret {
                    message: format!("cannot read {}: {}", path.display(), e),
                })?;
                let value = content
                    .strip_suffix('\n')
                    .map(|v| v.strip_suffix('\r').unwrap_or(v))
                    .unwrap_or(content.as_str());
                Ok(Secret(value.to_string()))
            }
            SecretSource::Prompt => rpassword::prompt_password("Registry password: ")
                .map(Secret)
                .map_err(|e| CoreError::Secret {
                    message: format!("cannot read password from terminal: {}", e),
                }),
        }
    }
}

// A mistyped handle may be the literal password.
fn redact_handle(handle: &str) -> String {
    match handle.split_once(':') {
        Some((scheme, _)) => format!("{}:...", scheme),
        None => "***".to_string(),
    }
}
