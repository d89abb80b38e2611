//! Concurrent check suite
//!
//! Runs independent checks side by side. The first failure ends the suite
//! and drops every check still in flight. Checks must not share state; the
//! CLI gives each one its own staged workspace.

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use std::future::Future;

use crate::error::{HelmError, Result};

/// Output of one successful check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub output: String,
}

/// A set of named checks run concurrently
#[derive(Default)]
pub struct Suite {
    checks: Vec<(String, BoxFuture<'static, Result<String>>)>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check
    pub fn check<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Future<Output = Result<String>> + Send + 'static,
    {
        self.checks.push((name.into(), Box::pin(check)));
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check; reports come back in the order checks were added
    pub async fn run(self) -> Result<Vec<CheckReport>> {
        let names: Vec<String> = self.checks.iter().map(|(name, _)| name.clone()).collect();
        let mut outputs: Vec<Option<String>> = vec![None; names.len()];

        let mut pending: FuturesUnordered<_> = self
            .checks
            .into_iter()
            .enumerate()
            .map(|(index, (_, check))| async move { (index, check.await) })
            .collect();

        while let Some((index, result)) = pending.next().await {
            match result {
                Ok(output) => {
                    tracing::debug!(check = %names[index], "check passed");
                    outputs[index] = Some(output);
                }
                Err(source) => {
                    tracing::warn!(check = %names[index], "check failed, cancelling the rest");
                    return Err(HelmError::CheckFailed {
                        name: names[index].clone(),
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(names
            .into_iter()
            .zip(outputs)
            .map(|(name, output)| CheckReport {
                name,
                output: output.unwrap_or_default(),
            })
            .collect())
    }
}
