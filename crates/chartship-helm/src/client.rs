//! The helm client all operations hang off

use std::sync::Arc;

use chartship_core::{ExecOutput, Executor, HostMatch, Invocation};

use crate::error::{HelmError, Result};

/// Entry point for chart operations
///
/// Holds the executor bound to one staged chart workspace. Every operation
/// runs its commands strictly in sequence through that executor.
#[derive(Clone)]
pub struct Helm {
    executor: Arc<dyn Executor>,
    host_match: HostMatch,
}

impl Helm {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            host_match: HostMatch::default(),
        }
    }

    /// How dependency registries are matched against ones already logged into
    pub fn with_host_match(mut self, host_match: HostMatch) -> Self {
        self.host_match = host_match;
        self
    }

    pub fn host_match(&self) -> HostMatch {
        self.host_match
    }

    pub fn executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    /// Run an invocation, leaving the exit code to the caller
    pub(crate) async fn exec(&self, invocation: &Invocation) -> Result<ExecOutput> {
        Ok(self.executor.run(invocation).await?)
    }

    /// Run an invocation and return its stdout, failing on a non-zero exit
    pub(crate) async fn exec_checked(&self, invocation: &Invocation) -> Result<String> {
        let output = self.exec(invocation).await?;
        if !output.success() {
            return Err(tool_failed(invocation, &output));
        }
        Ok(output.stdout)
    }
}

pub(crate) fn tool_failed(invocation: &Invocation, output: &ExecOutput) -> HelmError {
    HelmError::ToolFailed {
        step: invocation.step.clone(),
        command: invocation.command.display_line(),
        exit_code: output.exit_code,
        stderr: output.stderr.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartship_core::{HelmCommand, ScriptedExecutor};

    #[tokio::test]
    async fn test_exec_checked_maps_failure() {
        let executor = ScriptedExecutor::new(|_| ExecOutput::failed(2, "Error: boom\n"));
        let helm = Helm::new(Arc::new(executor));

        let err = helm
            .exec_checked(&Invocation::new("update dependencies", HelmCommand::DependencyUpdate))
            .await
            .unwrap_err();

        match err {
            HelmError::ToolFailed {
                step,
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(step, "update dependencies");
                assert_eq!(command, "helm dependency update .");
                assert_eq!(exit_code, 2);
                assert_eq!(stderr, "Error: boom\n");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_failed_message_trims_stderr() {
        let inv = Invocation::new("package chart", HelmCommand::DependencyList);
        let err = tool_failed(&inv, &ExecOutput::failed(1, "  Error: bad chart\n"));
        assert_eq!(
            err.to_string(),
            "package chart failed: `helm dependency list` exited with status 1: Error: bad chart"
        );
    }
}
