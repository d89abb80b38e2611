//! Process execution
//!
//! An [`Executor`] runs one [`Invocation`] to completion and reports its exit
//! code and captured output. A non-zero exit is a normal result here; only
//! failing to start or wait for the process is an error. Deciding what an
//! exit code means is left to the caller.
//!
//! Implementations:
//! - [`LocalExecutor`]: runs the tools on this machine
//! - [`ContainerExecutor`]: one ephemeral container per invocation
//! - [`ScriptedExecutor`]: in-memory double for tests

mod container;
mod local;
mod scripted;

pub use container::ContainerExecutor;
pub use local::LocalExecutor;
pub use scripted::ScriptedExecutor;

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::command::{Invocation, Stdin};
use crate::config::{ExecutorKind, Settings};
use crate::error::{CoreError, Result};
use crate::workspace::Workspace;

/// Result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, `-1` when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// A successful run printing `stdout`
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs tool invocations
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run an invocation to completion
    async fn run(&self, invocation: &Invocation) -> Result<ExecOutput>;

    /// Short description for logs (`local`, `docker:<image>`)
    fn describe(&self) -> String;

    /// Release whatever the tools left behind that the host cannot delete itself
    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}

/// Create the executor configured in `settings` for a staged workspace
pub fn executor_for(settings: &Settings, workspace: &Workspace) -> Result<Box<dyn Executor>> {
    match settings.executor {
        ExecutorKind::Local => {
            let executor = LocalExecutor::new(workspace.chart_dir(), settings.tools.clone());
            let executor = if settings.isolate_helm_cache {
                executor.with_helm_home(workspace.helm_home())
            } else {
                executor.with_helm_config(workspace.helm_home())
            };
            Ok(Box::new(executor))
        }
        ExecutorKind::Container => {
            workspace.make_shared()?;
            // Each container is discarded after one command, so helm state
            // has to live in the mounted helm home regardless of settings.
            let executor = ContainerExecutor::new(
                &settings.container,
                workspace.chart_dir(),
                workspace.helm_home(),
            );
            Ok(Box::new(executor))
        }
    }
}

/// Spawn `cmd`, feed `stdin` and collect its output
pub(crate) async fn spawn_and_collect(
    mut cmd: Command,
    program: &str,
    stdin: Option<&Stdin>,
) -> Result<ExecOutput> {
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| CoreError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let stdin_handle = child.stdin.take();
    let write = async move {
        if let (Some(mut handle), Some(input)) = (stdin_handle, stdin) {
            match handle.write_all(input.as_bytes()).await {
                // The child may exit without reading everything
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
        }
        Ok::<(), std::io::Error>(())
    };

    let (written, output) = tokio::join!(write, child.wait_with_output());
    written?;
    let output = output?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_output_constructors() {
        let ok = ExecOutput::ok("0.1.1\n");
        assert!(ok.success());
        assert_eq!(ok.stdout, "0.1.1\n");

        let failed = ExecOutput::failed(1, "Error: not found");
        assert!(!failed.success());
        assert_eq!(failed.exit_code, 1);
    }

    #[test]
    fn test_executor_for_local() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("Chart.yaml"), "name: x\n").unwrap();
        let workspace = Workspace::stage(dir.path()).unwrap();

        let executor = executor_for(&Settings::default(), &workspace).unwrap();
        assert_eq!(executor.describe(), "local");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_login_state_stays_in_workspace_with_shared_cache() {
        use crate::command::HelmCommand;

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("Chart.yaml"), "name: x\n").unwrap();
        let workspace = Workspace::stage(dir.path()).unwrap();

        let mut settings = Settings {
            isolate_helm_cache: false,
            ..Settings::default()
        };
        settings.tools.helm = "printenv".to_string();
        let executor = executor_for(&settings, &workspace).unwrap();

        let output = executor
            .run(&Invocation::new(
                "env",
                HelmCommand::Unittest {
                    args: vec![
                        "HELM_REGISTRY_CONFIG".to_string(),
                        "HELM_REPOSITORY_CONFIG".to_string(),
                    ],
                },
            ))
            .await
            .unwrap();

        let config = workspace.helm_home().join("config");
        let lines: Vec<&str> = output.stdout.lines().collect();
        assert_eq!(
            lines,
            [
                format!("{}/registry/config.json", config.display()),
                format!("{}/repositories.yaml", config.display()),
            ]
        );
    }

    #[test]
    fn test_executor_for_container() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("Chart.yaml"), "name: x\n").unwrap();
        let workspace = Workspace::stage(dir.path()).unwrap();

        let settings = Settings {
            executor: ExecutorKind::Container,
            ..Settings::default()
        };
        let executor = executor_for(&settings, &workspace).unwrap();
        assert_eq!(
            executor.describe(),
            "docker:quay.io/puzzle/dagger-module-helm:latest"
        );
    }
}
