//! Run tools inside ephemeral containers
//!
//! Every invocation gets a fresh `<runtime> run --rm` container with the
//! staged chart mounted at `/helm` and the private helm home at `/helm-home`.
//! Invocation environment is forwarded by name (`-e NAME`) so values,
//! secrets included, never appear on the runtime's command line.
//!
//! Files the container creates belong to the image's user, so the mounts are
//! emptied from inside a container before the workspace is removed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::{ExecOutput, Executor, spawn_and_collect};
use crate::command::Invocation;
use crate::config::ContainerSettings;
use crate::error::{CoreError, Result};
use crate::workspace::helm_home_env;

const CHART_MOUNT: &str = "/helm";
const HELM_HOME_MOUNT: &str = "/helm-home";

/// Executor running each command in a throwaway container
#[derive(Debug, Clone)]
pub struct ContainerExecutor {
    runtime: String,
    image: String,
    chart_dir: PathBuf,
    helm_home: PathBuf,
}

impl ContainerExecutor {
    pub fn new(settings: &ContainerSettings, chart_dir: &Path, helm_home: &Path) -> Self {
        Self {
            runtime: settings.runtime.clone(),
            image: settings.image.clone(),
            chart_dir: chart_dir.to_path_buf(),
            helm_home: helm_home.to_path_buf(),
        }
    }

    fn base_args(&self) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "--entrypoint=".to_string(),
            "-v".to_string(),
            format!("{}:{}", self.chart_dir.display(), CHART_MOUNT),
            "-v".to_string(),
            format!("{}:{}", self.helm_home.display(), HELM_HOME_MOUNT),
            "-w".to_string(),
            CHART_MOUNT.to_string(),
        ]
    }

    /// Arguments passed to the container runtime for `invocation`
    pub fn runtime_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = self.base_args();
        if invocation.stdin.is_some() {
            args.push("-i".to_string());
        }

        for (name, value) in helm_home_env(HELM_HOME_MOUNT) {
            args.push("-e".to_string());
            args.push(format!("{}={}", name, value));
        }
        for var in &invocation.env {
            args.push("-e".to_string());
            args.push(var.name.clone());
        }

        args.push(self.image.clone());
        args.push(invocation.tool().binary().to_string());
        args.extend(invocation.command.args());
        args
    }

    /// Arguments emptying both mounts, login state included
    pub fn cleanup_args(&self) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(
            [
                self.image.as_str(),
                "find",
                CHART_MOUNT,
                HELM_HOME_MOUNT,
                "-mindepth",
                "1",
                "-delete",
            ]
            .map(String::from),
        );
        args
    }
}

#[async_trait]
impl Executor for ContainerExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<ExecOutput> {
        let args = self.runtime_args(invocation);

        tracing::debug!(
            step = %invocation.step,
            runtime = %self.runtime,
            image = %self.image,
            command = %invocation.command.display_line(),
            env = ?invocation.env_names(),
            "running container command"
        );

        let mut cmd = Command::new(&self.runtime);
        cmd.args(&args);
        for var in &invocation.env {
            cmd.env(&var.name, var.value.expose());
        }

        let output = spawn_and_collect(cmd, &self.runtime, invocation.stdin.as_ref()).await?;
        tracing::debug!(step = %invocation.step, exit_code = output.exit_code, "container finished");
        Ok(output)
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.runtime, self.image)
    }

    async fn cleanup(&self) -> Result<()> {
        let mut cmd = Command::new(&self.runtime);
        cmd.args(self.cleanup_args());

        let output = spawn_and_collect(cmd, &self.runtime, None).await?;
        if !output.success() {
            return Err(CoreError::Cleanup {
                path: self.helm_home.display().to_string(),
                message: output.stderr.trim().to_string(),
            });
        }
        tracing::debug!(runtime = %self.runtime, "emptied container mounts");
        Ok(())
    }
}
