//! Run tools directly on this machine

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::{ExecOutput, Executor, spawn_and_collect};
use crate::command::Invocation;
use crate::config::ToolPaths;
use crate::error::Result;
use crate::workspace::{helm_config_env, helm_home_env};

/// Executor spawning the tools as local child processes
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    workdir: PathBuf,
    tools: ToolPaths,
    /// Extra variables every child gets (workspace helm state)
    base_env: Vec<(String, String)>,
}

impl LocalExecutor {
    pub fn new(workdir: impl Into<PathBuf>, tools: ToolPaths) -> Self {
        Self {
            workdir: workdir.into(),
            tools,
            base_env: Vec::new(),
        }
    }

    /// Point helm's config and cache at `home` instead of the user's
    pub fn with_helm_home(mut self, home: &Path) -> Self {
        self.base_env = helm_home_env(&home.to_string_lossy());
        self
    }

    /// Point only helm's config, logins included, at `home`; the cache stays shared
    pub fn with_helm_config(mut self, home: &Path) -> Self {
        self.base_env = helm_config_env(&home.to_string_lossy());
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

#[async_trait]
impl Executor for LocalExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<ExecOutput> {
        let program = self.tools.program(invocation.tool());
        let args = invocation.command.args();

        tracing::debug!(
            step = %invocation.step,
            program,
            args = ?args,
            env = ?invocation.env_names(),
            "running local command"
        );

        let mut cmd = Command::new(program);
        cmd.args(&args).current_dir(&self.workdir);
        for (name, value) in &self.base_env {
            cmd.env(name, value);
        }
        // Scoped to this child only
        for var in &invocation.env {
            cmd.env(&var.name, var.value.expose());
        }

        let output = spawn_and_collect(cmd, program, invocation.stdin.as_ref()).await?;
        tracing::debug!(step = %invocation.step, exit_code = output.exit_code, "command finished");
        Ok(output)
    }

    fn describe(&self) -> String {
        "local".to_string()
    }
}
