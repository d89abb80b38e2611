//! CLI commands

pub mod check;
pub mod lint;
pub mod metadata;
pub mod package_push;

use std::path::Path;
use std::sync::Arc;

use chartship_core::{ExecutorKind, Settings, Workspace, executor_for};
use chartship_helm::Helm;

use crate::error::Result;

/// Settings resolved from the config file, environment and global flags
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
}

impl Context {
    pub fn load(
        config: Option<&Path>,
        executor: Option<&str>,
        image: Option<&str>,
    ) -> Result<Self> {
        let mut settings = Settings::load(config)?;
        if let Some(executor) = executor {
            settings.executor = executor.parse::<ExecutorKind>()?;
        }
        if let Some(image) = image {
            settings.container.image = image.to_string();
        }
        Ok(Self { settings })
    }

    /// Stage `directory` and bind a helm client to the copy
    pub fn open(&self, directory: &Path) -> Result<Session> {
        Ok(Session::open(&self.settings, directory)?)
    }
}

/// A helm client working on its own staged copy of a chart
pub struct Session {
    pub helm: Helm,
    // Dropped after `helm`, removing the copy once nothing runs in it
    workspace: Workspace,
}

impl Session {
    pub fn open(settings: &Settings, directory: &Path) -> chartship_core::Result<Self> {
        let workspace = Workspace::stage(directory)?;
        let executor = executor_for(settings, &workspace)?;
        tracing::debug!(
            executor = %executor.describe(),
            chart = %directory.display(),
            "opened session"
        );

        let helm = Helm::new(Arc::from(executor)).with_host_match(settings.dependency_host_match);
        Ok(Self { helm, workspace })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Clear what the tools wrote, then remove the staged copy
    ///
    /// Failures are only logged.
    pub async fn close(self) {
        let Self { helm, workspace } = self;
        if let Err(e) = helm.executor().cleanup().await {
            tracing::warn!(error = %e, "failed to clean up after the tools");
        }
        drop(helm);
        if let Err(e) = workspace.close() {
            tracing::warn!(
                error = %e,
                "failed to remove workspace, it may still hold helm login state"
            );
        }
    }
}
