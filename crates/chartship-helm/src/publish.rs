//! Idempotent package and push
//!
//! A chart version is packaged and uploaded at most once: when the target
//! already holds the exact name and version, nothing is built or sent.

use chartship_core::{
    ChartRef, Credentials, CurlCommand, HelmCommand, Invocation, Protocol, REGISTRY_PASSWORD_VAR,
    REGISTRY_USERNAME_VAR, RegistryTarget,
};
use serde::Serialize;

use crate::client::Helm;
use crate::deps::LoginTarget;
use crate::error::Result;

/// Everything one publish needs
#[derive(Debug, Clone)]
pub struct PushRequest {
    pub target: RegistryTarget,
    pub credentials: Credentials,
    /// Version to package instead of the one in Chart.yaml
    pub set_version: Option<String>,
    /// appVersion to package instead of the one in Chart.yaml
    pub set_app_version: Option<String>,
}

impl PushRequest {
    pub fn new(target: RegistryTarget, credentials: Credentials) -> Self {
        Self {
            target,
            credentials,
            set_version: None,
            set_app_version: None,
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.set_version = non_empty(version);
        self
    }

    pub fn with_app_version(mut self, app_version: Option<String>) -> Self {
        self.set_app_version = non_empty(app_version);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// How a publish ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "chart", rename_all = "camelCase")]
pub enum PushOutcome {
    /// A new artifact was uploaded
    Pushed(ChartRef),
    /// The exact version was already published; nothing was packaged
    AlreadyExists(ChartRef),
}

impl PushOutcome {
    pub fn pushed(&self) -> bool {
        matches!(self, PushOutcome::Pushed(_))
    }

    pub fn chart(&self) -> &ChartRef {
        match self {
            PushOutcome::Pushed(chart) | PushOutcome::AlreadyExists(chart) => chart,
        }
    }
}

impl Helm {
    /// Package the chart and push it unless that version is already published
    pub async fn package_push(&self, request: &PushRequest) -> Result<PushOutcome> {
        let target = &request.target;
        let credentials = &request.credentials;

        let name = self.name().await?;
        let version = match &request.set_version {
            Some(version) => version.clone(),
            None => self.version().await?,
        };
        let app_version = match &request.set_app_version {
            Some(app_version) => Some(app_version.clone()),
            None => self.declared_app_version().await?,
        };
        let chart = ChartRef {
            name,
            version,
            app_version,
        };
        tracing::info!(chart = %chart, target = %target.repo_url(), "publishing chart");

        // Legacy repositories authenticate on every request instead
        let logged_into = if target.protocol.is_oci() {
            self.registry_login(target.login_host(), Protocol::Oci, credentials)
                .await?;
            Some(LoginTarget::new(target.login_host(), Protocol::Oci))
        } else {
            None
        };

        if self.chart_exists(target, &chart, credentials).await? {
            tracing::info!(chart = %chart, "chart already published, skipping");
            return Ok(PushOutcome::AlreadyExists(chart));
        }

        self.resolve_dependencies(Some(credentials), target.protocol, logged_into.as_ref())
            .await?;

        self.exec_checked(&Invocation::new(
            "package chart",
            HelmCommand::Package {
                version: request.set_version.clone(),
                app_version: request.set_app_version.clone(),
            },
        ))
        .await?;

        let upload = match target.protocol {
            Protocol::Oci => Invocation::new(
                "push chart",
                HelmCommand::Push {
                    package: chart.package_file(),
                    remote: target.repo_url(),
                },
            ),
            Protocol::Https => Invocation::new(
                "upload chart",
                CurlCommand::Upload {
                    file: chart.package_file(),
                    url: target.upload_url(),
                },
            )
            .env(REGISTRY_USERNAME_VAR, credentials.username.clone())
            .secret_env(REGISTRY_PASSWORD_VAR, credentials.password.clone()),
        };
        self.exec_checked(&upload).await?;

        tracing::info!(chart = %chart, "chart pushed");
        Ok(PushOutcome::Pushed(chart))
    }
}
