//! Chart dependencies and the registries they live on

use chartship_core::{Credentials, HelmCommand, HostMatch, Invocation, Protocol, registry_host};

use crate::client::Helm;
use crate::error::Result;

/// yq expression listing every distinct dependency repository, one per line
pub const DEPENDENCY_REPOSITORIES_QUERY: &str =
    "[.dependencies[].repository] | unique | sort | .[]";

/// A registry or repository that needs a login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTarget {
    pub url: String,
    pub protocol: Protocol,
}

impl LoginTarget {
    pub fn new(url: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            url: url.into(),
            protocol,
        }
    }

    /// Identity used to decide whether two targets share a login
    ///
    /// OCI logins are per host; legacy logins are per repository URL.
    pub fn key(&self) -> String {
        match self.protocol {
            Protocol::Oci => normalize_registry(&registry_host(&self.url)),
            Protocol::Https => normalize_registry(&self.url),
        }
    }
}

/// Trim, lowercase, drop the `scheme://` prefix and trailing slashes
pub fn normalize_registry(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let without_scheme = match lowered.split_once("://") {
        Some((_, rest)) => rest,
        None => lowered.as_str(),
    };
    without_scheme.trim_end_matches('/').to_string()
}

/// Whether a login to `a` also covers `b`
pub fn same_login(a: &LoginTarget, b: &LoginTarget, host_match: HostMatch) -> bool {
    match host_match {
        HostMatch::Exact => a.protocol == b.protocol && a.key() == b.key(),
        HostMatch::Containment => {
            let a = normalize_registry(&a.url);
            let b = normalize_registry(&b.url);
            a.contains(&b) || b.contains(&a)
        }
    }
}

fn is_remote_repository(repository: &str) -> bool {
    let repository = repository.trim();
    !(repository.is_empty()
        || repository == "null"
        || repository.starts_with("file://")
        || repository.starts_with('@')
        || repository.starts_with("alias:"))
}

impl Helm {
    /// Distinct remote repositories declared under `dependencies`
    ///
    /// Local (`file://`) and alias (`@name`, `alias:name`) references need
    /// no login and are left out.
    pub async fn dependency_repositories(&self) -> Result<Vec<String>> {
        let output = self
            .eval_chart_yaml(DEPENDENCY_REPOSITORIES_QUERY, "list dependency repositories")
            .await?;

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| is_remote_repository(line))
            .map(String::from)
            .collect())
    }

    /// Whether `helm dependency list` reports sub-charts that are not vendored yet
    pub async fn has_missing_dependencies(&self) -> Result<bool> {
        let output = self
            .exec_checked(&Invocation::new(
                "list dependencies",
                HelmCommand::DependencyList,
            ))
            .await?;
        Ok(output.contains("missing"))
    }

    /// `helm dependency update .`
    pub async fn update_dependencies(&self) -> Result<()> {
        self.exec_checked(&Invocation::new(
            "update dependencies",
            HelmCommand::DependencyUpdate,
        ))
        .await?;
        Ok(())
    }

    /// Log into every distinct dependency registry with `credentials`
    ///
    /// Repositories without a scheme use `fallback`. Registries covered by
    /// `already_logged_into` or by an earlier dependency are skipped. The
    /// first failing login aborts. Returns the targets actually logged into.
    pub async fn login_dependency_registries(
        &self,
        credentials: &Credentials,
        fallback: Protocol,
        already_logged_into: Option<&LoginTarget>,
    ) -> Result<Vec<LoginTarget>> {
        let mut done: Vec<LoginTarget> = already_logged_into.into_iter().cloned().collect();
        let mut logged_in = Vec::new();

        for repository in self.dependency_repositories().await? {
            let protocol = Protocol::detect(&repository).unwrap_or(fallback);
            let candidate = LoginTarget::new(repository, protocol);

            if done
                .iter()
                .any(|seen| same_login(seen, &candidate, self.host_match()))
            {
                tracing::debug!(registry = %candidate.url, "already logged in, skipping");
                continue;
            }

            self.registry_login(&candidate.url, candidate.protocol, credentials)
                .await?;
            done.push(candidate.clone());
            logged_in.push(candidate);
        }

        Ok(logged_in)
    }

    /// Login to dependency registries and vendor missing sub-charts
    ///
    /// No-op when nothing is missing. Returns whether an update ran.
    pub(crate) async fn resolve_dependencies(
        &self,
        credentials: Option<&Credentials>,
        fallback: Protocol,
        already_logged_into: Option<&LoginTarget>,
    ) -> Result<bool> {
        if !self.has_missing_dependencies().await? {
            return Ok(false);
        }

        if let Some(credentials) = credentials {
            let logged_in = self
                .login_dependency_registries(credentials, fallback, already_logged_into)
                .await?;
            tracing::info!(registries = logged_in.len(), "logged into dependency registries");
        }

        self.update_dependencies().await?;
        Ok(true)
    }
}
