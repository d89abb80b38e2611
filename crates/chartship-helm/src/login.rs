//! Registry authentication
//!
//! OCI registries go through `helm registry login`; legacy repositories are
//! registered with `helm repo add` so later dependency updates can reach
//! them. Either way the password only travels on stdin. Login state lands in
//! the workspace's helm home and is gone with it.

use chartship_core::{Credentials, HelmCommand, Invocation, Protocol, Stdin, registry_host};
use sha2::{Digest, Sha256};

use crate::client::Helm;
use crate::error::{HelmError, Result};

impl Helm {
    /// Log into the registry or repository at `url`
    pub async fn registry_login(
        &self,
        url: &str,
        protocol: Protocol,
        credentials: &Credentials,
    ) -> Result<()> {
        match protocol {
            Protocol::Oci => {
                let host = registry_host(url);
                let invocation = Invocation::new(
                    format!("log into {}", host),
                    HelmCommand::RegistryLogin {
                        host: host.clone(),
                        username: credentials.username.clone(),
                    },
                )
                .stdin(Stdin::Secret(credentials.password.clone()));

                let output = self.exec(&invocation).await?;
                if !output.success() {
                    return Err(HelmError::Auth {
                        registry: host,
                        message: output.stderr.trim().to_string(),
                    });
                }
            }
            Protocol::Https => {
                let alias = repo_alias(url);
                let add = Invocation::new(
                    format!("add repository {}", url),
                    HelmCommand::RepoAdd {
                        name: alias.clone(),
                        url: url.to_string(),
                        username: credentials.username.clone(),
                    },
                )
                .stdin(Stdin::Secret(credentials.password.clone()));

                let output = self.exec(&add).await?;
                if !output.success() {
                    return Err(HelmError::Auth {
                        registry: url.to_string(),
                        message: output.stderr.trim().to_string(),
                    });
                }

                let update = Invocation::new(
                    format!("update repository {}", url),
                    HelmCommand::RepoUpdate { name: alias },
                );
                // An index behind authentication only fails here
                let output = self.exec(&update).await?;
                if !output.success() {
                    return Err(HelmError::Auth {
                        registry: url.to_string(),
                        message: output.stderr.trim().to_string(),
                    });
                }
            }
        }

        tracing::info!(registry = %url, protocol = %protocol, user = %credentials.username, "logged in");
        Ok(())
    }
}

/// Stable local repository name for a legacy repository URL
pub fn repo_alias(url: &str) -> String {
    let digest = Sha256::digest(url.trim().as_bytes());
    let mut alias = hex::encode(digest);
    alias.truncate(8);
    alias
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChart, FakeWorld};
    use chartship_core::{ExecOutput, ScriptedExecutor, Secret, ToolCommand};
    use std::sync::Arc;

    fn creds() -> Credentials {
        Credentials::new("ci", Secret::new("hunter2"))
    }

    #[test]
    fn test_repo_alias_is_stable_and_short() {
        let a = repo_alias("https://puzzle.github.io/dependencytrack-helm/");
        let b = repo_alias(" https://puzzle.github.io/dependencytrack-helm/ ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, repo_alias("https://charts.bitnami.com/bitnami"));
    }

    #[tokio::test]
    async fn test_oci_login_sends_password_on_stdin() {
        let (helm, executor, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1")).into_helm();
        helm.registry_login("oci://ghcr.io/org/charts", Protocol::Oci, &creds())
            .await
            .unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].command.display_line(),
            "helm registry login ghcr.io --username ci --password-stdin"
        );
        assert_eq!(calls[0].stdin, Some(Stdin::Secret(Secret::new("hunter2"))));
        assert!(calls[0].env.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_login_adds_and_updates_repo() {
        let (helm, executor, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1")).into_helm();
        let url = "https://puzzle.github.io/dependencytrack-helm/";
        helm.registry_login(url, Protocol::Https, &creds())
            .await
            .unwrap();

        let alias = repo_alias(url);
        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(
            &calls[0].command,
            ToolCommand::Helm(HelmCommand::RepoAdd { name, url: u, .. }) if *name == alias && u == url
        ));
        assert!(matches!(
            &calls[1].command,
            ToolCommand::Helm(HelmCommand::RepoUpdate { name }) if *name == alias
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_index_is_auth_error() {
        let executor = ScriptedExecutor::new(|inv| match &inv.command {
            ToolCommand::Helm(HelmCommand::RepoUpdate { .. }) => ExecOutput::failed(
                1,
                "Error: failed to fetch https://charts.example.com/index.yaml : 401 Unauthorized",
            ),
            _ => ExecOutput::ok(""),
        });
        let helm = Helm::new(Arc::new(executor));

        let err = helm
            .registry_login("https://charts.example.com", Protocol::Https, &creds())
            .await
            .unwrap_err();
        assert!(
            matches!(err, HelmError::Auth { ref registry, ref message }
                if registry == "https://charts.example.com" && message.contains("401")),
            "{:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_failed_login_is_auth_error() {
        let (helm, _, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1"))
            .with_failing_login("ttl.sh")
            .into_helm();

        let err = helm
            .registry_login("ttl.sh", Protocol::Oci, &creds())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Login to ttl.sh failed: Error: unauthorized: authentication required"
        );
    }
}
