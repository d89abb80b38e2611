//! Registry existence prober

use chartship_core::{
    ChartRef, Credentials, CurlCommand, HelmCommand, Invocation, Protocol, REGISTRY_PASSWORD_VAR,
    REGISTRY_USERNAME_VAR, RegistryTarget,
};

use crate::client::Helm;
use crate::error::{HelmError, Result};

impl Helm {
    /// Whether `chart` (name and version) is already published at `target`
    ///
    /// OCI targets require a prior registry login. Legacy targets carry the
    /// credentials on the probe request itself.
    pub async fn chart_exists(
        &self,
        target: &RegistryTarget,
        chart: &ChartRef,
        credentials: &Credentials,
    ) -> Result<bool> {
        let exists = match target.protocol {
            Protocol::Oci => self.oci_chart_exists(target, chart).await?,
            Protocol::Https => self.legacy_chart_exists(target, chart, credentials).await?,
        };
        tracing::debug!(chart = %chart, protocol = %target.protocol, exists, "probed registry");
        Ok(exists)
    }

    async fn oci_chart_exists(&self, target: &RegistryTarget, chart: &ChartRef) -> Result<bool> {
        let invocation = Invocation::new(
            "check chart existence",
            HelmCommand::ShowChart {
                chart: target.chart_url(&chart.name),
                version: Some(chart.version.clone()),
            },
        );
        Ok(self.exec(&invocation).await?.success())
    }

    async fn legacy_chart_exists(
        &self,
        target: &RegistryTarget,
        chart: &ChartRef,
        credentials: &Credentials,
    ) -> Result<bool> {
        let url = target.package_url(chart);
        let invocation = Invocation::new(
            "check chart existence",
            CurlCommand::Probe { url: url.clone() },
        )
        .env(REGISTRY_USERNAME_VAR, credentials.username.clone())
        .secret_env(REGISTRY_PASSWORD_VAR, credentials.password.clone());

        let output = self.exec(&invocation).await?;
        if !output.success() {
            let status = match output.stdout.trim() {
                "" => format!("curl exit {}", output.exit_code),
                code => code.to_string(),
            };
            return Err(HelmError::Probe { status, url });
        }
        interpret_probe_status(output.stdout.trim(), &url)
    }
}

/// Map the HTTP status of a legacy probe to existence
///
/// Only `200` and `404` are answers; anything else is an error so that an
/// unreachable or unauthorized repository is never mistaken for an empty one.
pub fn interpret_probe_status(status: &str, url: &str) -> Result<bool> {
    match status {
        "200" => Ok(true),
        "404" => Ok(false),
        other => Err(HelmError::Probe {
            status: other.to_string(),
            url: url.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChart, FakeWorld};
    use chartship_core::{ExecOutput, ScriptedExecutor, Secret};
    use std::sync::Arc;

    fn creds() -> Credentials {
        Credentials::new("ci", Secret::new("hunter2"))
    }

    #[test]
    fn test_interpret_probe_status() {
        let url = "https://example.com/helm/mychart-0.1.1.tgz";
        assert!(interpret_probe_status("200", url).unwrap());
        assert!(!interpret_probe_status("404", url).unwrap());

        for status in ["500", "401", "403", "000"] {
            let err = interpret_probe_status(status, url).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "Server returned error code {} checking for chart existence at {}",
                    status, url
                )
            );
        }
    }

    #[tokio::test]
    async fn test_oci_probe_uses_exit_code() {
        let (helm, executor, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1"))
            .with_published("mychart", "0.1.1")
            .into_helm();
        let target = RegistryTarget::new("ttl.sh", "helm", false, None).unwrap();

        assert!(
            helm.chart_exists(&target, &ChartRef::new("mychart", "0.1.1"), &creds())
                .await
                .unwrap()
        );
        assert!(
            !helm
                .chart_exists(&target, &ChartRef::new("mychart", "0.2.0"), &creds())
                .await
                .unwrap()
        );
        assert_eq!(
            executor.command_lines()[0],
            "helm show chart oci://ttl.sh/helm/mychart --version 0.1.1"
        );
    }

    #[tokio::test]
    async fn test_legacy_probe_status_codes() {
        let target = RegistryTarget::new("registry.example.com", "helm", true, None).unwrap();
        let chart = ChartRef::new("mychart", "0.1.1");

        let (helm, _, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1"))
            .with_published("mychart", "0.1.1")
            .into_helm();
        assert!(helm.chart_exists(&target, &chart, &creds()).await.unwrap());

        let (helm, _, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1")).into_helm();
        assert!(!helm.chart_exists(&target, &chart, &creds()).await.unwrap());

        let (helm, _, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1"))
            .with_probe_status("503")
            .into_helm();
        let err = helm.chart_exists(&target, &chart, &creds()).await.unwrap_err();
        assert!(matches!(err, HelmError::Probe { ref status, .. } if status == "503"));
    }

    #[tokio::test]
    async fn test_legacy_probe_passes_credentials_by_env() {
        let (helm, executor, _) = FakeWorld::new(FakeChart::new("mychart", "0.1.1")).into_helm();
        let target = RegistryTarget::new("registry.example.com", "helm", false, Some("sub"))
            .unwrap();

        helm.chart_exists(&target, &ChartRef::new("mychart", "0.1.1"), &creds())
            .await
            .unwrap();

        let calls = executor.calls();
        assert_eq!(calls[0].env_names(), vec!["REGISTRY_USERNAME", "REGISTRY_PASSWORD"]);
        let line = executor.command_lines()[0].clone();
        assert!(line.contains("https://registry.example.com/helm/sub/mychart-0.1.1.tgz"));
        assert!(!line.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_legacy_transport_failure_is_probe_error() {
        let executor = ScriptedExecutor::new(|_| ExecOutput {
            exit_code: 6,
            stdout: "000".to_string(),
            stderr: "curl: (6) Could not resolve host".to_string(),
        });
        let helm = Helm::new(Arc::new(executor));
        let target = RegistryTarget::new("nowhere.invalid", "helm", true, None).unwrap();

        let err = helm
            .chart_exists(&target, &ChartRef::new("mychart", "0.1.1"), &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, HelmError::Probe { ref status, .. } if status == "000"));
    }
}
