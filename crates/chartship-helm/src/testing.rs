//! Fake helm/yq/curl world for unit tests

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chartship_core::{
    CurlCommand, ExecOutput, HelmCommand, Invocation, ScriptedExecutor, ToolCommand,
    registry_host,
};

use crate::client::Helm;
use crate::deps::DEPENDENCY_REPOSITORIES_QUERY;

/// Chart.yaml contents the fake `helm show chart .` reports
#[derive(Debug, Clone)]
pub(crate) struct FakeChart {
    pub name: String,
    pub version: String,
    pub app_version: Option<String>,
    pub dependency_repositories: Vec<String>,
}

impl FakeChart {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            app_version: Some("1.16.0".to_string()),
            dependency_repositories: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, repositories: &[&str]) -> Self {
        self.dependency_repositories = repositories.iter().map(|r| r.to_string()).collect();
        self
    }

    fn yaml(&self) -> String {
        let mut yaml = format!(
            "apiVersion: v2\nname: {}\nversion: {}\n",
            self.name, self.version
        );
        if let Some(app_version) = &self.app_version {
            yaml.push_str(&format!("appVersion: \"{}\"\n", app_version));
        }
        yaml
    }
}

#[derive(Default)]
struct State {
    /// (name, version) pairs present on the registry
    published: HashSet<(String, String)>,
    /// Version passed to the last `helm package`
    packaged: Option<String>,
    dependencies_missing: bool,
}

/// Scripted registry plus chart, shared between tests
pub(crate) struct FakeWorld {
    chart: FakeChart,
    state: Mutex<State>,
    failing_login_hosts: HashSet<String>,
    probe_status: Option<String>,
}

impl FakeWorld {
    pub fn new(chart: FakeChart) -> Self {
        let missing = !chart.dependency_repositories.is_empty();
        Self {
            chart,
            state: Mutex::new(State {
                dependencies_missing: missing,
                ..State::default()
            }),
            failing_login_hosts: HashSet::new(),
            probe_status: None,
        }
    }

    pub fn with_published(self, name: &str, version: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .published
            .insert((name.to_string(), version.to_string()));
        self
    }

    pub fn with_failing_login(mut self, host: &str) -> Self {
        self.failing_login_hosts.insert(host.to_string());
        self
    }

    /// Force the legacy probe to report this HTTP status
    pub fn with_probe_status(mut self, status: &str) -> Self {
        self.probe_status = Some(status.to_string());
        self
    }

    pub fn is_published(&self, name: &str, version: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .published
            .contains(&(name.to_string(), version.to_string()))
    }

    /// Build a helm client backed by this world
    pub fn into_helm(self) -> (Helm, ScriptedExecutor, Arc<FakeWorld>) {
        let world = Arc::new(self);
        let responder_world = Arc::clone(&world);
        let executor = ScriptedExecutor::new(move |inv| responder_world.respond(inv));
        let helm = Helm::new(Arc::new(executor.clone()));
        (helm, executor, world)
    }

    fn respond(&self, inv: &Invocation) -> ExecOutput {
        let mut state = self.state.lock().unwrap();
        match &inv.command {
            ToolCommand::Helm(HelmCommand::ShowChart { chart, .. }) if chart == "." => {
                ExecOutput::ok(self.chart.yaml())
            }
            ToolCommand::Helm(HelmCommand::ShowChart { chart, version }) => {
                let name = chart.rsplit('/').next().unwrap_or_default().to_string();
                let version = version.clone().unwrap_or_default();
                if state.published.contains(&(name, version)) {
                    ExecOutput::ok(self.chart.yaml())
                } else {
                    ExecOutput::failed(1, "Error: not found")
                }
            }
            ToolCommand::Yq { expression } => match expression.as_str() {
                ".name" => ExecOutput::ok(format!("{}\n", self.chart.name)),
                ".version" => ExecOutput::ok(format!("{}\n", self.chart.version)),
                ".appVersion" => ExecOutput::ok(format!(
                    "{}\n",
                    self.chart.app_version.as_deref().unwrap_or("null")
                )),
                DEPENDENCY_REPOSITORIES_QUERY => {
                    let mut lines = self.chart.dependency_repositories.join("\n");
                    lines.push('\n');
                    ExecOutput::ok(lines)
                }
                other => ExecOutput::failed(1, format!("Error: unknown expression {}", other)),
            },
            ToolCommand::Helm(HelmCommand::RegistryLogin { host, .. }) => {
                if self.failing_login_hosts.contains(host) {
                    ExecOutput::failed(1, "Error: unauthorized: authentication required")
                } else {
                    ExecOutput::ok("Login Succeeded\n")
                }
            }
            ToolCommand::Helm(HelmCommand::RepoAdd { name, url, .. }) => {
                if self.failing_login_hosts.contains(&registry_host(url)) {
                    ExecOutput::failed(1, "Error: 401 Unauthorized")
                } else {
                    ExecOutput::ok(format!("\"{}\" has been added to your repositories\n", name))
                }
            }
            ToolCommand::Helm(HelmCommand::RepoUpdate { .. }) => {
                ExecOutput::ok("Update Complete.\n")
            }
            ToolCommand::Helm(HelmCommand::DependencyList) => {
                if state.dependencies_missing {
                    ExecOutput::ok(
                        "NAME\tVERSION\tREPOSITORY\tSTATUS\ndependency-track\t1.8.1\thttps://puzzle.github.io/dependencytrack-helm/\tmissing\n",
                    )
                } else {
                    ExecOutput::ok("WARNING: no dependencies at charts/\n")
                }
            }
            ToolCommand::Helm(HelmCommand::DependencyUpdate) => {
                state.dependencies_missing = false;
                ExecOutput::ok("Saving 1 charts\n")
            }
            ToolCommand::Helm(HelmCommand::Package { version, .. }) => {
                let version = version.clone().unwrap_or_else(|| self.chart.version.clone());
                state.packaged = Some(version.clone());
                ExecOutput::ok(format!(
                    "Successfully packaged chart and saved it to: /helm/{}-{}.tgz\n",
                    self.chart.name, version
                ))
            }
            ToolCommand::Helm(HelmCommand::Push { .. })
            | ToolCommand::Curl(CurlCommand::Upload { .. }) => match state.packaged.clone() {
                Some(version) => {
                    state.published.insert((self.chart.name.clone(), version));
                    ExecOutput::ok("Pushed\n")
                }
                None => ExecOutput::failed(1, "Error: no such file"),
            },
            ToolCommand::Curl(CurlCommand::Probe { url }) => {
                if let Some(status) = &self.probe_status {
                    return ExecOutput::ok(status.clone());
                }
                let file = url.rsplit('/').next().unwrap_or_default();
                let exists = state
                    .published
                    .iter()
                    .any(|(name, version)| file == format!("{}-{}.tgz", name, version));
                ExecOutput::ok(if exists { "200" } else { "404" })
            }
            ToolCommand::Helm(HelmCommand::Lint { .. }) => {
                ExecOutput::ok("==> Linting .\n\n1 chart(s) linted, 0 chart(s) failed\n")
            }
            ToolCommand::Helm(HelmCommand::Unittest { .. }) => {
                ExecOutput::ok("PASS  test configmap\ttests/configmap_test.yaml\n")
            }
        }
    }
}

pub(crate) fn is_package(cmd: &ToolCommand) -> bool {
    matches!(cmd, ToolCommand::Helm(HelmCommand::Package { .. }))
}

pub(crate) fn is_upload(cmd: &ToolCommand) -> bool {
    matches!(
        cmd,
        ToolCommand::Helm(HelmCommand::Push { .. }) | ToolCommand::Curl(CurlCommand::Upload { .. })
    )
}

pub(crate) fn is_login(cmd: &ToolCommand) -> bool {
    matches!(
        cmd,
        ToolCommand::Helm(HelmCommand::RegistryLogin { .. })
            | ToolCommand::Helm(HelmCommand::RepoAdd { .. })
    )
}
