//! Registry targets, chart identity and credentials

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::{CoreError, Result};
use crate::secret::Secret;

/// Chart repository protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// OCI registry (`helm push`, `helm registry login`)
    #[default]
    Oci,
    /// Legacy HTTP(S) chart repository (index.yaml + raw uploads)
    Https,
}

impl Protocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Oci => "oci",
            Protocol::Https => "https",
        }
    }

    /// Detect the protocol from a repository URL scheme
    pub fn detect(url: &str) -> Option<Self> {
        let url = url.trim().to_ascii_lowercase();
        if url.starts_with("oci://") {
            Some(Protocol::Oci)
        } else if url.starts_with("https://") || url.starts_with("http://") {
            Some(Protocol::Https)
        } else {
            None
        }
    }

    pub fn is_oci(&self) -> bool {
        matches!(self, Protocol::Oci)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Where charts are published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTarget {
    /// Registry host, optionally with port (`registry.example.com:5000`)
    pub registry: String,
    /// Repository path below the registry (`helm`, `artifactory/helm`)
    pub repository: String,
    pub protocol: Protocol,
    /// Location below the repository, legacy repositories only
    pub subpath: Option<String>,
}

impl RegistryTarget {
    /// Build a target from caller input
    ///
    /// A non-empty subpath implies a legacy repository. A single leading `/`
    /// is removed from the subpath.
    pub fn new(
        registry: impl Into<String>,
        repository: impl Into<String>,
        use_non_oci_helm_repo: bool,
        non_oci_repo_subpath: Option<&str>,
    ) -> Result<Self> {
        let registry = registry.into().trim().to_string();
        let repository = repository.into().trim().trim_matches('/').to_string();

        if registry.is_empty() {
            return Err(CoreError::InvalidTarget {
                message: "registry must not be empty".to_string(),
            });
        }
        if registry.contains("://") {
            return Err(CoreError::InvalidTarget {
                message: format!(
                    "registry '{}' must be a host name without a scheme",
                    registry
                ),
            });
        }

        let subpath = non_oci_repo_subpath
            .map(|s| s.strip_prefix('/').unwrap_or(s))
            .map(|s| s.trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .map(String::from);

        let protocol = if use_non_oci_helm_repo || subpath.is_some() {
            Protocol::Https
        } else {
            Protocol::Oci
        };

        Ok(Self {
            registry,
            repository,
            protocol,
            subpath,
        })
    }

    /// `<scheme>://<registry>/<repository>`
    pub fn repo_url(&self) -> String {
        if self.repository.is_empty() {
            format!("{}://{}", self.protocol.scheme(), self.registry)
        } else {
            format!(
                "{}://{}/{}",
                self.protocol.scheme(),
                self.registry,
                self.repository
            )
        }
    }

    fn location_url(&self) -> String {
        match (&self.protocol, &self.subpath) {
            (Protocol::Https, Some(subpath)) => format!("{}/{}", self.repo_url(), subpath),
            _ => self.repo_url(),
        }
    }

    /// Fully qualified locator of a chart (or file) in this target
    pub fn chart_url(&self, name: &str) -> String {
        format!("{}/{}", self.location_url(), name)
    }

    /// Location of a packaged chart in a legacy repository
    pub fn package_url(&self, chart: &ChartRef) -> String {
        self.chart_url(&chart.package_file())
    }

    /// Directory URL a legacy upload is sent to
    pub fn upload_url(&self) -> String {
        format!("{}/", self.location_url())
    }

    /// Host handed to `helm registry login`
    pub fn login_host(&self) -> &str {
        &self.registry
    }
}

/// Extract `host[:port]` from a repository URL, with or without a scheme
pub fn registry_host(url: &str) -> String {
    let trimmed = url.trim();
    if let Ok(parsed) = Url::parse(trimmed) {
        if let Some(host) = parsed.host_str() {
            return match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
        }
    }

    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Identity of a chart as declared in its Chart.yaml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRef {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

impl ChartRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            app_version: None,
        }
    }

    /// File name `helm package` produces
    pub fn package_file(&self) -> String {
        format!("{}-{}.tgz", self.name, self.version)
    }
}

impl fmt::Display for ChartRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// A Chart.yaml field readable through `yq`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartField {
    Name,
    Version,
    AppVersion,
}

impl ChartField {
    pub fn expression(&self) -> &'static str {
        match self {
            ChartField::Name => ".name",
            ChartField::Version => ".version",
            ChartField::AppVersion => ".appVersion",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ChartField::Name => "name",
            ChartField::Version => "version",
            ChartField::AppVersion => "appVersion",
        }
    }
}

/// Registry credentials supplied per call
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Secret) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}
