//! chartship settings
//!
//! Stored in `~/.config/chartship/config.yaml`. Every field is optional;
//! environment variables override the file and CLI flags override both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::command::Tool;
use crate::error::{CoreError, Result};

/// Image used by the container executor unless configured otherwise
pub const DEFAULT_HELM_IMAGE: &str = "quay.io/puzzle/dagger-module-helm:latest";

/// Where external tools run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Directly on this machine
    #[default]
    Local,
    /// One ephemeral container per command
    Container,
}

impl FromStr for ExecutorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ExecutorKind::Local),
            "container" => Ok(ExecutorKind::Container),
            other => Err(CoreError::Config {
                message: format!("unknown executor '{}' (expected local or container)", other),
            }),
        }
    }
}

/// How dependency registries are compared against ones already logged into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMatch {
    /// Normalized URLs must be equal
    #[default]
    Exact,
    /// Either normalized URL containing the other counts as a match
    Containment,
}

impl FromStr for HostMatch {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(HostMatch::Exact),
            "containment" => Ok(HostMatch::Containment),
            other => Err(CoreError::Config {
                message: format!(
                    "unknown host match '{}' (expected exact or containment)",
                    other
                ),
            }),
        }
    }
}

/// Container executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSettings {
    /// Container CLI (`docker`, `podman`)
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Image providing helm, yq, curl and the helm-unittest plugin
    #[serde(default = "default_image")]
    pub image: String,
}

fn default_runtime() -> String {
    "docker".to_string()
}

fn default_image() -> String {
    DEFAULT_HELM_IMAGE.to_string()
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            image: default_image(),
        }
    }
}

/// Binary names or paths of the external tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPaths {
    #[serde(default = "default_helm")]
    pub helm: String,
    #[serde(default = "default_yq")]
    pub yq: String,
    #[serde(default = "default_curl")]
    pub curl: String,
}

fn default_helm() -> String {
    Tool::Helm.binary().to_string()
}

fn default_yq() -> String {
    Tool::Yq.binary().to_string()
}

fn default_curl() -> String {
    Tool::Curl.binary().to_string()
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            helm: default_helm(),
            yq: default_yq(),
            curl: default_curl(),
        }
    }
}

impl ToolPaths {
    pub fn program(&self, tool: Tool) -> &str {
        match tool {
            Tool::Helm => &self.helm,
            Tool::Yq => &self.yq,
            Tool::Curl => &self.curl,
        }
    }
}

/// chartship configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub executor: ExecutorKind,

    #[serde(default)]
    pub container: ContainerSettings,

    #[serde(default)]
    pub tools: ToolPaths,

    /// Give every operation its own helm cache as well
    ///
    /// Registry logins and repository lists always live in the workspace.
    #[serde(default = "default_true")]
    pub isolate_helm_cache: bool,

    #[serde(default)]
    pub dependency_host_match: HostMatch,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            executor: ExecutorKind::default(),
            container: ContainerSettings::default(),
            tools: ToolPaths::default(),
            isolate_helm_cache: true,
            dependency_host_match: HostMatch::default(),
        }
    }
}

impl Settings {
    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    /// Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::Config {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("chartship").join("config.yaml"))
    }

    /// Apply `CHARTSHIP_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("CHARTSHIP_EXECUTOR") {
            self.executor = kind.parse()?;
        }
        if let Some(image) = lookup("CHARTSHIP_IMAGE") {
            self.container.image = image;
        }
        if let Some(runtime) = lookup("CHARTSHIP_CONTAINER_RUNTIME") {
            self.container.runtime = runtime;
        }
        if let Some(helm) = lookup("CHARTSHIP_HELM") {
            self.tools.helm = helm;
        }
        if let Some(yq) = lookup("CHARTSHIP_YQ") {
            self.tools.yq = yq;
        }
        if let Some(curl) = lookup("CHARTSHIP_CURL") {
            self.tools.curl = curl;
        }
        if let Some(host_match) = lookup("CHARTSHIP_DEPENDENCY_HOST_MATCH") {
            self.dependency_host_match = host_match.parse()?;
        }
        Ok(())
    }
}
