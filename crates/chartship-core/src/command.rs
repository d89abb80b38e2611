//! Typed invocations of the external tools
//!
//! Every command line chartship runs is built here, one variant per tool
//! action. Nothing goes through a shell, and credentials are only ever
//! attached as environment variables or stdin, never as arguments.

use std::fmt;

use crate::secret::Secret;

/// Environment variable holding the registry user for curl
pub const REGISTRY_USERNAME_VAR: &str = "REGISTRY_USERNAME";
/// Environment variable holding the registry password for curl
pub const REGISTRY_PASSWORD_VAR: &str = "REGISTRY_PASSWORD";

/// External binaries chartship drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Helm,
    Yq,
    Curl,
}

impl Tool {
    /// Default binary name
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Helm => "helm",
            Tool::Yq => "yq",
            Tool::Curl => "curl",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// helm actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelmCommand {
    /// `helm show chart <chart> [--version <v>]`
    ShowChart {
        chart: String,
        version: Option<String>,
    },
    /// `helm dependency list`
    DependencyList,
    /// `helm dependency update .`
    DependencyUpdate,
    /// `helm package . [--version <v>] [--app-version <v>]`
    Package {
        version: Option<String>,
        app_version: Option<String>,
    },
    /// `helm push <package> <remote>`
    Push { package: String, remote: String },
    /// `helm registry login <host> --username <u> --password-stdin`
    RegistryLogin { host: String, username: String },
    /// `helm repo add <name> <url> --username <u> --password-stdin`
    RepoAdd {
        name: String,
        url: String,
        username: String,
    },
    /// `helm repo update <name>`
    RepoUpdate { name: String },
    /// `helm lint <args...>`
    Lint { args: Vec<String> },
    /// `helm unittest <args...>`
    Unittest { args: Vec<String> },
}

impl HelmCommand {
    fn args(&self) -> Vec<String> {
        match self {
            HelmCommand::ShowChart { chart, version } => {
                let mut args = strings(&["show", "chart"]);
                args.push(chart.clone());
                if let Some(version) = version {
                    args.push("--version".to_string());
                    args.push(version.clone());
                }
                args
            }
            HelmCommand::DependencyList => strings(&["dependency", "list"]),
            HelmCommand::DependencyUpdate => strings(&["dependency", "update", "."]),
            HelmCommand::Package {
                version,
                app_version,
            } => {
                let mut args = strings(&["package", "."]);
                if let Some(version) = version {
                    args.push("--version".to_string());
                    args.push(version.clone());
                }
                if let Some(app_version) = app_version {
                    args.push("--app-version".to_string());
                    args.push(app_version.clone());
                }
                args
            }
            HelmCommand::Push { package, remote } => {
                vec!["push".to_string(), package.clone(), remote.clone()]
            }
            HelmCommand::RegistryLogin { host, username } => vec![
                "registry".to_string(),
                "login".to_string(),
                host.clone(),
                "--username".to_string(),
                username.clone(),
                "--password-stdin".to_string(),
            ],
            HelmCommand::RepoAdd {
                name,
                url,
                username,
            } => vec![
                "repo".to_string(),
                "add".to_string(),
                name.clone(),
                url.clone(),
                "--username".to_string(),
                username.clone(),
                "--password-stdin".to_string(),
            ],
            HelmCommand::RepoUpdate { name } => {
                vec!["repo".to_string(), "update".to_string(), name.clone()]
            }
            HelmCommand::Lint { args } => {
                let mut all = vec!["lint".to_string()];
                all.extend(args.iter().cloned());
                all
            }
            HelmCommand::Unittest { args } => {
                let mut all = vec!["unittest".to_string()];
                all.extend(args.iter().cloned());
                all
            }
        }
    }
}

/// curl actions against legacy chart repositories
///
/// Credentials are expanded by curl itself from [`REGISTRY_USERNAME_VAR`] and
/// [`REGISTRY_PASSWORD_VAR`] (curl >= 8.3 `--variable` support).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurlCommand {
    /// Headers-only request printing the HTTP status code
    Probe { url: String },
    /// `-T <file> <url>`, failing on HTTP errors
    Upload { file: String, url: String },
}

impl CurlCommand {
    fn args(&self) -> Vec<String> {
        let mut args = strings(&[
            "--variable",
            "%REGISTRY_USERNAME",
            "--variable",
            "%REGISTRY_PASSWORD",
            "--expand-user",
            "{{REGISTRY_USERNAME}}:{{REGISTRY_PASSWORD}}",
        ]);

        match self {
            CurlCommand::Probe { url } => {
                args.push(url.clone());
                args.extend(strings(&[
                    "--output",
                    "/dev/null",
                    "--silent",
                    "-I",
                    "-w",
                    "%{http_code}",
                ]));
            }
            CurlCommand::Upload { file, url } => {
                args.extend(strings(&["--fail", "--silent", "--show-error", "-T"]));
                args.push(file.clone());
                args.push(url.clone());
            }
        }
        args
    }
}

/// A single external tool command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCommand {
    Helm(HelmCommand),
    /// `yq eval <expression> -`, document on stdin
    Yq { expression: String },
    Curl(CurlCommand),
}

impl ToolCommand {
    pub fn tool(&self) -> Tool {
        match self {
            ToolCommand::Helm(_) => Tool::Helm,
            ToolCommand::Yq { .. } => Tool::Yq,
            ToolCommand::Curl(_) => Tool::Curl,
        }
    }

    /// Arguments after the program name
    pub fn args(&self) -> Vec<String> {
        match self {
            ToolCommand::Helm(cmd) => cmd.args(),
            ToolCommand::Yq { expression } => {
                vec!["eval".to_string(), expression.clone(), "-".to_string()]
            }
            ToolCommand::Curl(cmd) => cmd.args(),
        }
    }

    /// Full command line with the default binary name, for logs and errors
    pub fn display_line(&self) -> String {
        let mut line = self.tool().binary().to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}

impl From<HelmCommand> for ToolCommand {
    fn from(cmd: HelmCommand) -> Self {
        ToolCommand::Helm(cmd)
    }
}

impl From<CurlCommand> for ToolCommand {
    fn from(cmd: CurlCommand) -> Self {
        ToolCommand::Curl(cmd)
    }
}

/// Value of an environment variable handed to a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Plain(String),
    Secret(Secret),
}

impl EnvValue {
    pub fn expose(&self) -> &str {
        match self {
            EnvValue::Plain(value) => value,
            EnvValue::Secret(secret) => secret.expose(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: EnvValue,
}

/// Data written to a child's stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stdin {
    Text(String),
    Secret(Secret),
}

impl Stdin {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Stdin::Text(text) => text.as_bytes(),
            Stdin::Secret(secret) => secret.expose().as_bytes(),
        }
    }
}

/// A command plus everything it needs to run
///
/// Environment and stdin live only for the lifetime of the child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// What this invocation is for, used in logs and error messages
    pub step: String,
    pub command: ToolCommand,
    pub env: Vec<EnvVar>,
    pub stdin: Option<Stdin>,
}

impl Invocation {
    pub fn new(step: impl Into<String>, command: impl Into<ToolCommand>) -> Self {
        Self {
            step: step.into(),
            command: command.into(),
            env: Vec::new(),
            stdin: None,
        }
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push(EnvVar {
            name: name.into(),
            value: EnvValue::Plain(value.into()),
        });
        self
    }

    pub fn secret_env(mut self, name: impl Into<String>, value: Secret) -> Self {
        self.env.push(EnvVar {
            name: name.into(),
            value: EnvValue::Secret(value),
        });
        self
    }

    pub fn stdin(mut self, stdin: Stdin) -> Self {
        self.stdin = Some(stdin);
        self
    }

    pub fn tool(&self) -> Tool {
        self.command.tool()
    }

    /// Names of the injected variables, safe to log
    pub fn env_names(&self) -> Vec<&str> {
        self.env.iter().map(|var| var.name.as_str()).collect()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
