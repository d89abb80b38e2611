//! chartship core - building blocks for driving helm from CI
//!
//! This crate provides the pieces the chart publishing logic is built from:
//! - `command`: typed helm/yq/curl command lines, no shell involved
//! - `exec`: the [`Executor`] seam with local, container and scripted backends
//! - `workspace`: ephemeral copies of a chart directory
//! - `secret`: redacted secret values and `env:`/`file:` handles
//! - `target`: registry targets, chart identity, credentials
//! - `config`: user settings

pub mod command;
pub mod config;
pub mod error;
pub mod exec;
pub mod secret;
pub mod target;
pub mod workspace;

pub use command::{
    CurlCommand, EnvValue, EnvVar, HelmCommand, Invocation, Stdin, Tool, ToolCommand,
    REGISTRY_PASSWORD_VAR, REGISTRY_USERNAME_VAR,
};
pub use config::{ContainerSettings, ExecutorKind, HostMatch, Settings, ToolPaths};
pub use error::{CoreError, Result};
pub use exec::{
    ContainerExecutor, ExecOutput, Executor, LocalExecutor, ScriptedExecutor, executor_for,
};
pub use secret::{Secret, SecretSource};
pub use target::{ChartField, ChartRef, Credentials, Protocol, RegistryTarget, registry_host};
pub use workspace::Workspace;
