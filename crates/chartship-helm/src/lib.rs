//! chartship helm - chart publishing logic
//!
//! Everything hangs off [`Helm`], a client bound to one staged chart
//! workspace through an [`Executor`](chartship_core::Executor):
//!
//! - `metadata`: read `name`, `version` and `appVersion` from Chart.yaml
//! - `probe`: check whether a chart version already exists on a registry
//! - `login`: OCI registry login and legacy repository registration
//! - `deps`: dependency discovery, registry login deduplication, vendoring
//! - `publish`: idempotent package and push
//! - `check`: `helm lint` and `helm unittest`
//! - `suite`: run independent checks concurrently
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chartship_core::{Credentials, LocalExecutor, RegistryTarget, Secret, ToolPaths};
//! use chartship_helm::{Helm, PushRequest};
//!
//! # async fn example() -> chartship_helm::Result<()> {
//! let executor = LocalExecutor::new("./mychart", ToolPaths::default());
//! let helm = Helm::new(Arc::new(executor));
//!
//! let target = RegistryTarget::new("ttl.sh", "helm", false, None)?;
//! let credentials = Credentials::new("ci", Secret::new("token"));
//! let outcome = helm.package_push(&PushRequest::new(target, credentials)).await?;
//! println!("pushed: {}", outcome.pushed());
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod client;
pub mod deps;
pub mod error;
pub mod login;
pub mod metadata;
pub mod probe;
pub mod publish;
pub mod suite;

#[cfg(test)]
mod testing;

pub use check::LintRequest;
pub use client::Helm;
pub use deps::{DEPENDENCY_REPOSITORIES_QUERY, LoginTarget, normalize_registry, same_login};
pub use error::{HelmError, Result};
pub use login::repo_alias;
pub use probe::interpret_probe_status;
pub use publish::{PushOutcome, PushRequest};
pub use suite::{CheckReport, Suite};
