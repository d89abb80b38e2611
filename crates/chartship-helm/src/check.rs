//! Lint and unit tests

use chartship_core::{Credentials, HelmCommand, Invocation, Protocol};

use crate::client::Helm;
use crate::error::Result;

/// Options for `helm lint`
#[derive(Debug, Clone, Default)]
pub struct LintRequest {
    /// Extra arguments passed through to `helm lint`
    pub args: Vec<String>,
    /// Used to log into dependency registries before vendoring sub-charts
    pub credentials: Option<Credentials>,
    /// Protocol for dependency repositories that carry no scheme
    pub protocol: Protocol,
}

impl Helm {
    /// Run `helm unittest` and return its report
    pub async fn test(&self, args: &[String]) -> Result<String> {
        self.exec_checked(&Invocation::new(
            "run unit tests",
            HelmCommand::Unittest {
                args: args.to_vec(),
            },
        ))
        .await
    }

    /// Vendor missing dependencies, then run `helm lint` and return its report
    pub async fn lint(&self, request: &LintRequest) -> Result<String> {
        self.resolve_dependencies(request.credentials.as_ref(), request.protocol, None)
            .await?;

        self.exec_checked(&Invocation::new(
            "lint chart",
            HelmCommand::Lint {
                args: request.args.clone(),
            },
        ))
        .await
    }
}
