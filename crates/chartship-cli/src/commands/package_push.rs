//! package-push command - publish a chart unless that version already exists

use chartship_core::{ChartRef, Credentials, RegistryTarget, SecretSource};
use chartship_helm::{PushOutcome, PushRequest};
use serde::Serialize;
use std::path::Path;

use super::Context;
use crate::OutputFormat;
use crate::display;
use crate::error::{CliError, Result};

/// Options of one package-push run, as given on the command line
pub struct PushOptions<'a> {
    pub registry: &'a str,
    pub repository: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub use_non_oci_helm_repo: bool,
    pub non_oci_repo_subpath: Option<&'a str>,
    pub set_version_to: Option<&'a str>,
    pub set_app_version_to: Option<&'a str>,
    pub output: OutputFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PushReport<'a> {
    pushed: bool,
    chart: &'a ChartRef,
    repository: String,
}

pub async fn run(ctx: &Context, directory: &Path, opts: PushOptions<'_>) -> Result<()> {
    let target = RegistryTarget::new(
        opts.registry,
        opts.repository,
        opts.use_non_oci_helm_repo,
        opts.non_oci_repo_subpath,
    )?;
    let password = SecretSource::parse(opts.password)?.resolve()?;
    if password.is_empty() {
        return Err(CliError::usage("Registry password is empty"));
    }
    let credentials = Credentials::new(opts.username, password);

    let request = PushRequest::new(target, credentials)
        .with_version(opts.set_version_to.map(String::from))
        .with_app_version(opts.set_app_version_to.map(String::from));

    let session = ctx.open(directory)?;
    display::step(format!(
        "Publishing {} to {}",
        session.workspace().source().display(),
        request.target.repo_url()
    ));

    let result = session.helm.package_push(&request).await;
    session.close().await;

    let outcome = result?;
    match &outcome {
        PushOutcome::Pushed(chart) => display::success(format!("Pushed {}", chart)),
        PushOutcome::AlreadyExists(chart) => {
            display::skipped(format!("{} already exists, nothing to do", chart))
        }
    }

    match opts.output {
        OutputFormat::Text => println!("{}", outcome.pushed()),
        OutputFormat::Json => {
            let report = PushReport {
                pushed: outcome.pushed(),
                chart: outcome.chart(),
                repository: request.target.repo_url(),
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::internal(e.to_string()))?;
            println!("{}", json);
        }
    }
    Ok(())
}
