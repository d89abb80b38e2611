//! Lint command - resolve dependencies and run helm lint

use chartship_core::{Credentials, Protocol, SecretSource};
use chartship_helm::LintRequest;
use std::path::Path;

use super::Context;
use crate::display;
use crate::error::{CliError, Result};

pub async fn run(
    ctx: &Context,
    directory: &Path,
    username: Option<&str>,
    password: Option<&str>,
    use_non_oci_helm_repo: bool,
    args: &[String],
) -> Result<()> {
    let credentials = match (username, password) {
        (Some(username), Some(password)) => Some(Credentials::new(
            username,
            SecretSource::parse(password)?.resolve()?,
        )),
        (None, None) => None,
        _ => {
            return Err(CliError::usage(
                "--username and --password must be given together",
            ));
        }
    };

    let request = LintRequest {
        args: args.to_vec(),
        credentials,
        protocol: if use_non_oci_helm_repo {
            Protocol::Https
        } else {
            Protocol::Oci
        },
    };

    let session = ctx.open(directory)?;
    display::step(format!("Linting {}", directory.display()));

    let result = session.helm.lint(&request).await;
    session.close().await;

    let output = result?;
    print!("{}", output);
    Ok(())
}
