//! Check command - run the chart checks concurrently
//!
//! Every check stages its own copy of the chart, so lint's dependency
//! downloads never race the other checks.

use chartship_core::{ChartField, Settings};
use chartship_helm::{Helm, LintRequest, Suite};
use std::future::Future;
use std::path::{Path, PathBuf};

use super::{Context, Session};
use crate::display;
use crate::error::Result;

pub async fn run(ctx: &Context, directory: &Path, lint_args: &[String]) -> Result<()> {
    // Fail on a missing chart before spawning anything
    if !directory.join("Chart.yaml").is_file() {
        return Err(chartship_core::CoreError::ChartNotFound {
            path: directory.display().to_string(),
        }
        .into());
    }

    let mut suite = Suite::new();
    for field in [ChartField::Name, ChartField::Version, ChartField::AppVersion] {
        suite = suite.check(
            field.key(),
            in_session(ctx.settings.clone(), directory.to_path_buf(), move |helm| async move {
                helm.query_chart(field).await
            }),
        );
    }

    let lint = LintRequest {
        args: lint_args.to_vec(),
        ..LintRequest::default()
    };
    suite = suite.check(
        "lint",
        in_session(ctx.settings.clone(), directory.to_path_buf(), move |helm| async move {
            helm.lint(&lint).await
        }),
    );

    if directory.join("tests").is_dir() {
        suite = suite.check(
            "unittest",
            in_session(ctx.settings.clone(), directory.to_path_buf(), |helm| async move {
                helm.test(&[]).await
            }),
        );
    } else {
        display::skipped("no tests/ directory, skipping unittest");
    }

    display::step(format!(
        "Running {} checks on {}",
        suite.len(),
        directory.display()
    ));
    let reports = suite.run().await?;

    for report in reports {
        display::success(&report.name);
        let output = report.output.trim_end();
        if !output.is_empty() {
            println!("{}: {}", report.name, output);
        }
    }
    Ok(())
}

/// Run `check` against a freshly staged copy of `directory`
fn in_session<F, Fut>(
    settings: Settings,
    directory: PathBuf,
    check: F,
) -> impl Future<Output = chartship_helm::Result<String>> + Send + 'static
where
    F: FnOnce(Helm) -> Fut + Send + 'static,
    Fut: Future<Output = chartship_helm::Result<String>> + Send + 'static,
{
    async move {
        let session = Session::open(&settings, &directory)?;
        let result = check(session.helm.clone()).await;
        session.close().await;
        result
    }
}
