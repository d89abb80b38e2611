//! chartship CLI - package, check and publish Helm charts from CI

use chartship_core::ChartField;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::Context;
use error::Result;

#[derive(Parser)]
#[command(name = "chartship")]
#[command(author = "chartship Contributors")]
#[command(version)]
#[command(about = "Package, check and publish Helm charts from CI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Settings file (default: <config dir>/chartship/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where helm, yq and curl run: local or container
    #[arg(long, global = true)]
    executor: Option<String>,

    /// Image for the container executor
    #[arg(long, global = true)]
    image: Option<String>,
}

#[derive(Args)]
struct ChartArgs {
    /// Chart directory
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,
}

/// Format of the package-push result on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chart name
    Name {
        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Print the chart version
    Version {
        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Print the chart appVersion
    AppVersion {
        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Package and push the chart unless this version is already published
    PackagePush {
        #[command(flatten)]
        chart: ChartArgs,

        /// Registry host, e.g. ghcr.io or registry.example.com:5000
        #[arg(long)]
        registry: String,

        /// Repository path below the registry
        #[arg(long)]
        repository: String,

        /// Registry user
        #[arg(long)]
        username: String,

        /// Registry password: env:NAME, file:PATH or prompt
        #[arg(long)]
        password: String,

        /// Publish to a legacy HTTP(S) chart repository instead of OCI
        #[arg(long)]
        use_non_oci_helm_repo: bool,

        /// Location below the repository (implies a legacy repository)
        #[arg(long)]
        non_oci_repo_subpath: Option<String>,

        /// Package with this version instead of the one in Chart.yaml
        #[arg(long)]
        set_version_to: Option<String>,

        /// Package with this appVersion instead of the one in Chart.yaml
        #[arg(long)]
        set_app_version_to: Option<String>,

        /// Result format
        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Run helm-unittest
    Test {
        #[command(flatten)]
        chart: ChartArgs,

        /// Arguments passed to helm unittest
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Resolve dependencies and run helm lint
    Lint {
        #[command(flatten)]
        chart: ChartArgs,

        /// User for dependency registries
        #[arg(long, requires = "password")]
        username: Option<String>,

        /// Password for dependency registries: env:NAME, file:PATH or prompt
        #[arg(long, requires = "username")]
        password: Option<String>,

        /// Treat dependency repositories without scheme as legacy repositories
        #[arg(long)]
        use_non_oci_helm_repo: bool,

        /// Arguments passed to helm lint
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Run name, version, appVersion, lint and unittest checks concurrently
    Check {
        #[command(flatten)]
        chart: ChartArgs,

        /// Extra argument for helm lint (repeatable)
        #[arg(long = "lint-arg", allow_hyphen_values = true)]
        lint_args: Vec<String>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(
        cli.config.as_deref(),
        cli.executor.as_deref(),
        cli.image.as_deref(),
    )?;

    match cli.command {
        Commands::Name { chart } => {
            commands::metadata::run(&ctx, &chart.directory, ChartField::Name).await
        }

        Commands::Version { chart } => {
            commands::metadata::run(&ctx, &chart.directory, ChartField::Version).await
        }

        Commands::AppVersion { chart } => {
            commands::metadata::run(&ctx, &chart.directory, ChartField::AppVersion).await
        }

        Commands::PackagePush {
            chart,
            registry,
            repository,
            username,
            password,
            use_non_oci_helm_repo,
            non_oci_repo_subpath,
            set_version_to,
            set_app_version_to,
            output,
        } => {
            commands::package_push::run(
                &ctx,
                &chart.directory,
                commands::package_push::PushOptions {
                    registry: &registry,
                    repository: &repository,
                    username: &username,
                    password: &password,
                    use_non_oci_helm_repo,
                    non_oci_repo_subpath: non_oci_repo_subpath.as_deref(),
                    set_version_to: set_version_to.as_deref(),
                    set_app_version_to: set_app_version_to.as_deref(),
                    output,
                },
            )
            .await
        }

        Commands::Test { chart, args } => commands::test::run(&ctx, &chart.directory, &args).await,

        Commands::Lint {
            chart,
            username,
            password,
            use_non_oci_helm_repo,
            args,
        } => {
            commands::lint::run(
                &ctx,
                &chart.directory,
                username.as_deref(),
                password.as_deref(),
                use_non_oci_helm_repo,
                &args,
            )
            .await
        }

        Commands::Check { chart, lint_args } => {
            commands::check::run(&ctx, &chart.directory, &lint_args).await
        }
    }
}
