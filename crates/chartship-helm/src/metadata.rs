//! Chart metadata reader
//!
//! Fields are always read fresh from the staged chart: `helm show chart .`
//! renders the manifest, and `yq` picks the requested field out of it.

use chartship_core::{ChartField, ChartRef, HelmCommand, Invocation, Stdin, ToolCommand};

use crate::client::Helm;
use crate::error::{HelmError, Result};

impl Helm {
    /// `name` from Chart.yaml
    pub async fn name(&self) -> Result<String> {
        self.query_chart(ChartField::Name).await
    }

    /// `version` from Chart.yaml
    pub async fn version(&self) -> Result<String> {
        self.query_chart(ChartField::Version).await
    }

    /// `appVersion` from Chart.yaml
    pub async fn app_version(&self) -> Result<String> {
        self.query_chart(ChartField::AppVersion).await
    }

    /// Read one Chart.yaml field, failing when it is absent
    pub async fn query_chart(&self, field: ChartField) -> Result<String> {
        let step = format!("read chart {}", field.key());
        self.query_chart_yaml(field.expression(), &step).await
    }

    /// Read the full chart identity; a missing `appVersion` is allowed
    pub async fn read_chart(&self) -> Result<ChartRef> {
        let name = self.name().await?;
        let version = self.version().await?;
        let app_version = self.declared_app_version().await?;

        Ok(ChartRef {
            name,
            version,
            app_version,
        })
    }

    /// `appVersion` from Chart.yaml, `None` when the chart does not set one
    pub async fn declared_app_version(&self) -> Result<Option<String>> {
        match self.app_version().await {
            Ok(app_version) => Ok(Some(app_version)),
            Err(HelmError::UnparsableOutput { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Render the manifest and run a yq expression over it, returning raw stdout
    pub(crate) async fn eval_chart_yaml(&self, expression: &str, step: &str) -> Result<String> {
        let manifest = self
            .exec_checked(&Invocation::new(
                step,
                HelmCommand::ShowChart {
                    chart: ".".to_string(),
                    version: None,
                },
            ))
            .await?;

        self.exec_checked(
            &Invocation::new(
                step,
                ToolCommand::Yq {
                    expression: expression.to_string(),
                },
            )
            .stdin(Stdin::Text(manifest)),
        )
        .await
    }

    async fn query_chart_yaml(&self, expression: &str, step: &str) -> Result<String> {
        let output = self.eval_chart_yaml(expression, step).await?;
        let value = output.trim();

        if value.is_empty() || value == "null" {
            return Err(HelmError::UnparsableOutput {
                step: step.to_string(),
                output,
            });
        }
        Ok(value.to_string())
    }
}
