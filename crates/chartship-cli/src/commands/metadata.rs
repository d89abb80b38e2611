//! name / version / app-version commands - print a Chart.yaml field

use chartship_core::ChartField;
use std::path::Path;

use super::Context;
use crate::error::Result;

pub async fn run(ctx: &Context, directory: &Path, field: ChartField) -> Result<()> {
    let session = ctx.open(directory)?;
    let result = session.helm.query_chart(field).await;
    session.close().await;

    let value = result?;
    println!("{}", value);
    Ok(())
}
