use std::sync::Arc;

use anyhow::{Context, Result};

use ghost_notes_lib::windows::HeadlessHost;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let core = ghost_notes_lib::App::new(
        app.data_dir.clone(),
        app.cloud_settings(),
        Arc::new(HeadlessHost),
        runtime.handle().clone(),
    )?;

    let report = runtime
        .block_on(core.sync().pull_and_merge())
        .context("Pull failed")?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "inserted": report.inserted,
                    "updated": report.updated,
                    "removed": report.removed,
                })
            );
        }
        OutputFormat::Plain => {
            println!(
                "{} inserted, {} updated, {} removed",
                report.inserted, report.updated, report.removed
            );
        }
    }

    Ok(())
}
