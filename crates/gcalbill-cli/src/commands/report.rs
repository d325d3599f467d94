//! The default command: print the billing report.

use std::sync::Arc;

use tracing::debug;

use gcalbill_core::{OutputFormatter, Report, ReportHeader};

use crate::config::ReportConfig;
use crate::error::ClientResult;
use crate::pipeline::ReportPipeline;

/// Authenticates, runs the pipeline and prints the report.
///
/// Authentication finishes before the report deadline starts.
pub async fn run(config: &ReportConfig) -> ClientResult<()> {
    let provider = super::auth::connect(config).await?;

    debug!(
        calendar = %config.calendar,
        start = %config.range.start,
        end = %config.range.end,
        "running report"
    );
    let report = ReportPipeline::from_config(Arc::new(provider), config)?
        .run()
        .await?;

    print!("{}", render(&report, config));
    Ok(())
}

/// Renders `report` in the configured style.
pub fn render(report: &Report, config: &ReportConfig) -> String {
    let header = ReportHeader::new(&config.calendar, config.range);
    let text = OutputFormatter::new(config.style).render(report, &header);
    if text.ends_with('\n') {
        text
    } else {
        text + "\n"
    }
}
