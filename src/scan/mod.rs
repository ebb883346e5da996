pub mod scanner;
pub mod settings;

pub use scanner::{ScanOutcome, ScanSummary, Scanner, SkippedChannel};
pub use settings::ScanSettings;

use scrollcheck_core::{
    ChatClient, Report, ReportFormatter, ReportSink, ScanContext, ScrollResult,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Scan, then post the report unless `dry_run` is set.
///
/// The summary is logged whether or not posting succeeds.
pub async fn run_scan(
    client: Arc<dyn ChatClient>,
    sink: &dyn ReportSink,
    settings: ScanSettings,
    ctx: &ScanContext,
    dry_run: bool,
) -> ScrollResult<ScanOutcome> {
    let destination = settings.report_channel_id;
    let formatter = ReportFormatter::new(settings.window_label());
    let scanner = Scanner::new(client, settings);

    let mut outcome = scanner.scan(ctx).await?;

    if dry_run {
        info!(
            "dry run: {} matches, report not posted",
            outcome.matches.len()
        );
        for m in &outcome.matches {
            info!(
                "[dry-run] #{} {} {} {}",
                m.channel_name,
                m.created_at.format("%Y-%m-%d %H:%M"),
                m.jump_url(),
                m.preview
            );
        }
        outcome.summary.log();
        return Ok(outcome);
    }

    let report = formatter.format(&outcome.matches);
    let posted = post_report(sink, destination, &report, &mut outcome.summary).await;
    if posted.is_ok() {
        info!(
            "posted {} matches to channel {} in {} batches",
            report.total(),
            destination,
            report.batches.len().max(1)
        );
    }
    outcome.summary.log();
    posted.map(|()| outcome)
}

/// Posts the intro then each batch, counting delivered buttons in `summary`.
async fn post_report(
    sink: &dyn ReportSink,
    destination: u64,
    report: &Report,
    summary: &mut ScanSummary,
) -> ScrollResult<()> {
    sink.post_intro(destination, &report.intro).await?;
    for (i, batch) in report.batches.iter().enumerate() {
        if let Err(e) = sink.post_batch(destination, batch).await {
            warn!(
                "report batch {}/{} failed with {} of {} matches posted: {}",
                i + 1,
                report.batches.len(),
                summary.matches_posted,
                report.total(),
                e
            );
            return Err(e);
        }
        summary.matches_posted += batch.len();
    }
    Ok(())
}
