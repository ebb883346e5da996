use crate::config::Config;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use scrollcheck_core::{
    AckPolicy, ChannelFilter, MarkerMatcher, MarkerSpec, PhraseSpec, RunTrigger, ScanContext,
    ScrollResult, TimeWindow,
};
use std::time::Duration;

/// Longest window a scan will look back over.
pub const MAX_WINDOW: Duration = Duration::from_secs(366 * 24 * 3600);

/// Everything a scan needs, compiled from a validated [`Config`].
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub guild_id: u64,
    pub report_channel_id: u64,
    pub window: Duration,
    pub max_results: usize,
    pub concurrency: usize,
    pub include_bots: bool,
    pub timezone: Tz,
    pub filter: ChannelFilter,
    pub matcher: MarkerMatcher,
    pub ack: AckPolicy,
}

impl ScanSettings {
    /// Compile settings, resolving `preset` (or the configured default preset) into a
    /// channel filter.
    pub fn from_config(config: &Config, preset: Option<&str>) -> ScrollResult<Self> {
        let marker = &config.marker;
        let matcher = MarkerMatcher::new(MarkerSpec {
            unicode: marker.unicode.trim().to_string(),
            custom_id: config.custom_marker_id()?,
            literal: marker.literal_enabled(),
            phrase: marker.phrase.enabled.then(|| PhraseSpec {
                keyword: marker.phrase.keyword.trim().to_string(),
            }),
        });

        Ok(Self {
            guild_id: config.guild_id()?,
            report_channel_id: config.report_channel_id()?,
            window: Duration::from_secs(config.scan.window_hours.saturating_mul(3600)),
            max_results: config.scan.max_results,
            concurrency: config.scan.concurrency.max(1),
            include_bots: config.scan.include_bots,
            timezone: config.timezone()?,
            filter: config.filters.resolve(preset)?,
            matcher,
            ack: AckPolicy::new(config.checkmark()?, config.acknowledger_ids()?)?,
        })
    }

    /// Per-run context: `today` is the calendar date of `now` in the configured timezone.
    pub fn context(&self, now: DateTime<Utc>, trigger: RunTrigger) -> ScanContext {
        let today = now.with_timezone(&self.timezone).date_naive();
        ScanContext::new(now, today, trigger)
    }

    pub fn time_window(&self, now: DateTime<Utc>) -> TimeWindow {
        let span = chrono::Duration::from_std(self.window.min(MAX_WINDOW))
            .unwrap_or_else(|_| chrono::Duration::days(366));
        TimeWindow::trailing(now, span)
    }

    /// Window as shown in the report: whole hours, otherwise humantime form (`30m`).
    pub fn window_label(&self) -> String {
        let secs = self.window.as_secs();
        match (secs / 3600, secs % 3600) {
            (1, 0) => "1 hour".to_string(),
            (hours, 0) => format!("{} hours", hours),
            _ => humantime::format_duration(self.window).to_string(),
        }
    }
}
