use super::settings::ScanSettings;
use futures_util::stream::{self, StreamExt};
use scrollcheck_core::{
    Channel, ChatClient, MatchResult, Message, Reactors, ScanContext, ScrollError, ScrollResult,
    TimeWindow,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Counters for one run. Logged at the end of every scan, including empty ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub channels_total: usize,
    pub channels_eligible: usize,
    pub channels_scanned: usize,
    pub channels_skipped: usize,
    /// Channels left unscanned because earlier channels already filled the cap.
    pub channels_abandoned: usize,
    pub messages_seen: usize,
    pub matches_found: usize,
    pub matches_posted: usize,
}

impl ScanSummary {
    pub fn log(&self) {
        info!(
            "scan summary: {} channels ({} eligible), {} scanned, {} skipped, {} abandoned, \
             {} messages in window, {} matches found, {} posted",
            self.channels_total,
            self.channels_eligible,
            self.channels_scanned,
            self.channels_skipped,
            self.channels_abandoned,
            self.messages_seen,
            self.matches_found,
            self.matches_posted
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChannel {
    pub channel_id: u64,
    pub channel_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Unacknowledged matches in channel order, newest first within a channel.
    pub matches: Vec<MatchResult>,
    pub summary: ScanSummary,
    pub skipped: Vec<SkippedChannel>,
}

enum ChannelScan {
    Scanned {
        matches: Vec<MatchResult>,
        messages_seen: usize,
    },
    Skipped(ScrollError),
    Abandoned,
}

/// Walks eligible channels and collects unacknowledged scroll messages.
pub struct Scanner {
    client: Arc<dyn ChatClient>,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(client: Arc<dyn ChatClient>, settings: ScanSettings) -> Self {
        Self { client, settings }
    }

    /// Run one scan.
    ///
    /// Channels are fetched up to `concurrency` at a time but their results are
    /// consumed in listing order, so the capped result set is the same on every run
    /// over the same data. A channel that cannot be read is logged and skipped; only
    /// failing to list the guild's channels aborts the scan.
    pub async fn scan(&self, ctx: &ScanContext) -> ScrollResult<ScanOutcome> {
        let guild_id = self.settings.guild_id;
        let channels = self
            .client
            .list_channels(guild_id)
            .await
            .map_err(|e| match e {
                ScrollError::Fatal(_) | ScrollError::Config(_) => e,
                other => ScrollError::Fatal(format!(
                    "cannot list channels for guild {}: {}",
                    guild_id, other
                )),
            })?;

        let mut outcome = ScanOutcome::default();
        let mut seen = HashSet::new();
        let channels: Vec<Channel> = channels.into_iter().filter(|c| seen.insert(c.id)).collect();
        outcome.summary.channels_total = channels.len();

        let eligible: Vec<&Channel> = channels
            .iter()
            .filter(|c| self.settings.filter.is_eligible(c))
            .collect();
        outcome.summary.channels_eligible = eligible.len();
        debug!(
            "{} of {} channels eligible in guild {}",
            eligible.len(),
            channels.len(),
            guild_id
        );

        let window = self.settings.time_window(ctx.now);
        let cap = self.settings.max_results;
        let emitted = AtomicUsize::new(0);
        let emitted_ref = &emitted;

        let mut scans = stream::iter(eligible)
            .map(|channel| async move {
                let result = self.scan_channel(channel, window, ctx, emitted_ref).await;
                (channel, result)
            })
            .buffered(self.settings.concurrency.max(1));

        while let Some((channel, result)) = scans.next().await {
            match result {
                ChannelScan::Scanned {
                    matches,
                    messages_seen,
                } => {
                    outcome.summary.channels_scanned += 1;
                    outcome.summary.messages_seen += messages_seen;
                    let room = cap.saturating_sub(outcome.matches.len());
                    if matches.len() > room {
                        debug!(
                            "cap of {} reached in #{}; dropping {} later matches",
                            cap,
                            channel.name,
                            matches.len() - room
                        );
                    }
                    for m in matches.into_iter().take(room) {
                        debug!("match in #{}: {}", m.channel_name, m.jump_url());
                        outcome.matches.push(m);
                    }
                    emitted.store(outcome.matches.len(), Ordering::SeqCst);
                }
                ChannelScan::Skipped(e) => {
                    warn!("skipping channel #{} ({}): {}", channel.name, channel.id, e);
                    outcome.summary.channels_skipped += 1;
                    outcome.skipped.push(SkippedChannel {
                        channel_id: channel.id,
                        channel_name: channel.name.clone(),
                        reason: e.to_string(),
                    });
                }
                ChannelScan::Abandoned => {
                    debug!("cap reached before #{} was scanned", channel.name);
                    outcome.summary.channels_abandoned += 1;
                }
            }
        }

        outcome.summary.matches_found = outcome.matches.len();
        Ok(outcome)
    }

    async fn scan_channel(
        &self,
        channel: &Channel,
        window: TimeWindow,
        ctx: &ScanContext,
        emitted: &AtomicUsize,
    ) -> ChannelScan {
        let cap = self.settings.max_results;
        // `emitted` only ever counts channels listed before this one
        if emitted.load(Ordering::SeqCst) >= cap {
            return ChannelScan::Abandoned;
        }

        let history = match self.client.fetch_history(channel, window).await {
            Ok(history) => history,
            Err(e) => return ChannelScan::Skipped(e),
        };
        let messages = self.in_scope(history, window);
        let messages_seen = messages.len();

        let mut matches = Vec::new();
        for mut message in messages {
            let room = cap.saturating_sub(emitted.load(Ordering::SeqCst));
            if room == 0 {
                return ChannelScan::Abandoned;
            }
            if matches.len() >= room {
                break;
            }
            if !self.settings.matcher.matches(&message, ctx) {
                continue;
            }
            self.resolve_checkmark(channel, &mut message).await;
            if self.settings.ack.is_acknowledged(&message) {
                debug!("message {} in #{} already acknowledged", message.id, channel.name);
                continue;
            }
            matches.push(MatchResult::new(self.settings.guild_id, channel, &message));
        }

        ChannelScan::Scanned {
            matches,
            messages_seen,
        }
    }

    /// Window and bot filtering, one entry per message id, newest first.
    fn in_scope(&self, history: Vec<Message>, window: TimeWindow) -> Vec<Message> {
        let mut seen = HashSet::new();
        let mut messages: Vec<Message> = history
            .into_iter()
            .filter(|m| window.contains(m.created_at))
            .filter(|m| self.settings.include_bots || !m.author_is_bot)
            .filter(|m| seen.insert(m.id))
            .collect();
        messages.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        messages
    }

    /// Replace a count-only checkmark reaction with its reactor ids. On failure the
    /// reaction stays count-only, which never counts as acknowledged.
    async fn resolve_checkmark(&self, channel: &Channel, message: &mut Message) {
        let ack = &self.settings.ack;
        if !ack.needs_reactor_lookup(message) {
            return;
        }
        match self
            .client
            .resolve_reactors(channel.id, message.id, ack.checkmark())
            .await
        {
            Ok(ids) => {
                for reaction in message
                    .reactions
                    .iter_mut()
                    .filter(|r| &r.emoji == ack.checkmark())
                {
                    reaction.reactors = Reactors::Known(ids.iter().copied().collect());
                }
            }
            Err(e) => warn!(
                "could not resolve {} reactors on message {} in #{}: {}; treating as unacknowledged",
                ack.checkmark(),
                message.id,
                channel.name,
                e
            ),
        }
    }
}
