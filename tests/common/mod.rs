// Shared test helpers; not all items are used by every test binary.
#![allow(unused)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use scrollcheck::config::Config;
use scrollcheck::scan::ScanSettings;
use scrollcheck_core::{
    Channel, ChatClient, EmojiIdentity, LinkButton, Message, Reaction, Reactors, Report,
    ReportIntro, ReportSink, ScrollError, ScrollResult, TimeWindow,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub const GUILD_ID: u64 = 1;
pub const REPORT_CHANNEL_ID: u64 = 99;
pub const ACKNOWLEDGER: u64 = 42;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 12, 18, 0, 0).unwrap()
}

pub fn message(id: u64, channel_id: u64, body: &str, minutes_ago: i64) -> Message {
    Message {
        id,
        channel_id,
        author_id: 500,
        author_is_bot: false,
        body: body.to_string(),
        embed_texts: vec![],
        created_at: now() - Duration::minutes(minutes_ago),
        reactions: vec![],
    }
}

pub fn checkmark_by(users: &[u64]) -> Reaction {
    Reaction {
        emoji: EmojiIdentity::unicode("✅"),
        reactors: Reactors::Known(users.iter().copied().collect()),
    }
}

pub fn valid_config() -> Config {
    let mut config = Config::default();
    config.discord.token = "test-token".to_string();
    config.discord.guild_id = GUILD_ID.to_string();
    config.discord.report_channel_id = REPORT_CHANNEL_ID.to_string();
    config.ack.user_ids = vec![ACKNOWLEDGER.to_string()];
    config
}

pub fn settings_with(edit: impl FnOnce(&mut Config)) -> ScanSettings {
    let mut config = valid_config();
    edit(&mut config);
    config.validate().unwrap();
    ScanSettings::from_config(&config, None).unwrap()
}

/// In-memory guild standing in for the Discord API.
#[derive(Default)]
pub struct MockGuild {
    pub channels: Vec<Channel>,
    pub histories: HashMap<u64, Vec<Message>>,
    pub forbidden: HashSet<u64>,
    pub flaky: HashSet<u64>,
    /// Report batches accepted before later ones fail.
    pub batch_limit: Option<usize>,
    pub fetches: Mutex<Vec<u64>>,
    pub posts: Mutex<Vec<(u64, Report)>>,
}

impl MockGuild {
    pub fn with_channel(mut self, channel: Channel, messages: Vec<Message>) -> Self {
        self.histories.insert(channel.id, messages);
        self.channels.push(channel);
        self
    }

    pub fn forbid(mut self, channel_id: u64) -> Self {
        self.forbidden.insert(channel_id);
        self
    }

    pub fn posted(&self) -> Vec<(u64, Report)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockGuild {
    async fn list_channels(&self, guild_id: u64) -> ScrollResult<Vec<Channel>> {
        if guild_id != GUILD_ID {
            return Err(ScrollError::Fatal(format!("unknown guild {}", guild_id)));
        }
        Ok(self.channels.clone())
    }

    async fn fetch_history(
        &self,
        channel: &Channel,
        window: TimeWindow,
    ) -> ScrollResult<Vec<Message>> {
        self.fetches.lock().unwrap().push(channel.id);
        if self.forbidden.contains(&channel.id) {
            return Err(ScrollError::Permission(format!(
                "Missing Access to channel {}",
                channel.id
            )));
        }
        if self.flaky.contains(&channel.id) {
            return Err(ScrollError::transient("connection reset by peer"));
        }
        Ok(self
            .histories
            .get(&channel.id)
            .map(|h| h.iter().filter(|m| window.contains(m.created_at)).cloned().collect())
            .unwrap_or_default())
    }

    async fn resolve_reactors(
        &self,
        _channel_id: u64,
        _message_id: u64,
        _emoji: &EmojiIdentity,
    ) -> ScrollResult<Vec<u64>> {
        Err(ScrollError::transient("reactor lookup unavailable"))
    }
}

#[async_trait]
impl ReportSink for MockGuild {
    async fn post_intro(&self, destination: u64, intro: &ReportIntro) -> ScrollResult<()> {
        self.posts.lock().unwrap().push((
            destination,
            Report {
                intro: intro.clone(),
                batches: Vec::new(),
            },
        ));
        Ok(())
    }

    async fn post_batch(&self, destination: u64, batch: &[LinkButton]) -> ScrollResult<()> {
        let mut posts = self.posts.lock().unwrap();
        let delivered: usize = posts.iter().map(|(_, r)| r.batches.len()).sum();
        if self.batch_limit.is_some_and(|limit| delivered >= limit) {
            return Err(ScrollError::transient("send timed out"));
        }
        match posts.last_mut() {
            Some((to, report)) if *to == destination => report.batches.push(batch.to_vec()),
            _ => panic!("batch posted to {} before its intro", destination),
        }
        Ok(())
    }
}

/// Log sink for asserting on `tracing` output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().lines().filter(|l| l.contains(needle)).count()
    }

    /// Install as the thread-local subscriber until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
