use crate::utils::retry::{RetryConfig, with_retry, with_retry_no_replay};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scrollcheck_core::{
    Channel, ChatClient, EmojiIdentity, LinkButton, Message, Reaction, Reactors, Report,
    ReportIntro, ReportSink, ScrollError, ScrollResult, TimeWindow,
};
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateMessage, GetMessages,
};
use serenity::http::Http;
use serenity::model::channel::{ChannelType, GuildChannel, Message as DiscordMessage, ReactionType};
use serenity::model::id::{ChannelId, EmojiId, GuildId, MessageId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Milliseconds between the Unix epoch and the first second of 2015, Discord's epoch.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

const PAGE_SIZE: u8 = 100;
/// Upper bound on history pages per channel (100 messages each).
const MAX_HISTORY_PAGES: usize = 200;
const MAX_REACTOR_PAGES: usize = 10;

/// Creation time encoded in a snowflake id.
pub fn snowflake_time(id: u64) -> DateTime<Utc> {
    let ms = i64::try_from(id >> 22).unwrap_or(i64::MAX).saturating_add(DISCORD_EPOCH_MS);
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Cursor for the next, older page of history: the oldest id on `page`, or `None`
/// when the page was short or already reaches back past `window_start`.
pub fn older_page_cursor(page: &[u64], window_start: DateTime<Utc>) -> Option<u64> {
    let oldest = page.iter().copied().min()?;
    if page.len() < usize::from(PAGE_SIZE) || snowflake_time(oldest) < window_start {
        return None;
    }
    Some(oldest)
}

/// Smallest snowflake that could have been created at `at`.
pub fn snowflake_from_time(at: DateTime<Utc>) -> u64 {
    let ms = (at.timestamp_millis() - DISCORD_EPOCH_MS).max(0);
    u64::try_from(ms).unwrap_or(0) << 22
}

/// Map an HTTP status from the Discord API onto the error taxonomy.
pub fn classify_status(status: u16, message: String) -> ScrollError {
    match status {
        401 => ScrollError::Fatal(message),
        403 | 404 => ScrollError::Permission(message),
        408 | 429 | 500..=599 => ScrollError::transient(message),
        _ => ScrollError::Fatal(message),
    }
}

fn classify(what: &str, e: serenity::Error) -> ScrollError {
    let message = format!("{}: {}", what, e);
    match &e {
        serenity::Error::Http(http) => match http.status_code() {
            Some(status) => classify_status(status.as_u16(), message),
            // No response at all: connection reset, DNS, TLS
            None => ScrollError::transient(message),
        },
        serenity::Error::Io(_) => ScrollError::transient(message),
        _ => ScrollError::Fatal(message),
    }
}

/// Identity of a reaction emoji, or `None` for kinds that can never be a checkmark.
pub fn reaction_identity(reaction: &ReactionType) -> Option<EmojiIdentity> {
    match reaction {
        ReactionType::Unicode(s) => Some(EmojiIdentity::unicode(s)),
        ReactionType::Custom { id, .. } => Some(EmojiIdentity::Custom(id.get())),
        _ => None,
    }
}

fn reaction_type(emoji: &EmojiIdentity) -> ReactionType {
    match emoji {
        EmojiIdentity::Unicode(s) => ReactionType::Unicode(s.clone()),
        EmojiIdentity::Custom(id) => ReactionType::Custom {
            animated: false,
            id: EmojiId::new(*id),
            name: Some("_".to_string()),
        },
    }
}

fn convert_message(msg: &DiscordMessage) -> Message {
    let embed_texts = msg
        .embeds
        .iter()
        .flat_map(|e| [e.title.clone(), e.description.clone()])
        .flatten()
        .filter(|t| !t.is_empty())
        .collect();
    let reactions = msg
        .reactions
        .iter()
        .filter_map(|r| {
            Some(Reaction {
                emoji: reaction_identity(&r.reaction_type)?,
                reactors: Reactors::CountOnly(r.count),
            })
        })
        .collect();
    Message {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        author_is_bot: msg.author.bot,
        body: msg.content.clone(),
        embed_texts,
        created_at: snowflake_time(msg.id.get()),
        reactions,
    }
}

fn is_text_like(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News)
}

fn has_threads(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::Text | ChannelType::News | ChannelType::Forum
    )
}

fn is_thread(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
    )
}

/// Build the scannable channel list: text channels in sidebar order, then threads
/// by id. Threads whose parent is unknown are dropped.
fn assemble_channels(guild_channels: &[GuildChannel], threads: &[GuildChannel]) -> Vec<Channel> {
    let mut parents: Vec<&GuildChannel> = guild_channels
        .iter()
        .filter(|c| has_threads(c.kind))
        .collect();
    parents.sort_by_key(|c| (c.position, c.id));

    let by_id: HashMap<u64, Channel> = parents
        .iter()
        .map(|c| {
            let channel = Channel::text(c.id.get(), c.name.clone(), c.parent_id.map(|p| p.get()));
            (c.id.get(), channel)
        })
        .collect();

    let mut out: Vec<Channel> = parents
        .iter()
        .filter(|c| is_text_like(c.kind))
        .filter_map(|c| by_id.get(&c.id.get()).cloned())
        .collect();

    let mut seen = HashSet::new();
    let mut thread_list: Vec<&GuildChannel> = threads
        .iter()
        .filter(|t| is_thread(t.kind) && seen.insert(t.id))
        .collect();
    thread_list.sort_by_key(|t| t.id);
    for t in thread_list {
        let Some(parent) = t.parent_id.and_then(|p| by_id.get(&p.get())) else {
            debug!("thread {} has no known parent; skipping", t.id);
            continue;
        };
        let archived = t.thread_metadata.as_ref().is_some_and(|m| m.archived);
        out.push(Channel::thread(t.id.get(), t.name.clone(), parent, archived));
    }
    out
}

fn render_intro(intro: &ReportIntro) -> CreateMessage {
    let mut embed = CreateEmbed::new()
        .title(&intro.title)
        .description(&intro.description);
    if let Some(footer) = &intro.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    CreateMessage::new().embed(embed)
}

fn render_batch(batch: &[LinkButton]) -> CreateMessage {
    let rows = Report::rows(batch)
        .map(|row| {
            CreateActionRow::Buttons(
                row.iter()
                    .map(|b| CreateButton::new_link(&b.url).label(&b.label))
                    .collect(),
            )
        })
        .collect();
    CreateMessage::new().components(rows)
}

/// REST-only Discord client: reads history and posts reports without a gateway
/// connection.
pub struct DiscordClient {
    http: Arc<Http>,
    retry: RetryConfig,
}

impl DiscordClient {
    pub fn new(token: &str, retry: RetryConfig) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
            retry,
        }
    }

    /// Check the token. Any failure here is fatal.
    pub async fn verify(&self) -> ScrollResult<()> {
        let user = with_retry(&self.retry, "authenticate", || async move {
            self.http
                .get_current_user()
                .await
                .map_err(|e| classify("authenticate", e))
        })
        .await
        .map_err(|e| ScrollError::Fatal(format!("cannot authenticate with Discord: {}", e)))?;
        info!("authenticated as {} (id: {})", user.name, user.id);
        Ok(())
    }

    async fn archived_threads(&self, parent: &GuildChannel) -> Vec<GuildChannel> {
        let what = format!("list archived threads of #{}", parent.name);
        let what = what.as_str();
        let result = with_retry(&self.retry, what, || async move {
            parent
                .id
                .get_archived_public_threads(&*self.http, None, Some(u64::from(PAGE_SIZE)))
                .await
                .map_err(|e| classify(what, e))
        })
        .await;
        match result {
            Ok(data) => data.threads,
            Err(e) => {
                debug!("{}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn list_channels(&self, guild_id: u64) -> ScrollResult<Vec<Channel>> {
        let guild = GuildId::new(guild_id);

        let guild_channels: Vec<GuildChannel> = with_retry(&self.retry, "list channels", || async move {
            guild
                .channels(&*self.http)
                .await
                .map_err(|e| classify("list channels", e))
        })
        .await?
        .into_values()
        .collect();

        let mut threads = with_retry(&self.retry, "list active threads", || async move {
            guild
                .get_active_threads(&*self.http)
                .await
                .map_err(|e| classify("list active threads", e))
        })
        .await?
        .threads;

        for parent in guild_channels.iter().filter(|c| has_threads(c.kind)) {
            threads.extend(self.archived_threads(parent).await);
        }

        let channels = assemble_channels(&guild_channels, &threads);
        debug!(
            "guild {}: {} channels, {} threads considered, {} scannable",
            guild_id,
            guild_channels.len(),
            threads.len(),
            channels.len()
        );
        Ok(channels)
    }

    async fn fetch_history(
        &self,
        channel: &Channel,
        window: TimeWindow,
    ) -> ScrollResult<Vec<Message>> {
        let channel_id = ChannelId::new(channel.id);
        let what = format!("fetch history of #{}", channel.name);
        let what = what.as_str();
        // Newest first, so hitting the page limit drops the oldest messages.
        let mut cursor = snowflake_from_time(window.end + chrono::Duration::milliseconds(1));
        let mut messages = Vec::new();

        for _ in 0..MAX_HISTORY_PAGES {
            let page = with_retry(&self.retry, what, || async move {
                channel_id
                    .messages(
                        &*self.http,
                        GetMessages::new()
                            .before(MessageId::new(cursor.max(1)))
                            .limit(PAGE_SIZE),
                    )
                    .await
                    .map_err(|e| classify(what, e))
            })
            .await?;

            let ids: Vec<u64> = page.iter().map(|m| m.id.get()).collect();
            messages.extend(page.iter().map(convert_message));
            match older_page_cursor(&ids, window.start) {
                Some(oldest) => cursor = oldest,
                None => return Ok(messages),
            }
        }

        warn!(
            "#{}: stopped after {} pages of history",
            channel.name, MAX_HISTORY_PAGES
        );
        Ok(messages)
    }

    async fn resolve_reactors(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &EmojiIdentity,
    ) -> ScrollResult<Vec<u64>> {
        let channel = ChannelId::new(channel_id);
        let message = MessageId::new(message_id);
        let what = format!("list {} reactors on message {}", emoji, message_id);
        let what = what.as_str();
        let mut after: Option<UserId> = None;
        let mut ids = Vec::new();

        for _ in 0..MAX_REACTOR_PAGES {
            let users = with_retry(&self.retry, what, || async move {
                channel
                    .reaction_users(
                        &*self.http,
                        message,
                        reaction_type(emoji),
                        Some(PAGE_SIZE),
                        after,
                    )
                    .await
                    .map_err(|e| classify(what, e))
            })
            .await?;

            ids.extend(users.iter().map(|u| u.id.get()));
            match users.last() {
                Some(last) if users.len() >= usize::from(PAGE_SIZE) => after = Some(last.id),
                _ => break,
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl ReportSink for DiscordClient {
    async fn post_intro(&self, destination: u64, intro: &ReportIntro) -> ScrollResult<()> {
        let channel = ChannelId::new(destination);
        let what = format!("post report intro to channel {}", destination);
        let what = what.as_str();
        with_retry_no_replay(&self.retry, what, || async move {
            channel
                .send_message(&*self.http, render_intro(intro))
                .await
                .map_err(|e| classify(what, e))
        })
        .await?;
        Ok(())
    }

    async fn post_batch(&self, destination: u64, batch: &[LinkButton]) -> ScrollResult<()> {
        let channel = ChannelId::new(destination);
        let what = format!("post {} report buttons to channel {}", batch.len(), destination);
        let what = what.as_str();
        with_retry_no_replay(&self.retry, what, || async move {
            channel
                .send_message(&*self.http, render_batch(batch))
                .await
                .map_err(|e| classify(what, e))
        })
        .await?;
        debug!("posted {} buttons to channel {}", batch.len(), destination);
        Ok(())
    }
}
