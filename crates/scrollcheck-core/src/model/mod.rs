use anyhow::bail;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Longest preview kept on a [`MatchResult`], in characters.
pub const PREVIEW_MAX_CHARS: usize = 140;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Matches `<:name:id>` and `<a:name:id>` custom emoji references in message text.
fn custom_emoji_ref() -> &'static Regex {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"<a?:[A-Za-z0-9_~]+:(\d+)>").expect("Failed to compile custom emoji regex")
    });
    &RE
}

/// Ids of every custom emoji referenced in `text`, in order of appearance.
pub fn custom_emoji_ids(text: &str) -> impl Iterator<Item = u64> + '_ {
    custom_emoji_ref()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Emoji identity as the platform reports it on reactions and in message text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmojiIdentity {
    /// A unicode emoji, stored without the emoji-presentation selector (U+FE0F).
    Unicode(String),
    /// A guild custom emoji, identified by its numeric id only. Names are ignored.
    Custom(u64),
}

impl EmojiIdentity {
    pub fn unicode(s: &str) -> Self {
        Self::Unicode(s.chars().filter(|c| *c != VARIATION_SELECTOR_16).collect())
    }
}

impl FromStr for EmojiIdentity {
    type Err = anyhow::Error;

    /// Accepts a unicode emoji, a bare custom emoji id, or a `<:name:id>` reference.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("emoji identity is empty");
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self::Custom(s.parse()?));
        }
        if s.starts_with('<') {
            let caps = custom_emoji_ref()
                .captures(s)
                .filter(|c| c.get(0).is_some_and(|m| m.as_str() == s));
            return match caps.and_then(|c| c.get(1)?.as_str().parse().ok()) {
                Some(id) => Ok(Self::Custom(id)),
                None => bail!("malformed custom emoji reference '{}'", s),
            };
        }
        Ok(Self::unicode(s))
    }
}

impl fmt::Display for EmojiIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(s) => f.write_str(s),
            Self::Custom(id) => write!(f, "<:_:{}>", id),
        }
    }
}

/// Who reacted with a given emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reactors {
    /// Individual reactor user ids are known.
    Known(BTreeSet<u64>),
    /// Only the number of reactions is known. Never satisfies an authorization check.
    CountOnly(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: EmojiIdentity,
    pub reactors: Reactors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Thread { parent_id: u64, archived: bool },
}

/// A text channel or thread in the scanned guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    /// For threads this is the parent channel's category.
    pub category_id: Option<u64>,
    pub kind: ChannelKind,
}

impl Channel {
    pub fn text(id: u64, name: impl Into<String>, category_id: Option<u64>) -> Self {
        Self {
            id,
            name: name.into(),
            category_id,
            kind: ChannelKind::Text,
        }
    }

    /// Build a thread under `parent`. Threads carry no category of their own, so the
    /// parent's category is copied onto the thread.
    pub fn thread(id: u64, name: impl Into<String>, parent: &Channel, archived: bool) -> Self {
        Self {
            id,
            name: name.into(),
            category_id: parent.category_id,
            kind: ChannelKind::Thread {
                parent_id: parent.id,
                archived,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub body: String,
    /// Embed titles and descriptions, in embed order.
    pub embed_texts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub reactions: Vec<Reaction>,
}

impl Message {
    pub fn reaction(&self, emoji: &EmojiIdentity) -> Option<&Reaction> {
        self.reactions.iter().find(|r| &r.emoji == emoji)
    }
}

/// Inclusive `[start, end]` span of message creation times to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The window of length `span` ending at `now`.
    pub fn trailing(now: DateTime<Utc>, span: Duration) -> Self {
        Self {
            start: now - span,
            end: now,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// An unacknowledged, marker-bearing message pending report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub guild_id: u64,
    pub channel_id: u64,
    pub channel_name: String,
    pub message_id: u64,
    pub created_at: DateTime<Utc>,
    pub preview: String,
}

impl MatchResult {
    pub fn new(guild_id: u64, channel: &Channel, message: &Message) -> Self {
        Self {
            guild_id,
            channel_id: channel.id,
            channel_name: channel.name.clone(),
            message_id: message.id,
            created_at: message.created_at,
            preview: preview(&message.body),
        }
    }

    pub fn jump_url(&self) -> String {
        format!(
            "https://discord.com/channels/{}/{}/{}",
            self.guild_id, self.channel_id, self.message_id
        )
    }
}

/// Single-line preview of a message body: newlines flattened, trimmed and cut to
/// [`PREVIEW_MAX_CHARS`]. Empty bodies become `(no text)`.
pub fn preview(body: &str) -> String {
    let flat = body.replace(['\r', '\n'], " ");
    let trimmed = flat.trim();
    if trimmed.is_empty() {
        return "(no text)".to_string();
    }
    trimmed.chars().take(PREVIEW_MAX_CHARS).collect()
}
