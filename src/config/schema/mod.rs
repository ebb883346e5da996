use crate::utils::retry::RetryConfig;
use chrono_tz::Tz;
use scrollcheck_core::{ChannelFilter, EmojiIdentity, ScrollError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

// ---------------------------------------------------------------------------
// Discord connection
// ---------------------------------------------------------------------------

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default, rename = "guildId")]
    pub guild_id: String,
    /// Channel or thread that receives the report.
    #[serde(default, rename = "reportChannelId")]
    pub report_channel_id: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field(
                "token",
                &if self.token.is_empty() {
                    "[empty]"
                } else {
                    "[REDACTED]"
                },
            )
            .field("guild_id", &self.guild_id)
            .field("report_channel_id", &self.report_channel_id)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Scan window and limits
// ---------------------------------------------------------------------------

fn default_window_hours() -> u64 {
    24
}

fn default_max_results() -> usize {
    500
}

fn default_concurrency() -> usize {
    10
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_window_hours", rename = "windowHours")]
    pub window_hours: u64,
    /// Cap on reported matches across the whole scan.
    #[serde(default = "default_max_results", rename = "maxResults")]
    pub max_results: usize,
    /// Channels scanned at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default, rename = "includeBots")]
    pub include_bots: bool,
    /// IANA timezone used to decide "today" for scroll phrases.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            max_results: default_max_results(),
            concurrency: default_concurrency(),
            include_bots: false,
            timezone: default_timezone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Marker
// ---------------------------------------------------------------------------

fn default_scroll() -> String {
    "📜".to_string()
}

fn default_keyword() -> String {
    "delivery".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Word that must follow the marker, e.g. `📜 delivery Dec 12 evening`.
    #[serde(default = "default_keyword")]
    pub keyword: String,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keyword: default_keyword(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    #[serde(default = "default_scroll")]
    pub unicode: String,
    /// Custom emoji id (or `<:name:id>` reference) that also counts as a scroll.
    #[serde(default, rename = "customEmoji")]
    pub custom_emoji: String,
    /// Match the marker anywhere in a message. Unset means on unless phrase mode is
    /// enabled, since every phrase also contains the marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<bool>,
    #[serde(default)]
    pub phrase: PhraseConfig,
}

impl MarkerConfig {
    /// Whether literal matching is in effect.
    pub fn literal_enabled(&self) -> bool {
        self.literal.unwrap_or(!self.phrase.enabled)
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            unicode: default_scroll(),
            custom_emoji: String::new(),
            literal: None,
            phrase: PhraseConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Acknowledgment
// ---------------------------------------------------------------------------

fn default_checkmark() -> String {
    "✅".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckConfig {
    /// Users whose checkmark clears a scroll. Must not be empty.
    #[serde(default, rename = "userIds")]
    pub user_ids: Vec<String>,
    #[serde(default = "default_checkmark")]
    pub checkmark: String,
}

impl Default for AckConfig {
    fn default() -> Self {
        Self {
            user_ids: Vec::new(),
            checkmark: default_checkmark(),
        }
    }
}

// ---------------------------------------------------------------------------
// Channel filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterPreset {
    #[serde(default, rename = "allowIds")]
    pub allow_ids: Vec<String>,
    #[serde(default, rename = "allowCategories")]
    pub allow_categories: Vec<String>,
    #[serde(default, rename = "allowNames")]
    pub allow_names: Vec<String>,
    #[serde(default, rename = "excludeNames")]
    pub exclude_names: Vec<String>,
}

impl FilterPreset {
    pub fn to_filter(&self, preset: &str) -> Result<ChannelFilter, ScrollError> {
        let allow_ids = parse_ids(
            &format!("filters.presets.{}.allowIds", preset),
            &self.allow_ids,
        )?;
        let allow_categories = parse_ids(
            &format!("filters.presets.{}.allowCategories", preset),
            &self.allow_categories,
        )?;
        Ok(ChannelFilter::new(
            allow_ids,
            allow_categories,
            &self.allow_names,
            &self.exclude_names,
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Preset used when none is chosen on the command line.
    #[serde(default, rename = "defaultPreset")]
    pub default_preset: Option<String>,
    #[serde(default)]
    pub presets: BTreeMap<String, FilterPreset>,
}

impl FiltersConfig {
    /// Resolve the filter for `requested`, falling back to `defaultPreset`, then to
    /// an empty filter that admits every channel.
    pub fn resolve(&self, requested: Option<&str>) -> Result<ChannelFilter, ScrollError> {
        let Some(name) = requested.or(self.default_preset.as_deref()) else {
            return Ok(ChannelFilter::default());
        };
        let preset = self.presets.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.presets.keys().map(String::as_str).collect();
            ScrollError::Config(format!(
                "unknown filter preset '{}' (known: {})",
                name,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            ))
        })?;
        preset.to_filter(name)
    }
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub marker: MarkerConfig,
    #[serde(default)]
    pub ack: AckConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ScrollError> {
        self.validate_discord()?;
        self.validate_scan()?;
        self.validate_marker()?;
        self.validate_ack()?;
        self.validate_filters()?;
        self.validate_retry()?;
        Ok(())
    }

    fn validate_discord(&self) -> Result<(), ScrollError> {
        if self.discord.token.trim().is_empty() {
            return Err(ScrollError::Config(
                "discord.token is empty (set it or SCROLLCHECK_DISCORD_TOKEN)".into(),
            ));
        }
        self.guild_id()?;
        self.report_channel_id()?;
        Ok(())
    }

    fn validate_scan(&self) -> Result<(), ScrollError> {
        let s = &self.scan;
        if s.window_hours == 0 {
            return Err(ScrollError::Config("scan.windowHours must be > 0".into()));
        }
        if s.window_hours > 24 * 366 {
            return Err(ScrollError::Config(
                "scan.windowHours is unreasonably large (> 1 year)".into(),
            ));
        }
        if s.max_results == 0 {
            return Err(ScrollError::Config("scan.maxResults must be > 0".into()));
        }
        if s.concurrency == 0 {
            return Err(ScrollError::Config("scan.concurrency must be > 0".into()));
        }
        if s.concurrency > 100 {
            return Err(ScrollError::Config(
                "scan.concurrency is unreasonably large (> 100)".into(),
            ));
        }
        self.timezone()?;
        Ok(())
    }

    fn validate_marker(&self) -> Result<(), ScrollError> {
        let m = &self.marker;
        let custom = self.custom_marker_id()?;
        if m.unicode.trim().is_empty() && custom.is_none() {
            return Err(ScrollError::Config(
                "marker.unicode and marker.customEmoji are both empty".into(),
            ));
        }
        if !m.literal_enabled() && !m.phrase.enabled {
            return Err(ScrollError::Config(
                "marker.literal and marker.phrase.enabled are both off; nothing can match".into(),
            ));
        }
        if m.phrase.enabled && m.literal_enabled() {
            warn!(
                "marker.literal and marker.phrase.enabled are both on; scheduled runs will \
                 report phrases for any date or slot"
            );
        }
        if m.phrase.enabled {
            let kw = m.phrase.keyword.trim();
            if kw.is_empty() || kw.chars().any(char::is_whitespace) {
                return Err(ScrollError::Config(
                    "marker.phrase.keyword must be a single non-empty word".into(),
                ));
            }
        }
        Ok(())
    }

    fn validate_ack(&self) -> Result<(), ScrollError> {
        self.acknowledger_ids()?;
        self.checkmark()?;
        Ok(())
    }

    fn validate_filters(&self) -> Result<(), ScrollError> {
        for (name, preset) in &self.filters.presets {
            preset.to_filter(name)?;
        }
        if let Some(default) = &self.filters.default_preset
            && !self.filters.presets.contains_key(default)
        {
            return Err(ScrollError::Config(format!(
                "filters.defaultPreset '{}' is not defined in filters.presets",
                default
            )));
        }
        Ok(())
    }

    fn validate_retry(&self) -> Result<(), ScrollError> {
        let r = &self.retry;
        if r.timeout_secs == 0 {
            return Err(ScrollError::Config("retry.timeoutSecs must be > 0".into()));
        }
        if r.max_retries > 10 {
            return Err(ScrollError::Config(
                "retry.maxRetries is unreasonably large (> 10)".into(),
            ));
        }
        if r.backoff_multiplier.is_nan()
            || r.backoff_multiplier.is_infinite()
            || r.backoff_multiplier < 1.0
        {
            return Err(ScrollError::Config(
                "retry.backoffMultiplier must be a finite number >= 1.0".into(),
            ));
        }
        if r.initial_delay_ms > r.max_delay_ms {
            return Err(ScrollError::Config(
                "retry.initialDelayMs must not exceed retry.maxDelayMs".into(),
            ));
        }
        Ok(())
    }

    pub fn guild_id(&self) -> Result<u64, ScrollError> {
        parse_required_id("discord.guildId", &self.discord.guild_id)
    }

    pub fn report_channel_id(&self) -> Result<u64, ScrollError> {
        parse_required_id("discord.reportChannelId", &self.discord.report_channel_id)
    }

    /// Acknowledger ids, de-duplicated in first-seen order. Empty is an error.
    pub fn acknowledger_ids(&self) -> Result<Vec<u64>, ScrollError> {
        let ids = parse_ids("ack.userIds", &self.ack.user_ids)?;
        if ids.is_empty() {
            return Err(ScrollError::Config(
                "ack.userIds is empty; provide at least one user id (or SCROLLCHECK_ACK_USER_IDS)"
                    .into(),
            ));
        }
        Ok(ids)
    }

    pub fn checkmark(&self) -> Result<EmojiIdentity, ScrollError> {
        self.ack
            .checkmark
            .parse()
            .map_err(|e| ScrollError::Config(format!("ack.checkmark: {}", e)))
    }

    pub fn custom_marker_id(&self) -> Result<Option<u64>, ScrollError> {
        let raw = self.marker.custom_emoji.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<EmojiIdentity>() {
            Ok(EmojiIdentity::Custom(id)) => Ok(Some(id)),
            Ok(EmojiIdentity::Unicode(_)) => Err(ScrollError::Config(format!(
                "marker.customEmoji '{}' is not a custom emoji id or <:name:id> reference",
                raw
            ))),
            Err(e) => Err(ScrollError::Config(format!("marker.customEmoji: {}", e))),
        }
    }

    pub fn timezone(&self) -> Result<Tz, ScrollError> {
        self.scan.timezone.parse::<Tz>().map_err(|_| {
            ScrollError::Config(format!(
                "scan.timezone '{}' is not a known IANA timezone",
                self.scan.timezone
            ))
        })
    }
}

fn parse_required_id(field: &str, raw: &str) -> Result<u64, ScrollError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScrollError::Config(format!("{} is not set", field)));
    }
    raw.parse::<u64>()
        .map_err(|_| ScrollError::Config(format!("{} '{}' is not a numeric id", field, raw)))
}

/// Parse an id list, rejecting non-integer entries and dropping duplicates while
/// keeping first-seen order. Blank entries are ignored.
pub fn parse_ids(field: &str, raw: &[String]) -> Result<Vec<u64>, ScrollError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(raw.len());
    for entry in raw {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let id = entry.parse::<u64>().map_err(|_| {
            ScrollError::Config(format!("{} contains a non-integer entry: '{}'", field, entry))
        })?;
        if seen.insert(id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
