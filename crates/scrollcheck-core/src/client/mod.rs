use crate::errors::ScrollResult;
use crate::model::{Channel, EmojiIdentity, Message, TimeWindow};
use crate::report::{LinkButton, ReportIntro};
use async_trait::async_trait;

/// Read side of the chat platform.
///
/// Implementations must report unreadable channels as [`ScrollError::Permission`]
/// and retryable failures (rate limits, timeouts, resets) as
/// [`ScrollError::Transient`], so the scanner can tell them apart.
///
/// [`ScrollError::Permission`]: crate::errors::ScrollError::Permission
/// [`ScrollError::Transient`]: crate::errors::ScrollError::Transient
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Every text channel and thread in the guild, archived public threads included.
    /// Thread entries carry their parent's category.
    async fn list_channels(&self, guild_id: u64) -> ScrollResult<Vec<Channel>>;

    /// Messages in `channel` created inside `window`, in any order. Reactions may be
    /// reported as counts only.
    async fn fetch_history(&self, channel: &Channel, window: TimeWindow)
    -> ScrollResult<Vec<Message>>;

    /// User ids that reacted to a message with `emoji`.
    async fn resolve_reactors(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &EmojiIdentity,
    ) -> ScrollResult<Vec<u64>>;
}

/// Write side of the chat platform. A report is posted as its intro followed by one
/// message per button batch, so a failure part-way leaves earlier messages delivered.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn post_intro(&self, destination: u64, intro: &ReportIntro) -> ScrollResult<()>;

    async fn post_batch(&self, destination: u64, batch: &[LinkButton]) -> ScrollResult<()>;
}
