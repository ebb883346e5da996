use crate::errors::{ScrollError, ScrollResult};
use crate::model::{EmojiIdentity, Message, Reactors};
use std::collections::BTreeSet;

/// Who may clear a scroll, and with which emoji.
///
/// A message is acknowledged when its checkmark reaction includes at least one
/// acknowledger. Reactions known only by count never acknowledge anything: an
/// anonymous reaction cannot prove an authorized user reacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckPolicy {
    checkmark: EmojiIdentity,
    acknowledgers: BTreeSet<u64>,
}

impl AckPolicy {
    /// Fails with a configuration error when `acknowledgers` is empty.
    pub fn new(
        checkmark: EmojiIdentity,
        acknowledgers: impl IntoIterator<Item = u64>,
    ) -> ScrollResult<Self> {
        let acknowledgers: BTreeSet<u64> = acknowledgers.into_iter().collect();
        if acknowledgers.is_empty() {
            return Err(ScrollError::Config(
                "acknowledger id set is empty; provide at least one user id".into(),
            ));
        }
        Ok(Self {
            checkmark,
            acknowledgers,
        })
    }

    pub fn checkmark(&self) -> &EmojiIdentity {
        &self.checkmark
    }

    pub fn is_acknowledged(&self, message: &Message) -> bool {
        message
            .reactions
            .iter()
            .filter(|r| r.emoji == self.checkmark)
            .any(|r| match &r.reactors {
                Reactors::Known(ids) => !ids.is_disjoint(&self.acknowledgers),
                Reactors::CountOnly(_) => false,
            })
    }

    /// True when the checkmark reaction exists but its reactors are unknown, so
    /// resolving them could change the outcome.
    pub fn needs_reactor_lookup(&self, message: &Message) -> bool {
        message
            .reaction(&self.checkmark)
            .is_some_and(|r| matches!(r.reactors, Reactors::CountOnly(n) if n > 0))
    }
}
