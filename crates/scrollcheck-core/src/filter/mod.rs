use crate::model::Channel;
use std::collections::HashSet;

/// Allow/exclude rules deciding which channels and threads get scanned.
///
/// Names are compared case-insensitively and exactly (no substring matching). An
/// excluded name always wins over any allow rule. With no allow rule configured,
/// every channel that is not excluded is eligible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    allow_ids: HashSet<u64>,
    allow_categories: HashSet<u64>,
    allow_names: HashSet<String>,
    exclude_names: HashSet<String>,
}

impl ChannelFilter {
    pub fn new(
        allow_ids: impl IntoIterator<Item = u64>,
        allow_categories: impl IntoIterator<Item = u64>,
        allow_names: impl IntoIterator<Item = impl AsRef<str>>,
        exclude_names: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            allow_ids: allow_ids.into_iter().collect(),
            allow_categories: allow_categories.into_iter().collect(),
            allow_names: normalize_names(allow_names),
            exclude_names: normalize_names(exclude_names),
        }
    }

    pub fn has_allow_rules(&self) -> bool {
        !(self.allow_ids.is_empty()
            && self.allow_categories.is_empty()
            && self.allow_names.is_empty())
    }

    pub fn is_excluded(&self, channel: &Channel) -> bool {
        self.exclude_names.contains(&normalize_name(&channel.name))
    }

    pub fn is_eligible(&self, channel: &Channel) -> bool {
        if self.is_excluded(channel) {
            return false;
        }
        if !self.has_allow_rules() {
            return true;
        }
        self.allow_ids.contains(&channel.id)
            || channel
                .category_id
                .is_some_and(|c| self.allow_categories.contains(&c))
            || self.allow_names.contains(&normalize_name(&channel.name))
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().trim_start_matches('#').to_lowercase()
}

fn normalize_names(names: impl IntoIterator<Item = impl AsRef<str>>) -> HashSet<String> {
    names
        .into_iter()
        .map(|n| normalize_name(n.as_ref()))
        .filter(|n| !n.is_empty())
        .collect()
}
