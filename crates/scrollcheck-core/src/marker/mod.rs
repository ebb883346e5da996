pub mod phrase;

use crate::context::{RunTrigger, ScanContext};
use crate::model::{EmojiIdentity, Message, custom_emoji_ids};
use phrase::Phrase;
use tracing::trace;

/// Scroll phrase settings. The phrase is `<marker> <keyword> <month> <day> <slot>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSpec {
    pub keyword: String,
}

/// What counts as a scroll marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpec {
    /// Unicode scroll, compared without U+FE0F.
    pub unicode: String,
    pub custom_id: Option<u64>,
    /// Match the marker anywhere in the body or embed text.
    pub literal: bool,
    /// Match a leading, date-gated phrase.
    pub phrase: Option<PhraseSpec>,
}

impl Default for MarkerSpec {
    fn default() -> Self {
        Self {
            unicode: "📜".to_string(),
            custom_id: None,
            literal: true,
            phrase: None,
        }
    }
}

/// Decides whether a message carries a qualifying scroll marker.
#[derive(Debug, Clone)]
pub struct MarkerMatcher {
    spec: MarkerSpec,
}

impl MarkerMatcher {
    pub fn new(mut spec: MarkerSpec) -> Self {
        if let EmojiIdentity::Unicode(normalized) = EmojiIdentity::unicode(&spec.unicode) {
            spec.unicode = normalized;
        }
        Self { spec }
    }

    pub fn matches(&self, message: &Message, ctx: &ScanContext) -> bool {
        if self.spec.literal && self.literal_match(message) {
            trace!("message {} matched literal marker", message.id);
            return true;
        }
        if let Some(spec) = &self.spec.phrase
            && let Some(phrase) = self.parse_phrase(&message.body, spec)
        {
            let accepted = gate(&phrase, ctx);
            trace!(
                "message {} has phrase {:?}, accepted for {}: {}",
                message.id, phrase, ctx.trigger, accepted
            );
            return accepted;
        }
        false
    }

    /// True when the body or any embed text contains the marker.
    pub fn literal_match(&self, message: &Message) -> bool {
        std::iter::once(message.body.as_str())
            .chain(message.embed_texts.iter().map(String::as_str))
            .any(|text| self.text_contains_marker(text))
    }

    fn text_contains_marker(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if !self.spec.unicode.is_empty() && text.contains(self.spec.unicode.as_str()) {
            return true;
        }
        self.spec
            .custom_id
            .is_some_and(|id| custom_emoji_ids(text).any(|found| found == id))
    }

    fn parse_phrase(&self, body: &str, spec: &PhraseSpec) -> Option<Phrase> {
        let rest = self.strip_leading_marker(body.trim_start())?;
        phrase::parse_after_marker(rest, &spec.keyword)
    }

    /// Removes a leading unicode or custom marker, returning the remainder.
    fn strip_leading_marker<'a>(&self, text: &'a str) -> Option<&'a str> {
        if !self.spec.unicode.is_empty()
            && let Some(rest) = text.strip_prefix(self.spec.unicode.as_str())
        {
            return Some(rest.strip_prefix('\u{FE0F}').unwrap_or(rest));
        }
        let id = self.spec.custom_id?;
        let end = text.strip_prefix('<')?.find('>')? + 2;
        match text[..end].parse::<EmojiIdentity>() {
            Ok(EmojiIdentity::Custom(found)) if found == id => Some(&text[end..]),
            _ => None,
        }
    }
}

/// Scheduled runs accept only today's phrase for their own slot; manual runs accept any.
fn gate(phrase: &Phrase, ctx: &ScanContext) -> bool {
    match ctx.trigger {
        RunTrigger::Manual => true,
        RunTrigger::Scheduled(slot) => phrase.slot == slot && phrase.is_on(ctx.today),
    }
}

#[cfg(test)]
mod tests;
