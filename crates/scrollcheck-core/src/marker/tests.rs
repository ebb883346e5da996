use super::*;
use crate::context::Slot;
use chrono::{NaiveDate, TimeZone, Utc};

fn message(body: &str) -> Message {
    Message {
        id: 1,
        channel_id: 10,
        author_id: 20,
        author_is_bot: false,
        body: body.to_string(),
        embed_texts: vec![],
        created_at: Utc.with_ymd_and_hms(2024, 12, 12, 17, 0, 0).unwrap(),
        reactions: vec![],
    }
}

fn ctx(trigger: RunTrigger) -> ScanContext {
    ScanContext::new(
        Utc.with_ymd_and_hms(2024, 12, 12, 18, 0, 0).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 12).unwrap(),
        trigger,
    )
}

fn phrase_only() -> MarkerMatcher {
    MarkerMatcher::new(MarkerSpec {
        literal: false,
        phrase: Some(PhraseSpec {
            keyword: "delivery".to_string(),
        }),
        ..MarkerSpec::default()
    })
}

const EVENING: RunTrigger = RunTrigger::Scheduled(Slot::Evening);

#[test]
fn test_empty_body_never_matches() {
    let m = MarkerMatcher::new(MarkerSpec::default());
    assert!(!m.matches(&message(""), &ctx(RunTrigger::Manual)));
    assert!(!m.matches(&message("   \n\t"), &ctx(RunTrigger::Manual)));
    assert!(!phrase_only().matches(&message(""), &ctx(RunTrigger::Manual)));
}

#[test]
fn test_body_equal_to_marker_matches() {
    let m = MarkerMatcher::new(MarkerSpec::default());
    assert!(m.matches(&message("📜"), &ctx(RunTrigger::Manual)));
}

#[test]
fn test_literal_anywhere_in_body() {
    let m = MarkerMatcher::new(MarkerSpec::default());
    assert!(m.matches(&message("new order 📜 for table 4"), &ctx(EVENING)));
    assert!(!m.matches(&message("new order for table 4"), &ctx(EVENING)));
}

#[test]
fn test_literal_with_variation_selector_in_marker() {
    let m = MarkerMatcher::new(MarkerSpec {
        unicode: "📜\u{FE0F}".to_string(),
        ..MarkerSpec::default()
    });
    assert!(m.matches(&message("📜 hi"), &ctx(RunTrigger::Manual)));
}

#[test]
fn test_literal_custom_emoji_by_id() {
    let m = MarkerMatcher::new(MarkerSpec {
        custom_id: Some(4242),
        ..MarkerSpec::default()
    });
    assert!(m.matches(&message("look <:scroll:4242>"), &ctx(EVENING)));
    assert!(m.matches(&message("look <a:any_name:4242>"), &ctx(EVENING)));
    assert!(!m.matches(&message("look <:scroll:4243>"), &ctx(EVENING)));
}

#[test]
fn test_literal_checks_embeds() {
    let m = MarkerMatcher::new(MarkerSpec::default());
    let mut msg = message("");
    msg.embed_texts = vec!["Order".to_string(), "📜 pending".to_string()];
    assert!(m.matches(&msg, &ctx(RunTrigger::Manual)));
}

#[test]
fn test_literal_disabled_ignores_inline_marker() {
    assert!(!phrase_only().matches(&message("hello 📜"), &ctx(RunTrigger::Manual)));
}

#[test]
fn test_phrase_today_evening_matches() {
    assert!(phrase_only().matches(&message("📜 delivery dec 12 evening"), &ctx(EVENING)));
}

#[test]
fn test_phrase_other_day_rejected() {
    assert!(!phrase_only().matches(&message("📜 delivery dec 13 evening"), &ctx(EVENING)));
}

#[test]
fn test_phrase_case_and_format_insensitive() {
    assert!(phrase_only().matches(&message("📜 Delivery December 12 Evening"), &ctx(EVENING)));
}

#[test]
fn test_phrase_wrong_slot_rejected() {
    assert!(!phrase_only().matches(&message("📜 delivery dec 12 morning"), &ctx(EVENING)));
    assert!(phrase_only().matches(
        &message("📜 delivery dec 12 morning"),
        &ctx(RunTrigger::Scheduled(Slot::Morning))
    ));
}

#[test]
fn test_phrase_manual_run_bypasses_gate() {
    assert!(phrase_only().matches(&message("📜 delivery jan 1 morning"), &ctx(RunTrigger::Manual)));
}

#[test]
fn test_phrase_manual_still_requires_syntax() {
    assert!(!phrase_only().matches(&message("📜 delivery someday"), &ctx(RunTrigger::Manual)));
}

#[test]
fn test_phrase_leading_whitespace_and_padding() {
    assert!(!phrase_only().matches(&message("  \n📜delivery   dec  012 evening"), &ctx(EVENING)));
    assert!(phrase_only().matches(&message("  \n📜delivery   dec  12 evening"), &ctx(EVENING)));
}

#[test]
fn test_phrase_requires_leading_marker() {
    assert!(!phrase_only().matches(&message("delivery dec 12 evening 📜"), &ctx(EVENING)));
    assert!(!phrase_only().matches(&message("re: 📜 delivery dec 12 evening"), &ctx(EVENING)));
}

#[test]
fn test_phrase_with_custom_marker() {
    let m = MarkerMatcher::new(MarkerSpec {
        custom_id: Some(77),
        literal: false,
        phrase: Some(PhraseSpec {
            keyword: "delivery".to_string(),
        }),
        ..MarkerSpec::default()
    });
    assert!(m.matches(&message("<:scroll:77> delivery dec 12 evening"), &ctx(EVENING)));
    assert!(!m.matches(&message("<:scroll:78> delivery dec 12 evening"), &ctx(EVENING)));
    assert!(!m.matches(&message("<x<:scroll:77> delivery dec 12 evening"), &ctx(EVENING)));
}

#[test]
fn test_either_mode_qualifies() {
    let m = MarkerMatcher::new(MarkerSpec {
        phrase: Some(PhraseSpec {
            keyword: "delivery".to_string(),
        }),
        ..MarkerSpec::default()
    });
    // The phrase is for another day, but the literal marker is present
    assert!(m.matches(&message("📜 delivery dec 13 evening"), &ctx(EVENING)));
}
