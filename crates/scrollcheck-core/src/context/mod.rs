use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Which half of the day a scheduled run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Morning,
    Evening,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
        }
    }

    /// Parses a slot keyword, ignoring case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("morning") {
            Some(Self::Morning)
        } else if word.eq_ignore_ascii_case("evening") {
            Some(Self::Evening)
        } else {
            None
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What started this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunTrigger {
    /// A scheduled run for one slot. Phrase markers must name today and this slot.
    Scheduled(Slot),
    /// An on-demand run. Phrase markers are accepted regardless of date or slot.
    Manual,
}

impl FromStr for RunTrigger {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("manual") {
            return Ok(Self::Manual);
        }
        Slot::from_keyword(s).map(Self::Scheduled).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown run trigger '{}' (expected morning, evening or manual)",
                s
            )
        })
    }
}

impl fmt::Display for RunTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled(slot) => write!(f, "{}", slot),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Immutable per-run state handed to the matcher and the scanner, so nothing deeper
/// in the engine reads the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanContext {
    pub now: DateTime<Utc>,
    /// Calendar date used for phrase gating, already shifted into the configured timezone.
    pub today: NaiveDate,
    pub trigger: RunTrigger,
}

impl ScanContext {
    pub fn new(now: DateTime<Utc>, today: NaiveDate, trigger: RunTrigger) -> Self {
        Self {
            now,
            today,
            trigger,
        }
    }

    /// Context whose calendar date is taken from `now` in UTC.
    pub fn utc(now: DateTime<Utc>, trigger: RunTrigger) -> Self {
        Self::new(now, now.date_naive(), trigger)
    }
}
