use crate::model::MatchResult;

/// Link buttons per posted message (5 rows of 5).
pub const MAX_BUTTONS_PER_BATCH: usize = 25;
pub const BUTTONS_PER_ROW: usize = 5;
/// Longest button label the platform accepts.
pub const LABEL_MAX_CHARS: usize = 80;

pub const REPORT_TITLE: &str = "Unacknowledged scrolls";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportIntro {
    pub title: String,
    pub description: String,
    pub footer: Option<String>,
}

/// A formatted report: one intro message followed by batches of link buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub intro: ReportIntro,
    pub batches: Vec<Vec<LinkButton>>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    /// Splits a batch into button rows.
    pub fn rows(batch: &[LinkButton]) -> impl Iterator<Item = &[LinkButton]> {
        batch.chunks(BUTTONS_PER_ROW)
    }
}

/// Turns match results into a [`Report`].
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    /// Scan window as shown to readers, e.g. `24 hours` or `30m`.
    window: String,
}

impl ReportFormatter {
    pub fn new(window: impl Into<String>) -> Self {
        Self {
            window: window.into(),
        }
    }

    pub fn format(&self, matches: &[MatchResult]) -> Report {
        if matches.is_empty() {
            return Report {
                intro: ReportIntro {
                    title: REPORT_TITLE.to_string(),
                    description: format!("No matching messages in the last {}. 🎉", self.window),
                    footer: None,
                },
                batches: Vec::new(),
            };
        }

        let buttons: Vec<LinkButton> = matches
            .iter()
            .map(|m| LinkButton {
                label: button_label(m),
                url: m.jump_url(),
            })
            .collect();

        Report {
            intro: ReportIntro {
                title: REPORT_TITLE.to_string(),
                description: format!(
                    "Tap a button to jump to a message. Window: last {}.",
                    self.window
                ),
                footer: Some(format!("Total: {}", matches.len())),
            },
            batches: buttons
                .chunks(MAX_BUTTONS_PER_BATCH)
                .map(<[LinkButton]>::to_vec)
                .collect(),
        }
    }
}

/// `#channel · HH:MM • preview`, cut to fit [`LABEL_MAX_CHARS`].
pub fn button_label(m: &MatchResult) -> String {
    let label = format!(
        "#{} · {} • {}",
        m.channel_name,
        m.created_at.format("%H:%M"),
        m.preview
    );
    if label.chars().count() <= LABEL_MAX_CHARS {
        return label;
    }
    let mut cut: String = label.chars().take(LABEL_MAX_CHARS - 3).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests;
