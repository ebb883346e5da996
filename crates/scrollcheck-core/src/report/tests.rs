use super::*;
use chrono::{TimeZone, Utc};

fn result(i: u64, preview: &str) -> MatchResult {
    MatchResult {
        guild_id: 1,
        channel_id: 2,
        channel_name: "orders".to_string(),
        message_id: 100 + i,
        created_at: Utc.with_ymd_and_hms(2024, 12, 12, 7, 5, 0).unwrap(),
        preview: preview.to_string(),
    }
}

#[test]
fn test_empty_report() {
    let report = ReportFormatter::new("24 hours").format(&[]);
    assert_eq!(report.intro.title, REPORT_TITLE);
    assert_eq!(
        report.intro.description,
        "No matching messages in the last 24 hours. 🎉"
    );
    assert!(report.intro.footer.is_none());
    assert!(report.batches.is_empty());
    assert_eq!(report.total(), 0);
}

#[test]
fn test_label_format() {
    assert_eq!(button_label(&result(0, "📜 hi")), "#orders · 07:05 • 📜 hi");
}

#[test]
fn test_label_truncated() {
    let label = button_label(&result(0, &"x".repeat(200)));
    assert_eq!(label.chars().count(), LABEL_MAX_CHARS - 2);
    assert!(label.ends_with('…'));
}

#[test]
fn test_batches_of_25() {
    let matches: Vec<MatchResult> = (0..60).map(|i| result(i, "p")).collect();
    let report = ReportFormatter::new("12 hours").format(&matches);
    let sizes: Vec<usize> = report.batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![25, 25, 10]);
    assert_eq!(report.total(), 60);
    assert_eq!(report.intro.footer.as_deref(), Some("Total: 60"));
    assert!(report.intro.description.contains("last 12 hours"));
}

#[test]
fn test_order_and_urls_preserved() {
    let matches: Vec<MatchResult> = (0..3).map(|i| result(i, "p")).collect();
    let report = ReportFormatter::new("24 hours").format(&matches);
    let urls: Vec<&str> = report.batches[0].iter().map(|b| b.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://discord.com/channels/1/2/100",
            "https://discord.com/channels/1/2/101",
            "https://discord.com/channels/1/2/102",
        ]
    );
}

#[test]
fn test_rows_of_five() {
    let matches: Vec<MatchResult> = (0..12).map(|i| result(i, "p")).collect();
    let report = ReportFormatter::new("24 hours").format(&matches);
    let rows: Vec<usize> = Report::rows(&report.batches[0]).map(<[_]>::len).collect();
    assert_eq!(rows, vec![5, 5, 2]);
}

#[test]
fn test_sub_hour_window_described() {
    let report = ReportFormatter::new("30m").format(&[]);
    assert_eq!(
        report.intro.description,
        "No matching messages in the last 30m. 🎉"
    );
    let report = ReportFormatter::new("30m").format(&[result(0, "p")]);
    assert!(report.intro.description.ends_with("Window: last 30m."));
}
