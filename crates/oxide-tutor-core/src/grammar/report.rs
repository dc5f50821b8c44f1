//! Grammar report formatting
//!
//! Reports use Telegram's legacy Markdown. The flagged span, the replacement
//! and the checker's message are inserted verbatim: a `*`, `_` or backtick in
//! the user's text can unbalance the markup and make Telegram reject the
//! message. Callers log that failure and carry on with the relay.

use super::GrammarMatch;
use crate::utils::char_span;

/// First line of every report
pub const REPORT_HEADER: &str = "✏️ *Language check:*\n\n";
/// Shown when the checker offers no replacement
pub const NO_REPLACEMENT: &str = "—";

/// Formats one finding against the text it was found in.
#[must_use]
pub fn format_entry(text: &str, finding: &GrammarMatch) -> String {
    let flagged = char_span(text, finding.offset, finding.length);
    let replacement = finding.first_replacement().unwrap_or(NO_REPLACEMENT);
    format!(
        "🔸 *{flagged}* → *{replacement}*\n_{message}_\n\n",
        message = finding.message
    )
}

/// Builds the full report, or `None` when there is nothing to report.
///
/// # Examples
///
/// ```
/// use oxide_tutor_core::grammar::GrammarMatch;
/// use oxide_tutor_core::grammar::report::build_report;
///
/// let found = [GrammarMatch::new(2, 3, "Subject-verb agreement", &["have"])];
/// let report = build_report("I has a apple", &found).unwrap_or_default();
/// assert!(report.contains("🔸 *has* → *have*"));
/// assert!(build_report("Fine.", &[]).is_none());
/// ```
#[must_use]
pub fn build_report(text: &str, matches: &[GrammarMatch]) -> Option<String> {
    if matches.is_empty() {
        return None;
    }
    let mut report = String::from(REPORT_HEADER);
    for finding in matches {
        report.push_str(&format_entry(text, finding));
    }
    Some(report)
}

/// Builds the report split into messages of at most `max_chars` characters.
///
/// Splits only between entries so no part ends inside a Markdown span. An
/// entry that alone exceeds the limit gets a part of its own.
#[must_use]
pub fn build_report_parts(text: &str, matches: &[GrammarMatch], max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    if matches.is_empty() {
        return parts;
    }

    let mut current = String::from(REPORT_HEADER);
    let mut current_len = REPORT_HEADER.chars().count();
    let mut entries_in_current = 0usize;

    for finding in matches {
        let entry = format_entry(text, finding);
        let entry_len = entry.chars().count();
        if entries_in_current > 0 && current_len + entry_len > max_chars {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
            entries_in_current = 0;
        }
        current.push_str(&entry);
        current_len += entry_len;
        entries_in_current += 1;
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apple_scenario() {
        let found = [GrammarMatch::new(2, 3, "Subject-verb agreement", &["have"])];
        let report = build_report("I has a apple", &found);
        assert_eq!(
            report.as_deref(),
            Some("✏️ *Language check:*\n\n🔸 *has* → *have*\n_Subject-verb agreement_\n\n")
        );
    }

    #[test]
    fn missing_replacement_uses_dash() {
        let entry = format_entry("teh cat", &GrammarMatch::new(0, 3, "Possible typo", &[]));
        assert_eq!(entry, "🔸 *teh* → *—*\n_Possible typo_\n\n");
    }

    #[test]
    fn out_of_range_offsets_do_not_panic() {
        let entry = format_entry("short", &GrammarMatch::new(40, 3, "Odd", &["x"]));
        assert_eq!(entry, "🔸 ** → *x*\n_Odd_\n\n");
    }

    #[test]
    fn parts_split_between_entries() {
        let text = "word ".repeat(200);
        let message = "A rather long explanation of the issue";
        let found: Vec<_> = (0..100)
            .map(|i| GrammarMatch::new(i * 5, 4, message, &["term"]))
            .collect();

        let parts = build_report_parts(&text, &found, 500);
        assert!(parts.len() > 1);
        assert!(parts[0].starts_with(REPORT_HEADER));
        assert!(parts.iter().all(|p| p.chars().count() <= 500));
        assert!(parts.iter().all(|p| p.ends_with("_\n\n")));

        let entries: usize = parts.iter().map(|p| p.matches("🔸").count()).sum();
        assert_eq!(entries, 100);
        assert_eq!(parts.concat(), build_report(&text, &found).unwrap_or_default());
    }

    #[test]
    fn no_matches_no_parts() {
        assert!(build_report_parts("ok", &[], 4000).is_empty());
    }
}
