use oxide_tutor_core::grammar::report::{build_report, build_report_parts, REPORT_HEADER};
use oxide_tutor_core::grammar::GrammarMatch;
use oxide_tutor_core::utils::char_span;
use proptest::prelude::*;

fn findings_for(text_len: usize) -> impl Strategy<Value = Vec<GrammarMatch>> {
    let raw_finding = (
        0..text_len,
        0..8usize,
        "[A-Za-z ]{1,30}",
        prop::option::of("[a-z]{1,10}"),
    );
    prop::collection::vec(raw_finding, 1..20)
        .prop_map(|raw| {
            raw.into_iter()
                .map(|(offset, length, message, replacement)| match replacement {
                    Some(r) => GrammarMatch::new(offset, length, &message, &[r.as_str()]),
                    None => GrammarMatch::new(offset, length, &message, &[]),
                })
                .collect()
        })
}

proptest! {
    /// Slicing never panics, whatever the checker reports.
    #[test]
    fn char_span_does_not_crash(s in "\\PC*", offset in 0..200usize, length in 0..200usize) {
        let span = char_span(&s, offset, length);
        prop_assert!(s.contains(span));
        prop_assert!(span.chars().count() <= length);
    }

    /// One entry per finding, each quoting the flagged span.
    #[test]
    fn report_has_one_entry_per_match(
        (text, found) in "[a-z ]{1,80}".prop_flat_map(|text| {
            let len = text.chars().count();
            (Just(text), findings_for(len))
        })
    ) {
        let report = build_report(&text, &found).unwrap_or_default();
        prop_assert!(report.starts_with(REPORT_HEADER));

        let entries: Vec<&str> = report[REPORT_HEADER.len()..]
            .split("🔸 ")
            .filter(|e| !e.is_empty())
            .collect();
        prop_assert_eq!(entries.len(), found.len());

        for (entry, finding) in entries.iter().zip(&found) {
            let span = char_span(&text, finding.offset, finding.length);
            let expected = format!("*{span}* → *");
            prop_assert!(
                entry.starts_with(&expected),
                "entry {:?} does not quote {:?}",
                entry,
                span
            );
            let expected_message = format!("_{}_", finding.message);
            prop_assert!(entry.contains(&expected_message));
        }
    }

    /// Splitting keeps every entry and never exceeds the limit.
    #[test]
    fn report_parts_keep_all_entries(
        (text, found) in "[a-z ]{1,80}".prop_flat_map(|text| {
            let len = text.chars().count();
            (Just(text), findings_for(len))
        }),
        limit in 120..400usize
    ) {
        let parts = build_report_parts(&text, &found, limit);
        prop_assert!(parts.iter().all(|p| p.chars().count() <= limit));
        prop_assert_eq!(parts.concat(), build_report(&text, &found).unwrap_or_default());
    }
}
