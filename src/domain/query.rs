//! Read-only views over a snapshot: search and summary counts

use chrono::NaiveDate;
use serde::Serialize;

use super::expiry::ExpiryStatus;
use super::record::Record;

/// Records with this quantity or less count as low stock
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub expired: usize,
    pub expiring_soon: usize,
    pub low_stock: usize,
}

/// Computes the summary counts as of `today`
pub fn summarize(records: &[Record], today: NaiveDate) -> Summary {
    records.iter().fold(
        Summary {
            total: records.len(),
            ..Summary::default()
        },
        |mut acc, record| {
            match record.status(today) {
                ExpiryStatus::Expired => acc.expired += 1,
                s if s.is_expiring_soon() => acc.expiring_soon += 1,
                _ => {}
            }
            if record.quantity <= LOW_STOCK_THRESHOLD {
                acc.low_stock += 1;
            }
            acc
        },
    )
}

/// Returns true if any searchable field contains `term` (case-insensitive)
pub fn matches(record: &Record, term: &str) -> bool {
    let needle = term.to_lowercase();
    needle.is_empty()
        || record
            .searchable_fields()
            .any(|f| f.to_lowercase().contains(&needle))
}

/// Filters by `term` and orders by expiration date.
///
/// Dated records come first, earliest expiration first. Undated records
/// follow in their original order.
pub fn search(records: &[Record], term: &str) -> Vec<Record> {
    let mut results: Vec<Record> = records
        .iter()
        .filter(|r| matches(r, term))
        .cloned()
        .collect();
    sort_by_expiration(&mut results);
    results
}

/// Stable sort by expiration date with undated records last
pub fn sort_by_expiration(records: &mut [Record]) {
    records.sort_by(|a, b| match (a.expiration_date, b.expiration_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordFields, RecordId};
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn record(name: &str, quantity: u32, days: Option<i64>) -> Record {
        let fields = RecordFields {
            quantity: Some(quantity),
            expiration_date: days.map(|d| today() + Duration::days(d)),
            ..RecordFields::named(name)
        };
        Record::new(RecordId::generate(name, Utc::now()), "user_main", fields).unwrap()
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn single_record_scenario() {
        let records = vec![record("Dipirona", 5, Some(10))];
        let summary = summarize(&records, today());

        assert_eq!(
            summary,
            Summary {
                total: 1,
                expired: 0,
                expiring_soon: 1,
                low_stock: 1,
            }
        );
        assert_eq!(records[0].status(today()), ExpiryStatus::ExpiringWithin30);
    }

    #[test]
    fn summary_counts_each_axis() {
        let records = vec![
            record("A", 50, Some(-1)),
            record("B", 10, Some(0)),
            record("C", 11, Some(90)),
            record("D", 0, Some(91)),
            record("E", 100, None),
        ];
        let summary = summarize(&records, today());

        assert_eq!(summary.total, 5);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.expiring_soon, 2);
        assert_eq!(summary.low_stock, 2);
        assert!(summary.expired <= summary.total);
        assert!(summary.expiring_soon <= summary.total);
    }

    #[test]
    fn empty_summary() {
        assert_eq!(summarize(&[], today()), Summary::default());
    }

    #[test]
    fn empty_term_returns_all_sorted() {
        let records = vec![
            record("NoDate1", 1, None),
            record("Late", 1, Some(200)),
            record("NoDate2", 1, None),
            record("Early", 1, Some(-5)),
            record("Middle", 1, Some(40)),
        ];

        let results = search(&records, "");
        assert_eq!(
            names(&results),
            vec!["Early", "Middle", "Late", "NoDate1", "NoDate2"]
        );
    }

    #[test]
    fn search_is_case_insensitive_and_idempotent() {
        let mut aspirin = record("Aspirina", 1, Some(3));
        aspirin.active_ingredient = Some("ASA".to_string());
        let records = vec![aspirin, record("Dipirona", 1, None)];

        let upper = search(&records, "ASA");
        let lower = search(&records, "asa");

        assert_eq!(upper, lower);
        assert_eq!(names(&upper), vec!["Aspirina"]);
        assert_eq!(search(&records, "asa"), lower);
    }

    #[test]
    fn search_covers_every_field_but_mechanism() {
        let mut r = record("Losartana", 1, None);
        r.office_number = Some("Sala 7".to_string());
        r.barcode = Some("7891058".to_string());
        r.mechanism_of_action = Some("Bloqueio AT1".to_string());
        let records = vec![r];

        assert_eq!(search(&records, "sala").len(), 1);
        assert_eq!(search(&records, "1058").len(), 1);
        assert!(search(&records, "AT1").is_empty());
    }

    #[test]
    fn search_does_not_mutate_input() {
        let records = vec![record("B", 1, None), record("A", 1, Some(1))];
        let before = records.clone();
        let _ = search(&records, "");
        assert_eq!(records, before);
    }

    proptest! {
        #[test]
        fn summary_counts_never_exceed_total(
            items in prop::collection::vec((0u32..50, prop::option::of(-400i64..400)), 0..40)
        ) {
            let records: Vec<Record> = items
                .iter()
                .enumerate()
                .map(|(i, (quantity, days))| record(&format!("R{}", i), *quantity, *days))
                .collect();
            let summary = summarize(&records, today());

            prop_assert_eq!(summary.total, records.len());
            prop_assert!(summary.expired <= summary.total);
            prop_assert!(summary.expiring_soon <= summary.total);
            prop_assert!(summary.expired + summary.expiring_soon <= summary.total);
            prop_assert!(summary.low_stock <= summary.total);
        }
    }
}
