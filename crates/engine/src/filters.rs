//! Pure filtering of a transaction list.
//!
//! Every function returns an order-preserving subsequence of its input. The
//! pipeline in [`apply`] always runs date, then type, then search.

use api_types::transaction::{SalesType, Transaction};
use chrono::{DateTime, Utc};

use crate::{
    calendar::Calendar,
    criteria::{DateFilter, FilterCriteria, TypeFilter, is_unrestricted},
};

const OCTOBER: u32 = 10;
const WEEK_DAYS: u64 = 7;

pub fn filter_by_date(
    transactions: &[Transaction],
    filter: DateFilter,
    calendar: &Calendar,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    match filter {
        DateFilter::Today => {
            let start = calendar.start_of_today(now).timestamp_millis();
            keep(transactions, |tx| tx.created_at >= start)
        }
        DateFilter::Week => {
            let start = calendar
                .start_of_days_ago(now, WEEK_DAYS)
                .timestamp_millis();
            keep(transactions, |tx| tx.created_at >= start)
        }
        DateFilter::October => keep(transactions, |tx| {
            calendar.month_of(tx.created_at) == Some(OCTOBER)
        }),
    }
}

pub fn filter_by_type(transactions: &[Transaction], types: &[TypeFilter]) -> Vec<Transaction> {
    if is_unrestricted(types) {
        return transactions.to_vec();
    }
    keep(transactions, |tx| {
        types.iter().any(|filter| match filter {
            TypeFilter::Terminal => tx.sales_type == SalesType::Terminal,
            TypeFilter::PaymentLink => tx.sales_type == SalesType::PaymentLink,
            TypeFilter::All => true,
        })
    })
}

/// Case-insensitive substring search over id, payment method, reference,
/// amount and the human status label.
pub fn filter_by_search(transactions: &[Transaction], term: &str) -> Vec<Transaction> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return transactions.to_vec();
    }
    keep(transactions, |tx| matches_search(tx, &term))
}

/// `term` must already be trimmed and lowercase.
fn matches_search(tx: &Transaction, term: &str) -> bool {
    tx.id.to_lowercase().contains(term)
        || tx.payment_method.as_str().to_lowercase().contains(term)
        || tx.transaction_reference.to_string().contains(term)
        // Rust's shortest round-trip decimal, never exponent notation.
        || tx.amount.to_string().contains(term)
        || tx.status.label().to_lowercase().contains(term)
}

/// Runs the full pipeline for `criteria`.
pub fn apply(
    transactions: &[Transaction],
    criteria: &FilterCriteria,
    calendar: &Calendar,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let filtered = filter_by_date(transactions, criteria.date_filter, calendar, now);
    let filtered = filter_by_type(&filtered, &criteria.type_filter);
    match criteria.active_search() {
        Some(term) => filter_by_search(&filtered, term),
        None => filtered,
    }
}

fn keep<F>(transactions: &[Transaction], predicate: F) -> Vec<Transaction>
where
    F: Fn(&Transaction) -> bool,
{
    transactions
        .iter()
        .filter(|tx| predicate(tx))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use api_types::transaction::{PaymentMethod, TransactionStatus};
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::stats::compute_stats;

    fn calendar() -> Calendar {
        Calendar::Zone(chrono_tz::America::Bogota)
    }

    /// 2024-10-15 12:00 in Bogota.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 15, 17, 0, 0).unwrap()
    }

    fn tx(id: &str, amount: f64, sales_type: SalesType, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.to_string(),
            status: TransactionStatus::Successful,
            payment_method: PaymentMethod::Card,
            sales_type,
            created_at: created_at.timestamp_millis(),
            transaction_reference: 4411,
            amount,
            deduction: None,
            franchise: None,
        }
    }

    fn ids(transactions: &[Transaction]) -> Vec<&str> {
        transactions.iter().map(|tx| tx.id.as_str()).collect()
    }

    fn sample() -> Vec<Transaction> {
        let mut rejected = tx("B-REJ", 2000.0, SalesType::PaymentLink, now());
        rejected.status = TransactionStatus::Rejected;
        rejected.payment_method = PaymentMethod::Nequi;
        rejected.transaction_reference = 9001;
        vec![
            tx("A-OK", 1000.0, SalesType::Terminal, now()),
            rejected,
            tx(
                "C-OLD",
                1500.5,
                SalesType::Terminal,
                now() - TimeDelta::days(3),
            ),
        ]
    }

    #[test]
    fn today_excludes_yesterday_late_evening() {
        let start = calendar().start_of_today(now());
        let yesterday = tx(
            "late",
            1.0,
            SalesType::Terminal,
            start - TimeDelta::seconds(1),
        );
        let midnight = tx("midnight", 1.0, SalesType::Terminal, start);
        let txs = vec![yesterday, midnight];

        let today = filter_by_date(&txs, DateFilter::Today, &calendar(), now());
        assert_eq!(ids(&today), vec!["midnight"]);

        let week = filter_by_date(&txs, DateFilter::Week, &calendar(), now());
        assert_eq!(ids(&week), vec!["late", "midnight"]);
    }

    #[test]
    fn week_boundary_is_seven_local_midnights_back() {
        let start = calendar().start_of_days_ago(now(), 7);
        let txs = vec![
            tx("before", 1.0, SalesType::Terminal, start - TimeDelta::milliseconds(1)),
            tx("at", 1.0, SalesType::Terminal, start),
        ];
        let week = filter_by_date(&txs, DateFilter::Week, &calendar(), now());
        assert_eq!(ids(&week), vec!["at"]);
    }

    #[test]
    fn october_matches_any_year() {
        let txs = vec![
            tx(
                "oct-2019",
                1.0,
                SalesType::Terminal,
                Utc.with_ymd_and_hms(2019, 10, 20, 15, 0, 0).unwrap(),
            ),
            tx(
                "nov-2024",
                1.0,
                SalesType::Terminal,
                Utc.with_ymd_and_hms(2024, 11, 2, 15, 0, 0).unwrap(),
            ),
            tx(
                "oct-2030",
                1.0,
                SalesType::Terminal,
                Utc.with_ymd_and_hms(2030, 10, 1, 15, 0, 0).unwrap(),
            ),
        ];
        let october = filter_by_date(&txs, DateFilter::October, &calendar(), now());
        assert_eq!(ids(&october), vec!["oct-2019", "oct-2030"]);
    }

    #[test]
    fn type_all_and_empty_are_identity() {
        let txs = sample();
        assert_eq!(filter_by_type(&txs, &[TypeFilter::All]), txs);
        assert_eq!(filter_by_type(&txs, &[]), txs);
        assert_eq!(
            filter_by_type(&txs, &[TypeFilter::Terminal, TypeFilter::All]),
            txs
        );
    }

    #[test]
    fn type_filter_keeps_requested_channels() {
        let txs = sample();
        let terminal = filter_by_type(&txs, &[TypeFilter::Terminal]);
        assert_eq!(ids(&terminal), vec!["A-OK", "C-OLD"]);
        let link = filter_by_type(&txs, &[TypeFilter::PaymentLink]);
        assert_eq!(ids(&link), vec!["B-REJ"]);
        let both = filter_by_type(&txs, &[TypeFilter::PaymentLink, TypeFilter::Terminal]);
        assert_eq!(ids(&both), vec!["A-OK", "B-REJ", "C-OLD"]);
    }

    #[test]
    fn empty_search_is_identity() {
        let txs = sample();
        assert_eq!(filter_by_search(&txs, ""), txs);
        assert_eq!(filter_by_search(&txs, "   "), txs);
    }

    #[test]
    fn search_is_case_insensitive() {
        let txs = sample();
        assert_eq!(
            filter_by_search(&txs, "CARD"),
            filter_by_search(&txs, "card")
        );
        assert_eq!(ids(&filter_by_search(&txs, "nEqUi")), vec!["B-REJ"]);
        assert_eq!(ids(&filter_by_search(&txs, "a-ok")), vec!["A-OK"]);
    }

    #[test]
    fn search_matches_reference_amount_and_status_label() {
        let txs = sample();
        assert_eq!(ids(&filter_by_search(&txs, "9001")), vec!["B-REJ"]);
        assert_eq!(ids(&filter_by_search(&txs, "1500.5")), vec!["C-OLD"]);
        assert_eq!(ids(&filter_by_search(&txs, "no realizado")), vec!["B-REJ"]);
        assert_eq!(
            ids(&filter_by_search(&txs, " exitoso ")),
            vec!["A-OK", "C-OLD"]
        );
    }

    #[test]
    fn integral_amounts_search_without_fraction() {
        let txs = sample();
        assert_eq!(ids(&filter_by_search(&txs, "2000")), vec!["B-REJ"]);
        assert!(filter_by_search(&txs, "2000.0").is_empty());
    }

    #[test]
    fn pipeline_runs_every_stage() {
        let txs = sample();
        let criteria = FilterCriteria {
            date_filter: DateFilter::Today,
            type_filter: vec![TypeFilter::Terminal],
            search_term: "card".to_string(),
        };
        let filtered = apply(&txs, &criteria, &calendar(), now());
        assert_eq!(ids(&filtered), vec!["A-OK"]);
    }

    #[test]
    fn pipeline_is_idempotent_and_consistent_with_stats() {
        let txs = sample();
        for date_filter in DateFilter::ALL {
            for types in [
                vec![TypeFilter::All],
                vec![TypeFilter::Terminal],
                vec![TypeFilter::PaymentLink],
                vec![],
            ] {
                for term in ["", "card", "1", "zzz"] {
                    let criteria = FilterCriteria {
                        date_filter,
                        type_filter: types.clone(),
                        search_term: term.to_string(),
                    };
                    let first = apply(&txs, &criteria, &calendar(), now());
                    let second = apply(&txs, &criteria, &calendar(), now());
                    assert_eq!(first, second);
                    assert_eq!(compute_stats(&first).total_transactions, first.len());
                }
            }
        }
    }
}
