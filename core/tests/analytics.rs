mod common;

use chrono::NaiveDate;
use common::*;
use fraudwatch_core::analytics::{day_bucket, summarize, AnalyticsSummary};

fn today() -> NaiveDate {
    t0().date_naive()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn three_row_example() {
    let records = build_records(&three_row_document(), t0(), 1);
    let summary = summarize(&records, today());

    assert_eq!(summary.total_transactions, 3);
    assert_eq!(summary.suspicious_transactions, 1);
    assert_eq!(summary.fraud_rate, 33.3);
    assert_eq!(summary.total_amount, 11884.92);
    assert_eq!(summary.suspicious_amount, 181.0);
}

#[test]
fn mixed_set_totals() {
    let records = build_records(&mixed_document(), t0(), 1);
    let summary = summarize(&records, today());

    assert_eq!(summary.total_transactions, 10);
    assert_eq!(summary.suspicious_transactions, 3);
    assert_eq!(summary.fraud_rate, 30.0);
    assert_eq!(summary.total_amount, 56742.22);
    assert_eq!(summary.suspicious_amount, 8179.71);
}

#[test]
fn risk_distribution_covers_every_record() {
    let records = build_records(&mixed_document(), t0(), 1);
    let summary = summarize(&records, today());
    let dist = &summary.risk_distribution;

    let labels: Vec<&str> = dist.iter().map(|b| b.risk.as_str()).collect();
    assert_eq!(labels, vec!["High (≥2.0)", "Medium (1.0-2.0)", "Low (<1.0)"]);
    let counts: Vec<usize> = dist.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![2, 3, 5]);

    let count_sum: usize = counts.iter().sum();
    assert_eq!(count_sum, summary.total_transactions);
    let pct_sum: f64 = dist.iter().map(|b| b.percentage).sum();
    assert!((pct_sum - 100.0).abs() <= 0.3, "Percentages sum to {pct_sum}");
}

#[test]
fn percentages_round_within_tolerance_for_awkward_totals() {
    let rows: Vec<String> = (1..=7)
        .map(|i| row(i, "PAYMENT", 1.0, &format!("C{i}"), [0.1, 1.5, 2.5][i as usize % 3], 0.0, 0))
        .collect();
    let records = build_records(&document(&rows), t0(), 1);
    let summary = summarize(&records, today());

    let count_sum: usize = summary.risk_distribution.iter().map(|b| b.count).sum();
    assert_eq!(count_sum, 7);
    let pct_sum: f64 = summary.risk_distribution.iter().map(|b| b.percentage).sum();
    assert!((pct_sum - 100.0).abs() <= 0.3, "Percentages sum to {pct_sum}");
}

#[test]
fn types_are_grouped_in_first_seen_order() {
    let records = build_records(&mixed_document(), t0(), 1);
    let summary = summarize(&records, today());

    let groups: Vec<(&str, usize, usize)> = summary
        .transaction_types
        .iter()
        .map(|g| (g.tx_type.as_str(), g.total, g.suspicious))
        .collect();
    assert_eq!(
        groups,
        vec![("PAYMENT", 4, 0), ("TRANSFER", 2, 1), ("CASH_OUT", 2, 2), ("DEBIT", 2, 0)]
    );
}

/// Buckets come from relative step position; dates are labels only.
#[test]
fn daily_buckets_follow_sequence_position() {
    let records = build_records(&mixed_document(), t0(), 1);
    let summary = summarize(&records, today());
    let days = &summary.daily_stats;

    assert_eq!(days.len(), 7);
    assert_eq!(days[0].date, "2024-06-09");
    assert_eq!(days[6].date, "2024-06-15");

    let totals: Vec<usize> = days.iter().map(|d| d.total).collect();
    assert_eq!(totals, vec![1, 1, 2, 1, 2, 1, 1]);
    let suspicious: Vec<usize> = days.iter().map(|d| d.suspicious).collect();
    assert_eq!(suspicious, vec![0, 0, 2, 0, 1, 0, 0]);
    assert_eq!(days[2].fraud_rate, 100.0);
    assert_eq!(days[4].fraud_rate, 50.0);
    assert_eq!(days[0].fraud_rate, 0.0);
}

#[test]
fn first_bucket_carries_the_oldest_label() {
    let rows: Vec<String> = (0..7)
        .map(|step| row(step, "PAYMENT", 10.0, &format!("C{step}"), 0.1, 0.1, u8::from(step == 0)))
        .collect();
    let records = build_records(&document(&rows), t0(), 1);
    let summary = summarize(&records, today());

    let oldest = &summary.daily_stats[0];
    assert_eq!(oldest.date, "2024-06-09");
    assert_eq!(oldest.total, 1);
    assert_eq!(oldest.suspicious, 1, "step 0 lands in bucket 0");

    let newest = &summary.daily_stats[6];
    assert_eq!(newest.date, "2024-06-15");
    assert_eq!(newest.suspicious, 0);
}

#[test]
fn day_bucket_edges() {
    assert_eq!(day_bucket(0, 10), Some(0));
    assert_eq!(day_bucket(9, 10), Some(6));
    assert_eq!(day_bucket(10, 10), None);
    assert_eq!(day_bucket(-1, 10), None);
    assert_eq!(day_bucket(5, 0), None);
}

#[test]
fn empty_set_is_all_zero() {
    let summary = summarize(&[], today());

    assert_eq!(summary.total_transactions, 0);
    assert_eq!(summary.fraud_rate, 0.0);
    assert_eq!(summary.total_amount, 0.0);
    assert!(summary.daily_stats.iter().all(|d| d.total == 0 && d.fraud_rate == 0.0));
    assert!(summary.risk_distribution.iter().all(|b| b.count == 0 && b.percentage == 0.0));
    assert!(summary.transaction_types.is_empty());
}

#[test]
fn summary_serializes_for_the_dashboard() {
    let records = build_records(&three_row_document(), t0(), 1);
    let json = serde_json::to_value(summarize(&records, today())).unwrap();

    assert_eq!(json["totalTransactions"], 3);
    assert_eq!(json["fraudRate"], 33.3);
    assert!(json["dailyStats"][0]["fraudRate"].is_number());
    assert_eq!(json["transactionTypes"][0]["type"], "PAYMENT");

    let zero = serde_json::to_value(AnalyticsSummary::zeroed()).unwrap();
    assert_eq!(zero["riskDistribution"], serde_json::json!([]));
}
