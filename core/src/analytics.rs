//! Analytics aggregator: dataset-wide summary for the dashboard.
//!
//! Always computed over the full record set, never a filtered view.
//! Every rate and share is 0 when the set is empty.

use crate::record::TransactionRecord;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DAILY_BUCKETS: usize = 7;
const HIGH_RISK_THRESHOLD: f64 = 2.0;
const MEDIUM_RISK_THRESHOLD: f64 = 1.0;

// ── Data Structures ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_transactions: usize,
    pub suspicious_transactions: usize,
    /// Percent, one decimal.
    pub fraud_rate: f64,
    pub total_amount: f64,
    pub suspicious_amount: f64,
    pub daily_stats: Vec<DailyStat>,
    pub risk_distribution: Vec<RiskBucket>,
    pub transaction_types: Vec<TypeBreakdown>,
}

/// One pseudo-day. Membership comes from relative sequence position;
/// `date` is a display label only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: String,
    pub total: usize,
    pub suspicious: usize,
    pub fraud_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub risk: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub total: usize,
    pub suspicious: usize,
}

impl AnalyticsSummary {
    /// All counts zero, all lists empty.
    pub fn zeroed() -> Self {
        Self {
            total_transactions: 0,
            suspicious_transactions: 0,
            fraud_rate: 0.0,
            total_amount: 0.0,
            suspicious_amount: 0.0,
            daily_stats: Vec::new(),
            risk_distribution: Vec::new(),
            transaction_types: Vec::new(),
        }
    }
}

// ── Aggregation ──────────────────────────────────────────────────────────────

pub fn summarize(records: &[TransactionRecord], today: NaiveDate) -> AnalyticsSummary {
    let total = records.len();
    let suspicious: Vec<&TransactionRecord> = records.iter().filter(|r| r.core.is_fraud()).collect();

    let total_amount: f64 = records.iter().map(|r| r.core.amount).sum();
    let suspicious_amount: f64 = suspicious.iter().map(|r| r.core.amount).sum();

    AnalyticsSummary {
        total_transactions: total,
        suspicious_transactions: suspicious.len(),
        fraud_rate: round_to(percentage(suspicious.len(), total), 1),
        total_amount: round_to(total_amount, 2),
        suspicious_amount: round_to(suspicious_amount, 2),
        daily_stats: daily_stats(records, today),
        risk_distribution: risk_distribution(records),
        transaction_types: type_breakdown(records),
    }
}

/// Pseudo-day index of a step: floor(step / total * 7), if it lands in 0..7.
pub fn day_bucket(step: i64, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let index = (step as f64 / total as f64 * DAILY_BUCKETS as f64).floor();
    (0.0..DAILY_BUCKETS as f64)
        .contains(&index)
        .then_some(index as usize)
}

/// Bucket `i` is labelled `today - (6 - i)`, so the oldest label holds
/// bucket 0.
fn daily_stats(records: &[TransactionRecord], today: NaiveDate) -> Vec<DailyStat> {
    let mut totals = [0usize; DAILY_BUCKETS];
    let mut frauds = [0usize; DAILY_BUCKETS];
    for record in records {
        if let Some(bucket) = day_bucket(record.core.step, records.len()) {
            totals[bucket] += 1;
            if record.core.is_fraud() {
                frauds[bucket] += 1;
            }
        }
    }

    (0..DAILY_BUCKETS)
        .map(|bucket| {
            let days_back = (DAILY_BUCKETS - 1 - bucket) as i64;
            DailyStat {
                date: (today - Duration::days(days_back)).format("%Y-%m-%d").to_string(),
                total: totals[bucket],
                suspicious: frauds[bucket],
                fraud_rate: round_to(percentage(frauds[bucket], totals[bucket]), 1),
            }
        })
        .collect()
}

fn risk_distribution(records: &[TransactionRecord]) -> Vec<RiskBucket> {
    let total = records.len();
    let (mut high, mut medium, mut low) = (0usize, 0usize, 0usize);
    for record in records {
        let score = record.core.amount_risk_score;
        if score >= HIGH_RISK_THRESHOLD {
            high += 1;
        } else if score >= MEDIUM_RISK_THRESHOLD {
            medium += 1;
        } else {
            low += 1;
        }
    }

    [("High (≥2.0)", high), ("Medium (1.0-2.0)", medium), ("Low (<1.0)", low)]
        .into_iter()
        .map(|(risk, count)| RiskBucket {
            risk: risk.to_string(),
            count,
            percentage: round_to(percentage(count, total), 1),
        })
        .collect()
}

/// Grouped by type label, in first-seen order.
fn type_breakdown(records: &[TransactionRecord]) -> Vec<TypeBreakdown> {
    let mut groups: Vec<TypeBreakdown> = Vec::new();
    for record in records {
        let label = record.core.tx_type.as_str();
        let index = match groups.iter().position(|g| g.tx_type == label) {
            Some(index) => index,
            None => {
                groups.push(TypeBreakdown {
                    tx_type: label.to_string(),
                    total: 0,
                    suspicious: 0,
                });
                groups.len() - 1
            }
        };
        groups[index].total += 1;
        if record.core.is_fraud() {
            groups[index].suspicious += 1;
        }
    }
    groups
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
