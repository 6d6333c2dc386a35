//! Risk model capability.
//!
//! The dashboard's prediction and training endpoints sit behind RiskModel
//! so a real model can replace the rule-based stand-in without touching
//! the rest of the core.

use crate::{
    analytics::round_to,
    record::{Status, TransactionRecord},
};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

const ALERT_THRESHOLD: f64 = 70.0;
const LARGE_AMOUNT: f64 = 5_000.0;
const VERY_LARGE_AMOUNT: f64 = 10_000.0;
const NIGHT_STARTS_AFTER: u32 = 22;
const NIGHT_ENDS_BEFORE: u32 = 6;
/// Composite score above which a labelled record counts as a predicted positive.
const EVALUATION_CUTOFF: i64 = 50;

// ── Data Structures ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub customer_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub transaction_id: String,
    pub customer_id: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    pub risk_score: i64,
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    pub reason: String,
    pub confidence: f64,
}

/// Percentages, one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub evaluated: usize,
    pub trained_at: DateTime<Utc>,
}

// ── Capability ───────────────────────────────────────────────────────────────

pub trait RiskModel: Send + Sync {
    fn score(&self, request: &PredictionRequest) -> Prediction;

    /// Refit against labelled records and report how the model does on them.
    fn retrain(&self, records: &[TransactionRecord], now: DateTime<Utc>) -> ModelMetrics;
}

/// Additive rules over a fixed base score.
#[derive(Debug, Clone, Copy)]
pub struct RuleBasedRiskModel {
    base_score: f64,
}

impl Default for RuleBasedRiskModel {
    fn default() -> Self {
        Self { base_score: 30.0 }
    }
}

impl RuleBasedRiskModel {
    pub fn new(base_score: f64) -> Self {
        Self { base_score }
    }

    fn raw_score(&self, request: &PredictionRequest) -> f64 {
        let mut score = self.base_score;
        if request.amount > LARGE_AMOUNT {
            score += 20.0;
        }
        if request.amount > VERY_LARGE_AMOUNT {
            score += 30.0;
        }
        score += match request.tx_type.to_ascii_lowercase().as_str() {
            "withdrawal" | "cash_out" => 15.0,
            "transfer" => 10.0,
            _ => 0.0,
        };
        let hour = request.timestamp.hour();
        if hour < NIGHT_ENDS_BEFORE || hour > NIGHT_STARTS_AFTER {
            score += 25.0;
        }
        score.min(100.0)
    }
}

impl RiskModel for RuleBasedRiskModel {
    fn score(&self, request: &PredictionRequest) -> Prediction {
        let score = self.raw_score(request);
        let (status, reason) = if score > ALERT_THRESHOLD {
            (
                Status::Suspicious,
                "High risk score detected based on amount, type, and timing",
            )
        } else {
            (Status::Normal, "Normal transaction pattern")
        };
        // Distance from the alert threshold, mapped onto [0.7, 1.0].
        let margin = ((score - ALERT_THRESHOLD).abs() / ALERT_THRESHOLD).min(1.0);
        let id = uuid::Uuid::new_v4().simple().to_string();

        Prediction {
            transaction_id: format!("txn_{}", &id[..9]),
            customer_id: request.customer_id.clone(),
            tx_type: request.tx_type.clone(),
            amount: request.amount,
            risk_score: score.round() as i64,
            timestamp: request.timestamp,
            status,
            reason: reason.to_string(),
            confidence: round_to(0.7 + 0.3 * margin, 3),
        }
    }

    fn retrain(&self, records: &[TransactionRecord], now: DateTime<Utc>) -> ModelMetrics {
        let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
        for record in records {
            let predicted = record.risk_score > EVALUATION_CUTOFF;
            match (predicted, record.core.is_fraud()) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, false) => tn += 1,
                (false, true) => fn_ += 1,
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let accuracy = ratio(tp + tn, records.len());
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        log::info!(
            "Evaluated risk model on {} records: tp={tp} fp={fp} tn={tn} fn={fn_}",
            records.len()
        );

        ModelMetrics {
            accuracy: round_to(accuracy * 100.0, 1),
            precision: round_to(precision * 100.0, 1),
            recall: round_to(recall * 100.0, 1),
            f1_score: round_to(f1 * 100.0, 1),
            evaluated: records.len(),
            trained_at: now,
        }
    }
}
