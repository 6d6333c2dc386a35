//! Transaction records: the positional source columns plus the fields
//! derived once at build time.
//!
//! JSON field names follow the dashboard's wire format (`nameOrig`,
//! `isFraud`, `transactionId`, ...), so serialized records can be handed to
//! the UI layer unchanged.

use crate::types::{Step, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Transaction type ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Payment,
    Transfer,
    CashOut,
    CashIn,
    Debit,
    /// Anything outside the known vocabulary, kept verbatim.
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Payment => "PAYMENT",
            Self::Transfer => "TRANSFER",
            Self::CashOut => "CASH_OUT",
            Self::CashIn => "CASH_IN",
            Self::Debit => "DEBIT",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for TransactionType {
    fn from(label: &str) -> Self {
        match label {
            "PAYMENT" => Self::Payment,
            "TRANSFER" => Self::Transfer,
            "CASH_OUT" => Self::CashOut,
            "CASH_IN" => Self::CashIn,
            "DEBIT" => Self::Debit,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TransactionType {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<TransactionType> for String {
    fn from(kind: TransactionType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Suspicious,
    Approved,
    /// Used by risk model predictions below the alert threshold.
    Normal,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suspicious => "suspicious",
            Self::Approved => "approved",
            Self::Normal => "normal",
        }
    }
}

// ── Source columns ───────────────────────────────────────────────────────────

/// The 33 positional columns of the source dataset, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreFields {
    pub step: Step,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: f64,
    #[serde(rename = "nameOrig")]
    pub name_orig: String,
    #[serde(rename = "oldbalanceOrg")]
    pub old_balance_orig: f64,
    #[serde(rename = "newbalanceOrig")]
    pub new_balance_orig: f64,
    #[serde(rename = "nameDest")]
    pub name_dest: String,
    #[serde(rename = "oldbalanceDest")]
    pub old_balance_dest: f64,
    #[serde(rename = "newbalanceDest")]
    pub new_balance_dest: f64,
    pub hour: i64,
    pub day_of_week: i64,
    pub is_weekend: i64,
    pub is_night: i64,
    pub avg_amount: f64,
    pub transaction_count: i64,
    pub amount_std: f64,
    pub amount_to_balance_ratio: f64,
    pub amount_zscore: f64,
    pub is_round_amount: i64,
    pub balance_drained: i64,
    pub dest_transaction_count: i64,
    pub is_new_dest: i64,
    pub hourly_txn_count: i64,
    pub balance_change_ratio: f64,
    pub unique_destinations: i64,
    pub unique_senders_to_dest: i64,
    pub deviation_flag: i64,
    pub high_velocity_flag: i64,
    pub suspicious_time_flag: i64,
    pub txn_frequency_per_day: f64,
    pub amount_risk_score: f64,
    pub behavioral_risk_score: f64,
    #[serde(rename = "isFraud")]
    pub is_fraud: i64,
}

impl CoreFields {
    pub fn is_fraud(&self) -> bool {
        self.is_fraud == 1
    }

    pub fn is_weekend(&self) -> bool {
        self.is_weekend != 0
    }

    pub fn is_night(&self) -> bool {
        self.is_night != 0
    }

    pub fn at_suspicious_time(&self) -> bool {
        self.suspicious_time_flag != 0
    }
}

// ── Synthesized context ──────────────────────────────────────────────────────

/// Presentation attributes drawn at random for each build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAttributes {
    pub location: String,
    pub merchant: String,
    pub category: String,
    pub payment_method: String,
    pub device_info: String,
    pub ip_address: String,
    pub country: String,
    pub city: String,
}

// ── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(flatten)]
    pub core: CoreFields,
    pub transaction_id: TransactionId,
    pub customer_id: String,
    /// Composite risk on a 0–100 scale.
    pub risk_score: i64,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    pub reason: String,
    #[serde(flatten)]
    pub context: ContextAttributes,
}

impl TransactionRecord {
    pub fn is_suspicious(&self) -> bool {
        self.status == Status::Suspicious
    }
}

/// ISO-8601 instants with millisecond precision and a `Z` suffix.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
