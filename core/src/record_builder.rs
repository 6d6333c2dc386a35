//! Record builder: turns parsed rows into TransactionRecords.
//!
//! Each row is built independently. Numeric columns coerce leniently and
//! default to 0; rows with too few fields are dropped without complaint;
//! a row that fails to build is logged and skipped. Nothing here aborts
//! the batch.

use crate::{
    csv_parser::{parse_document, ParsedDocument, ParsedRow},
    error::{MonitorError, MonitorResult},
    record::{CoreFields, Status, TransactionRecord, TransactionType},
    rng::SynthRng,
    synthesizer::ContextSynthesizer,
    types::{Step, MIN_FIELDS},
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Synthetic timeline anchor: step N is stamped (ANCHOR_STEP - N) minutes
/// before the build time.
pub const ANCHOR_STEP: Step = 10_000;

/// The product of one successful build. Immutable once created.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<TransactionRecord>,
    pub header: Vec<String>,
    pub built_at: DateTime<Utc>,
    /// Non-blank data lines seen in the document.
    pub rows_seen: usize,
    /// Rows dropped for being short or failing to build.
    pub rows_skipped: usize,
}

impl Dataset {
    pub fn empty(built_at: DateTime<Utc>) -> Self {
        Self {
            records: Vec::new(),
            header: Vec::new(),
            built_at,
            rows_seen: 0,
            rows_skipped: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

pub struct RecordBuilder {
    now: DateTime<Utc>,
    synthesizer: Arc<dyn ContextSynthesizer>,
    min_fields: usize,
}

impl RecordBuilder {
    pub fn new(now: DateTime<Utc>, synthesizer: Arc<dyn ContextSynthesizer>) -> Self {
        Self {
            now,
            synthesizer,
            min_fields: MIN_FIELDS,
        }
    }

    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    /// Build one record. `Ok(None)` means the row was too short to use.
    pub fn build(&self, row: &ParsedRow, rng: &mut SynthRng) -> MonitorResult<Option<TransactionRecord>> {
        if row.fields.len() < self.min_fields {
            return Ok(None);
        }
        let core = parse_core_fields(&row.fields);
        let timestamp = synthetic_timestamp(self.now, core.step).ok_or_else(|| MonitorError::RowBuild {
            row: row.row,
            reason: format!("step {} is outside the representable timeline", core.step),
        })?;
        let context = self.synthesizer.synthesize(rng, &core);

        let (status, reason) = if core.is_fraud() {
            (
                Status::Suspicious,
                format!(
                    "High risk: Amount risk {:.2}, Behavioral risk {}",
                    core.amount_risk_score, core.behavioral_risk_score
                ),
            )
        } else {
            (Status::Approved, "Normal transaction pattern".to_string())
        };

        Ok(Some(TransactionRecord {
            transaction_id: format!("txn_{}_{}", core.step, core.name_orig),
            customer_id: core.name_orig.clone(),
            risk_score: composite_risk_score(core.amount_risk_score, core.behavioral_risk_score),
            timestamp,
            status,
            reason,
            context,
            core,
        }))
    }

    /// Build every row of a parsed document.
    pub fn build_document(&self, doc: ParsedDocument, rng: &mut SynthRng) -> Dataset {
        log::debug!("Source header: {:?}", doc.header);

        let rows_seen = doc.rows.len();
        let mut records = Vec::with_capacity(rows_seen);
        for row in &doc.rows {
            match self.build(row, rng) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping row {}: {e}", row.row),
            }
        }

        let dataset = Dataset {
            rows_skipped: rows_seen - records.len(),
            records,
            header: doc.header,
            built_at: self.now,
            rows_seen,
        };
        log_profile(&dataset);
        dataset
    }

    /// Parse and build a whole source document.
    pub fn build_text(&self, text: &str, rng: &mut SynthRng) -> MonitorResult<Dataset> {
        let doc = parse_document(text)?;
        Ok(self.build_document(doc, rng))
    }
}

/// round((amount_risk + behavioral_risk) * 50)
pub fn composite_risk_score(amount_risk: f64, behavioral_risk: f64) -> i64 {
    ((amount_risk + behavioral_risk) * 50.0).round() as i64
}

/// `now - (ANCHOR_STEP - step)` minutes; None on overflow.
pub fn synthetic_timestamp(now: DateTime<Utc>, step: Step) -> Option<DateTime<Utc>> {
    let offset = Duration::try_minutes(step.checked_sub(ANCHOR_STEP)?)?;
    now.checked_add_signed(offset)
}

fn parse_core_fields(values: &[String]) -> CoreFields {
    let int = |i: usize| values.get(i).map_or(0, |v| parse_int(v));
    let float = |i: usize| values.get(i).map_or(0.0, |v| parse_float(v));
    let text = |i: usize| values.get(i).map_or_else(String::new, |v| v.replace('"', ""));

    CoreFields {
        step: int(0),
        tx_type: TransactionType::from(text(1)),
        amount: float(2),
        name_orig: text(3),
        old_balance_orig: float(4),
        new_balance_orig: float(5),
        name_dest: text(6),
        old_balance_dest: float(7),
        new_balance_dest: float(8),
        hour: int(9),
        day_of_week: int(10),
        is_weekend: int(11),
        is_night: int(12),
        avg_amount: float(13),
        transaction_count: int(14),
        amount_std: float(15),
        amount_to_balance_ratio: float(16),
        amount_zscore: float(17),
        is_round_amount: int(18),
        balance_drained: int(19),
        dest_transaction_count: int(20),
        is_new_dest: int(21),
        hourly_txn_count: int(22),
        balance_change_ratio: float(23),
        unique_destinations: int(24),
        unique_senders_to_dest: int(25),
        deviation_flag: int(26),
        high_velocity_flag: int(27),
        suspicious_time_flag: int(28),
        txn_frequency_per_day: float(29),
        amount_risk_score: float(30),
        behavioral_risk_score: float(31),
        is_fraud: int(32),
    }
}

/// Integer coercion: whole numbers parse directly, decimals truncate toward
/// zero, anything else (including NaN/inf) is 0.
pub fn parse_int(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return value;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

/// Decimal coercion: non-finite or unparseable input is 0.
pub fn parse_float(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn log_profile(dataset: &Dataset) {
    let total = dataset.records.len();
    let fraud = dataset.records.iter().filter(|r| r.core.is_fraud()).count();
    let rate = if total > 0 { fraud as f64 / total as f64 * 100.0 } else { 0.0 };
    log::info!(
        "Built {total} transactions from {} rows ({} skipped)",
        dataset.rows_seen,
        dataset.rows_skipped
    );
    log::info!("Fraud rate from source: {rate:.2}% ({fraud} fraudulent, {} legitimate)", total - fraud);
}
