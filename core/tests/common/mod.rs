//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use fraudwatch_core::{
    cache::DatasetCache,
    clock::ManualClock,
    error::MonitorResult,
    record::TransactionRecord,
    record_builder::RecordBuilder,
    risk_model::RuleBasedRiskModel,
    rng::RngBank,
    service::MonitorService,
    source::{DataSource, InlineSource},
    synthesizer::VocabularySynthesizer,
};
use std::sync::Arc;

pub const HEADER: &str = "step,type,amount,nameOrig,oldbalanceOrg,newbalanceOrig,nameDest,\
oldbalanceDest,newbalanceDest,hour,day_of_week,is_weekend,is_night,avg_amount,transaction_count,\
amount_std,amount_to_balance_ratio,amount_zscore,is_round_amount,balance_drained,\
dest_transaction_count,is_new_dest,hourly_txn_count,balance_change_ratio,unique_destinations,\
unique_senders_to_dest,deviation_flag,high_velocity_flag,suspicious_time_flag,\
txn_frequency_per_day,amount_risk_score,behavioral_risk_score,isFraud";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// One 33-column source row with the interesting columns exposed.
pub fn row(
    step: i64,
    tx_type: &str,
    amount: f64,
    name_orig: &str,
    amount_risk: f64,
    behavioral_risk: f64,
    is_fraud: u8,
) -> String {
    format!(
        "{step},{tx_type},{amount},{name_orig},5000.0,{after},M1979787155,0.0,0.0,\
         14,3,0,0,{amount},4,120.5,0.25,1.1,0,0,3,1,2,0.8,2,1,0,0,0,1.5,\
         {amount_risk},{behavioral_risk},{is_fraud}",
        after = 5000.0 - amount,
    )
}

pub fn document(rows: &[String]) -> String {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(rows.iter().cloned());
    lines.join("\n")
}

/// Three rows: two PAYMENT, one TRANSFER, one fraudulent.
pub fn three_row_document() -> String {
    document(&[
        row(1, "PAYMENT", 9839.64, "C1231006815", 0.4, 0.3, 0),
        row(2, "PAYMENT", 1864.28, "C1666544295", 0.7, 0.6, 0),
        row(3, "TRANSFER", 181.0, "C1305486145", 2.4, 0.9, 1),
    ])
}

/// A mixed set spanning the risk tiers, statuses and types.
pub fn mixed_document() -> String {
    document(&[
        row(1, "PAYMENT", 9839.64, "C1231006815", 0.4, 0.3, 0),
        row(2, "PAYMENT", 1864.28, "C1666544295", 0.7, 0.6, 0),
        row(3, "TRANSFER", 181.0, "C1305486145", 2.4, 0.9, 1),
        row(4, "CASH_OUT", 181.0, "C840083671", 1.2, 0.8, 1),
        row(5, "DEBIT", 5337.77, "C712410124", 1.5, 0.1, 0),
        row(6, "TRANSFER", 11668.14, "C2048537720", 0.2, 0.1, 0),
        row(7, "CASH_OUT", 7817.71, "C90045638", 2.0, 1.0, 1),
        row(8, "PAYMENT", 7107.77, "C154988899", 0.9, 0.5, 0),
        row(9, "DEBIT", 9644.94, "C1900366749", 0.05, 0.02, 0),
        row(10, "PAYMENT", 3099.97, "C249177573", 1.0, 0.3, 0),
    ])
}

pub fn build_records(text: &str, now: DateTime<Utc>, seed: u64) -> Vec<TransactionRecord> {
    let mut rng = RngBank::new(seed).for_build(0);
    RecordBuilder::new(now, Arc::new(VocabularySynthesizer))
        .build_text(text, &mut rng)
        .expect("document parses")
        .records
}

/// Data source the test keeps a handle on, to swap text or count fetches.
pub struct SharedSource {
    pub inner: Arc<InlineSource>,
    pub fetches: Arc<std::sync::atomic::AtomicUsize>,
}

impl SharedSource {
    pub fn new(inner: Arc<InlineSource>) -> Self {
        Self {
            inner,
            fetches: Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }
}

impl DataSource for SharedSource {
    fn fetch(&self) -> MonitorResult<String> {
        self.fetches.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.inner.fetch()
    }

    fn describe(&self) -> String {
        "shared-inline".to_string()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn cache_over(source: impl DataSource + 'static, seed: u64) -> DatasetCache {
    init_logging();
    DatasetCache::new(Box::new(source), Arc::new(VocabularySynthesizer), RngBank::new(seed))
}

pub fn service_over(text: Option<&str>, clock: Arc<ManualClock>) -> MonitorService {
    let source = match text {
        Some(text) => InlineSource::new(text),
        None => InlineSource::unreachable(),
    };
    MonitorService::new(cache_over(source, 42), clock, Box::new(RuleBasedRiskModel::default()))
}
