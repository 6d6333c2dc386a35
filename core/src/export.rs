//! CSV export of query results.
//!
//! Two layouts:
//!   - table: the 16 dashboard columns, free-text cells quoted, numbers bare
//!   - full:  the presentation columns followed by all 33 source columns,
//!            every cell quoted
//!
//! Embedded quotes are doubled, so either file re-parses with
//! `csv_parser::parse_line`.

use crate::{
    error::{MonitorError, MonitorResult},
    query::Filter,
    record::{iso_millis, TransactionRecord},
};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

pub const EXPORT_HEADERS: [&str; 16] = [
    "Transaction ID",
    "Customer ID",
    "Type",
    "Amount",
    "Risk Score",
    "Timestamp",
    "Status",
    "Reason",
    "Location",
    "Merchant",
    "Category",
    "Payment Method",
    "Device Info",
    "IP Address",
    "Country",
    "City",
];

pub const FULL_EXPORT_HEADERS: [&str; 45] = [
    "Transaction ID",
    "Customer ID",
    "Merchant",
    "Location",
    "Category",
    "Type",
    "Amount",
    "Risk Score",
    "Status",
    "Payment Method",
    "Device",
    "IP Address",
    "Country",
    "City",
    "Step",
    "Name Orig",
    "Old Balance Orig",
    "New Balance Orig",
    "Name Dest",
    "Old Balance Dest",
    "New Balance Dest",
    "Hour",
    "Day of Week",
    "Is Weekend",
    "Is Night",
    "Avg Amount",
    "Transaction Count",
    "Amount Std",
    "Amount to Balance Ratio",
    "Amount Z-Score",
    "Is Round Amount",
    "Balance Drained",
    "Dest Transaction Count",
    "Is New Dest",
    "Hourly Txn Count",
    "Balance Change Ratio",
    "Unique Destinations",
    "Unique Senders to Dest",
    "Deviation Flag",
    "High Velocity Flag",
    "Suspicious Time Flag",
    "Txn Frequency Per Day",
    "Amount Risk Score",
    "Behavioral Risk Score",
    "Is Fraud",
];

/// Which export layout to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    Table,
    Full,
}

impl ExportScope {
    /// Anything other than `full` is the table layout.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "full" => Self::Full,
            _ => Self::Table,
        }
    }
}

/// A rendered export ready to hand to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFile {
    pub filename: String,
    /// The filter actually applied, in canonical form.
    pub filter: String,
    pub scope: ExportScope,
    pub rows: usize,
    pub content: String,
}

/// The 16-column table export, one line per record.
pub fn export_csv<'a, I>(records: I) -> MonitorResult<String>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    write_rows(QuoteStyle::NonNumeric, &EXPORT_HEADERS, records.into_iter().map(table_row))
}

/// The 45-column full-dataset export.
pub fn export_full_csv<'a, I>(records: I) -> MonitorResult<String>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    write_rows(QuoteStyle::Always, &FULL_EXPORT_HEADERS, records.into_iter().map(full_row))
}

/// `transactions_{filter}_{YYYY-MM-DD}.csv`
pub fn export_filename(filter: Filter, date: NaiveDate) -> String {
    format!("transactions_{}_{}.csv", filter.as_str(), date.format("%Y-%m-%d"))
}

/// `fraud-transactions-full-dataset-{YYYY-MM-DD}.csv`
pub fn full_export_filename(date: NaiveDate) -> String {
    format!("fraud-transactions-full-dataset-{}.csv", date.format("%Y-%m-%d"))
}

fn write_rows<R>(style: QuoteStyle, headers: &[&str], rows: R) -> MonitorResult<String>
where
    R: Iterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| MonitorError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| MonitorError::Other(e.into()))
}

fn table_row(record: &TransactionRecord) -> Vec<String> {
    let ctx = &record.context;
    vec![
        record.transaction_id.clone(),
        record.customer_id.clone(),
        record.core.tx_type.to_string(),
        record.core.amount.to_string(),
        record.risk_score.to_string(),
        iso_millis::format(&record.timestamp),
        record.status.as_str().to_string(),
        record.reason.clone(),
        ctx.location.clone(),
        ctx.merchant.clone(),
        ctx.category.clone(),
        ctx.payment_method.clone(),
        ctx.device_info.clone(),
        ctx.ip_address.clone(),
        ctx.country.clone(),
        ctx.city.clone(),
    ]
}

fn full_row(record: &TransactionRecord) -> Vec<String> {
    let ctx = &record.context;
    let c = &record.core;
    vec![
        record.transaction_id.clone(),
        record.customer_id.clone(),
        ctx.merchant.clone(),
        ctx.location.clone(),
        ctx.category.clone(),
        c.tx_type.to_string(),
        c.amount.to_string(),
        record.risk_score.to_string(),
        record.status.as_str().to_string(),
        ctx.payment_method.clone(),
        ctx.device_info.clone(),
        ctx.ip_address.clone(),
        ctx.country.clone(),
        ctx.city.clone(),
        c.step.to_string(),
        c.name_orig.clone(),
        c.old_balance_orig.to_string(),
        c.new_balance_orig.to_string(),
        c.name_dest.clone(),
        c.old_balance_dest.to_string(),
        c.new_balance_dest.to_string(),
        c.hour.to_string(),
        c.day_of_week.to_string(),
        c.is_weekend.to_string(),
        c.is_night.to_string(),
        c.avg_amount.to_string(),
        c.transaction_count.to_string(),
        c.amount_std.to_string(),
        c.amount_to_balance_ratio.to_string(),
        c.amount_zscore.to_string(),
        c.is_round_amount.to_string(),
        c.balance_drained.to_string(),
        c.dest_transaction_count.to_string(),
        c.is_new_dest.to_string(),
        c.hourly_txn_count.to_string(),
        c.balance_change_ratio.to_string(),
        c.unique_destinations.to_string(),
        c.unique_senders_to_dest.to_string(),
        c.deviation_flag.to_string(),
        c.high_velocity_flag.to_string(),
        c.suspicious_time_flag.to_string(),
        c.txn_frequency_per_day.to_string(),
        c.amount_risk_score.to_string(),
        c.behavioral_risk_score.to_string(),
        c.is_fraud.to_string(),
    ]
}
