//! Monitor service: the request/response boundary the dashboard talks to.
//!
//! Routes:
//!   GET  /api/analytics
//!   GET  /api/transactions?filter=&limit=&refresh=
//!   GET  /api/export?filter=&limit=&refresh=&scope=   (scope=full: every record, 45 columns)
//!   POST /api/predict        (JSON PredictionRequest body)
//!   POST /api/train-model
//!
//! RULES:
//!   - Data problems never surface as errors here; an empty or unreachable
//!     source becomes a "no data" response.
//!   - Every call reads one cache snapshot and works only on that snapshot.

use crate::{
    analytics::{summarize, AnalyticsSummary},
    cache::DatasetCache,
    clock::{Clock, SystemClock},
    config::MonitorConfig,
    error::{MonitorError, MonitorResult},
    export::{export_csv, export_filename, export_full_csv, full_export_filename, ExportFile, ExportScope},
    query::{query, Filter},
    record::TransactionRecord,
    record_builder::Dataset,
    risk_model::{ModelMetrics, Prediction, PredictionRequest, RiskModel, RuleBasedRiskModel},
    rng::RngBank,
    synthesizer::VocabularySynthesizer,
    types::ShuffleSeed,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub const NO_DATA: &str = "No transaction data available";

// ── Request parameters ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsParams {
    /// Echoed back verbatim, even when unrecognized.
    pub filter: String,
    /// Negative limits yield an empty page.
    pub limit: i64,
    pub refresh: ShuffleSeed,
}

impl TransactionsParams {
    pub fn new(filter: impl Into<String>, limit: i64, refresh: ShuffleSeed) -> Self {
        Self {
            filter: filter.into(),
            limit,
            refresh,
        }
    }

    /// Decode `filter=..&limit=..&refresh=..`. Absent or unparseable values
    /// take their defaults.
    pub fn from_query(query: &str, default_limit: usize) -> Self {
        let mut params = Self::new("all", default_limit as i64, 0);
        for (key, value) in query_pairs(query) {
            match key.as_str() {
                "filter" if !value.is_empty() => params.filter = value,
                "limit" => params.limit = value.trim().parse().unwrap_or(default_limit as i64),
                "refresh" => params.refresh = value.trim().parse().unwrap_or(0),
                _ => {}
            }
        }
        params
    }

    fn limit(&self) -> usize {
        if self.limit < 0 {
            0
        } else {
            usize::try_from(self.limit).unwrap_or(usize::MAX)
        }
    }
}

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionsPage {
    pub records: Vec<TransactionRecord>,
    pub total: usize,
    pub filter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionsPage {
    /// 404 when the dataset was empty, 200 otherwise.
    pub fn status_code(&self) -> u16 {
        if self.error.is_some() {
            404
        } else {
            200
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub success: bool,
    pub message: String,
    pub metrics: ModelMetrics,
    pub trained_at: DateTime<Utc>,
}

/// A routed response: HTTP-style status plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error(500, &e.to_string()),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }),
        }
    }
}

// ── Service ──────────────────────────────────────────────────────────────────

pub struct MonitorService {
    cache: DatasetCache,
    clock: Arc<dyn Clock>,
    model: Box<dyn RiskModel>,
    default_limit: usize,
}

impl MonitorService {
    pub fn new(cache: DatasetCache, clock: Arc<dyn Clock>, model: Box<dyn RiskModel>) -> Self {
        Self {
            cache,
            clock,
            model,
            default_limit: MonitorConfig::default().default_limit,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Build a fully wired service from configuration.
    /// Call this instead of new() + manual wiring.
    pub fn from_config(config: &MonitorConfig) -> MonitorResult<Self> {
        let rng_bank = config.rng_seed.map_or_else(RngBank::from_entropy, RngBank::new);
        log::debug!("Attribute synthesizer master seed: {}", rng_bank.master_seed());
        let cache = DatasetCache::new(config.open_source()?, Arc::new(VocabularySynthesizer), rng_bank)
            .with_freshness(config.freshness_window())
            .with_min_fields(config.min_fields);
        Ok(Self::new(cache, Arc::new(SystemClock), Box::new(RuleBasedRiskModel::default()))
            .with_default_limit(config.default_limit))
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Current snapshot, rebuilt if stale.
    pub fn dataset(&self) -> Arc<Dataset> {
        self.cache.get(self.clock.now())
    }

    pub fn analytics(&self) -> AnalyticsResponse {
        let now = self.clock.now();
        let dataset = self.cache.get(now);
        if dataset.is_empty() {
            return AnalyticsResponse {
                summary: AnalyticsSummary::zeroed(),
                error: Some(NO_DATA.to_string()),
            };
        }

        let summary = summarize(&dataset.records, now.date_naive());
        log::debug!(
            "Analytics calculated: total={} suspicious={} fraud_rate={}",
            summary.total_transactions,
            summary.suspicious_transactions,
            summary.fraud_rate
        );
        AnalyticsResponse { summary, error: None }
    }

    pub fn transactions(&self, params: &TransactionsParams) -> TransactionsPage {
        log::debug!(
            "Transactions request: filter={} limit={} refresh={}",
            params.filter,
            params.limit,
            params.refresh
        );
        let now = self.clock.now();
        let dataset = self.cache.get(now);
        if dataset.is_empty() {
            return TransactionsPage {
                records: Vec::new(),
                total: 0,
                filter: params.filter.clone(),
                error: Some(NO_DATA.to_string()),
            };
        }

        let page = query(
            &dataset.records,
            Filter::parse(&params.filter),
            params.limit(),
            params.refresh,
            now,
        );
        TransactionsPage {
            records: page.records.into_iter().cloned().collect(),
            total: page.total,
            filter: params.filter.clone(),
            error: None,
        }
    }

    /// The query page rendered as the table export. An unrecognized filter
    /// is applied, and reported, as `all`.
    pub fn export(&self, params: &TransactionsParams) -> MonitorResult<ExportFile> {
        let filter = Filter::parse(&params.filter);
        let page = self.transactions(&TransactionsParams::new(filter.as_str(), params.limit, params.refresh));
        Ok(ExportFile {
            filename: export_filename(filter, self.clock.now().date_naive()),
            filter: filter.as_str().to_string(),
            scope: ExportScope::Table,
            rows: page.records.len(),
            content: export_csv(&page.records)?,
        })
    }

    /// Every record, newest first, in the 45-column layout.
    pub fn export_full(&self, refresh: ShuffleSeed) -> MonitorResult<ExportFile> {
        let page = self.transactions(&TransactionsParams::new(Filter::All.as_str(), i64::MAX, refresh));
        log::info!("Exporting full dataset: {} records", page.records.len());
        Ok(ExportFile {
            filename: full_export_filename(self.clock.now().date_naive()),
            filter: Filter::All.as_str().to_string(),
            scope: ExportScope::Full,
            rows: page.records.len(),
            content: export_full_csv(&page.records)?,
        })
    }

    pub fn predict(&self, request: &PredictionRequest) -> Prediction {
        self.model.score(request)
    }

    pub fn retrain(&self) -> TrainingReport {
        let now = self.clock.now();
        let dataset = self.cache.get(now);
        let metrics = self.model.retrain(&dataset.records, now);
        let (success, message) = if dataset.is_empty() {
            (false, NO_DATA.to_string())
        } else {
            (true, "Model training completed successfully".to_string())
        };
        TrainingReport {
            success,
            message,
            metrics,
            trained_at: now,
        }
    }

    /// Route a request target such as `/api/transactions?filter=week`.
    pub fn handle(&self, method: &str, target: &str, body: Option<&str>) -> ApiResponse {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let route = path.trim_matches('/').trim_start_matches("api/");
        let method = method.to_ascii_uppercase();

        match (route, method.as_str()) {
            ("analytics", "GET") => ApiResponse::json(200, &self.analytics()),
            ("transactions", "GET") => {
                let page = self.transactions(&TransactionsParams::from_query(query, self.default_limit));
                ApiResponse::json(page.status_code(), &page)
            }
            ("export", "GET") => {
                let params = TransactionsParams::from_query(query, self.default_limit);
                let scope = query_value(query, "scope").map_or(ExportScope::Table, |s| ExportScope::parse(&s));
                let file = match scope {
                    ExportScope::Table => self.export(&params),
                    ExportScope::Full => self.export_full(params.refresh),
                };
                match file {
                    Ok(file) => ApiResponse::json(200, &file),
                    Err(e) => {
                        log::error!("Export failed: {e}");
                        ApiResponse::error(500, &e.to_string())
                    }
                }
            }
            ("predict", "POST") => match parse_body::<PredictionRequest>(body) {
                Ok(request) => ApiResponse::json(200, &self.predict(&request)),
                Err(e) => ApiResponse::error(400, &e.to_string()),
            },
            ("train-model", "POST") => {
                let report = self.retrain();
                ApiResponse::json(if report.success { 200 } else { 404 }, &report)
            }
            ("analytics" | "transactions" | "export" | "predict" | "train-model", _) => {
                ApiResponse::error(405, "Method not allowed")
            }
            _ => ApiResponse::error(404, "Not found"),
        }
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Option<&str>) -> MonitorResult<T> {
    let body = body.ok_or_else(|| MonitorError::InvalidRequest {
        reason: "missing request body".into(),
    })?;
    Ok(serde_json::from_str(body)?)
}

fn query_value(query: &str, key: &str) -> Option<String> {
    query_pairs(query).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Percent-decoded key/value pairs of a query string.
fn query_pairs(query: &str) -> Vec<(String, String)> {
    match reqwest::Url::parse(&format!("http://localhost/?{query}")) {
        Ok(url) => url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_apply() {
        let params = TransactionsParams::from_query("", 50);
        assert_eq!(params, TransactionsParams::new("all", 50, 0));
    }

    #[test]
    fn query_values_are_decoded() {
        let params = TransactionsParams::from_query("filter=suspicious&limit=10&refresh=3", 50);
        assert_eq!(params, TransactionsParams::new("suspicious", 10, 3));

        let params = TransactionsParams::from_query("filter=we%65k&limit=abc&refresh=x", 50);
        assert_eq!(params, TransactionsParams::new("week", 50, 0));
    }

    #[test]
    fn negative_limit_is_empty() {
        let params = TransactionsParams::from_query("limit=-5", 50);
        assert_eq!(params.limit(), 0);
    }
}
