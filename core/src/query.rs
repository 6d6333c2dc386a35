//! Query engine: seeded shuffle, filter, newest-first sort, truncate.
//!
//! Pure functions over a borrowed snapshot; safe to call concurrently.

use crate::{
    record::TransactionRecord,
    types::ShuffleSeed,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const LCG_MULTIPLIER: i128 = 9301;
const LCG_INCREMENT: i128 = 49297;
const LCG_MODULUS: i128 = 233280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    All,
    Suspicious,
    /// Elevated-risk records that were not flagged: composite score > 50
    /// and status other than suspicious. Low-risk approved records are
    /// deliberately excluded.
    Normal,
    Today,
    Week,
}

impl Filter {
    /// Unrecognized names mean no filtering.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "suspicious" => Self::Suspicious,
            "normal" => Self::Normal,
            "today" => Self::Today,
            "week" => Self::Week,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Suspicious => "suspicious",
            Self::Normal => "normal",
            Self::Today => "today",
            Self::Week => "week",
        }
    }

    pub fn matches(&self, record: &TransactionRecord, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Suspicious => record.is_suspicious(),
            Self::Normal => record.risk_score > 50 && !record.is_suspicious(),
            Self::Today => record.timestamp >= start_of_day(now),
            Self::Week => record.timestamp >= now - Duration::days(7),
        }
    }
}

/// One page of query results plus the pre-truncation count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPage<'a> {
    pub records: Vec<&'a TransactionRecord>,
    pub total: usize,
}

pub fn query<'a>(
    records: &'a [TransactionRecord],
    filter: Filter,
    limit: usize,
    seed: ShuffleSeed,
    now: DateTime<Utc>,
) -> QueryPage<'a> {
    let mut view: Vec<&TransactionRecord> = records.iter().collect();
    shuffle(&mut view, seed);
    view.retain(|record| filter.matches(record, now));
    // Stable: equal timestamps keep their shuffled order.
    view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let total = view.len();
    view.truncate(limit);
    QueryPage {
        records: view,
        total,
    }
}

/// Fisher–Yates from the end, driven by the LCG draw for each index.
pub fn shuffle<T>(items: &mut [T], seed: ShuffleSeed) {
    for i in (1..items.len()).rev() {
        let j = shuffle_index(seed, i);
        items.swap(i, j);
    }
}

/// Swap partner for position `i`: floor(lcg(seed + i) * (i + 1)), always <= i.
pub fn shuffle_index(seed: ShuffleSeed, i: usize) -> usize {
    let state = ((seed as i128 + i as i128) * LCG_MULTIPLIER + LCG_INCREMENT).rem_euclid(LCG_MODULUS);
    let unit = state as f64 / LCG_MODULUS as f64;
    ((unit * (i + 1) as f64).floor() as usize).min(i)
}

/// Midnight (UTC) of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
