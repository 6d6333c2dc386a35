//! Shared primitive types used across the monitor.

/// Position of a transaction in the source sequence.
pub type Step = i64;

/// Stable identifier of a built transaction record.
pub type TransactionId = String;

/// Caller-supplied seed for the result shuffle.
pub type ShuffleSeed = i64;

/// Minimum number of positional fields a data row must carry.
pub const MIN_FIELDS: usize = 32;

/// Number of columns in the full source schema.
pub const SOURCE_COLUMNS: usize = 33;
