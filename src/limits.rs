use crate::model::Secs;

/// Upper bound on a single resource's capacity.
pub const MAX_CAPACITY: i64 = 100_000;

/// Default cap on resources per engine (overridable via config).
pub const MAX_RESOURCES: usize = 1_000_000;

/// Longest bookable range, in days.
pub const MAX_DURATION_DAYS: i64 = 3_650;

/// 1970-01-01T00:00:00Z
pub const MIN_VALID_TIMESTAMP: Secs = 0;

/// 9999-12-31T23:59:59Z
pub const MAX_VALID_TIMESTAMP: Secs = 253_402_300_799;

pub const MAX_CALLER_ID_LEN: usize = 256;
