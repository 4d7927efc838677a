//! Wall-clock helpers for record timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in epoch milliseconds (0 if the clock predates the epoch).
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Returns a timestamp strictly greater than `previous`.
///
/// Two edits inside the same millisecond still get distinct stamps.
pub fn next_timestamp(previous: i64) -> i64 {
    now_epoch_ms().max(previous.saturating_add(1))
}
