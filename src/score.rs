// ============================================================================
// Ordering Scores
// ============================================================================
//
// Every sorted-set entry is scored with a millisecond-precision UTC
// timestamp encoded as a decimal i64: YYYYMMDDhhmmssmmm. The encoding
// preserves chronological order under integer comparison, which is all
// ZRANGEBYSCORE needs, and stays readable in redis-cli.
//
// Score 0 is reserved: it means "no expiry tracking" for entries whose
// lifetime is governed elsewhere. The sweep's score range starts at 0,
// so sentinel-scored entries are reclaimed by the first sweep after the
// retention cutoff passes them (kept as-is; see DESIGN.md).

use chrono::{DateTime, Duration, Utc};

/// Reserved score for entries without expiry tracking
pub const NO_EXPIRY: i64 = 0;

/// Encode a timestamp as a sortable i64 score (YYYYMMDDhhmmssmmm, UTC)
pub fn encode(at: DateTime<Utc>) -> i64 {
    at.format("%Y%m%d%H%M%S%3f")
        .to_string()
        .parse()
        // The format string always yields 17 ASCII digits, well inside
        // i64 range until year 922337
        .expect("datetime format yields digits")
}

/// Score for the current instant
pub fn now() -> i64 {
    encode(Utc::now())
}

/// Score for `seconds` from now; negative values land in the past
pub fn in_seconds(seconds: i64) -> i64 {
    encode(Utc::now() + Duration::seconds(seconds))
}

/// Today's calendar-day bucket name fragment (YYYYMMDD, UTC)
pub fn day_bucket(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d").to_string()
}
