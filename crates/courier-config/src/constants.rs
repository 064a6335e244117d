// ============================================================================
// Configuration Constants
// ============================================================================

// Default TTL values
pub(crate) const DEFAULT_MESSAGE_TTL_DAYS: i64 = 7;
pub(crate) const DEFAULT_REQUEST_MARK_TTL_SECS: i64 = 300;
pub(crate) const DEFAULT_SWEEP_RETENTION_SECS: i64 = SECONDS_PER_DAY;

// Official-message rate limit window
//
// A device is saturated once it appears in today's bucket or once its
// membership across the trailing window reaches the cap. Buckets keep a
// longer TTL than the window so the scan never reads a half-expired day.
pub const OFFICIAL_WINDOW_DAYS: i64 = 7;
pub const OFFICIAL_WINDOW_CAP: i64 = 3;
pub const OFFICIAL_BUCKET_TTL_DAYS: i64 = 10;

// Time conversion constants
pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3600;
pub const SECONDS_PER_DAY: i64 = 86400;
