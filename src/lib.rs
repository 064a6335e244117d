// ============================================================================
// Courier - Redis-backed message-delivery bookkeeping engine
// ============================================================================
//
// Tracks pending deliveries per recipient (user, device, group) in Redis,
// generates message IDs, deduplicates acknowledgements, and enforces a
// sliding-window send cap for the official message class.
//
// Key layout (everything lives in Redis, nothing is persisted elsewhere):
// - counter keys          INCR-generated message IDs
// - request marks         fingerprint -> message ID, with TTL
// - broadcast queues      LIST, tail-push / head-pop
// - delayed indices       ZSET scored by due time
// - group indices         ZSET scored by expiry + per-message SET of
//                         recipients already marked
// - user/device indices   ZSET scored by expiry, removed on ack
// - ack counters          HASH field counters
// - official buckets      per-day SET of devices, 10-day TTL
//
// ZSET scores are millisecond-precision UTC timestamps encoded as the
// decimal i64 YYYYMMDDhhmmssmmm; score 0 is the "no expiry tracking"
// sentinel (see `score`).
// ============================================================================

pub mod score;
pub mod store;

pub use store::{DeliveryReport, MessageStore};
