// ============================================================================
// Redis Key Layout
// ============================================================================

/// Redis key prefixes configuration
///
/// Every key the store writes is namespaced through one of these
/// prefixes so several deployments can share a Redis database.
#[derive(Clone, Debug)]
pub struct RedisKeyPrefixes {
    /// Prefix for message-ID counters: "counter:{counter_key}"
    pub counter: String,
    /// Prefix for request fingerprint marks: "request:{fingerprint}"
    pub request: String,
    /// Prefix for group pending indices: "group:{group_key}"
    pub group: String,
    /// Prefix for group delivery-tracking sets: "seen:{message_id}"
    pub seen: String,
    /// Prefix for per-user pending indices: "user:{user_id}"
    pub user: String,
    /// Prefix for per-device pending indices: "device:{device_key}"
    pub device: String,
    /// Suffix for the per-user delivered audit log: "user:{user_id}:delivered"
    pub delivered_suffix: String,
    /// Suffix for the per-user rejected audit log: "user:{user_id}:rejected"
    pub rejected_suffix: String,
    /// Prefix for official-message flags: "official:{message_id}"
    pub official: String,
    /// Prefix for official daily rate-limit buckets: "official_limit:{yyyymmdd}"
    pub official_limit: String,
}

impl RedisKeyPrefixes {
    pub(crate) fn from_env() -> Self {
        Self {
            counter: std::env::var("REDIS_KEY_PREFIX_COUNTER")
                .unwrap_or_else(|_| "counter:".to_string()),
            request: std::env::var("REDIS_KEY_PREFIX_REQUEST")
                .unwrap_or_else(|_| "request:".to_string()),
            group: std::env::var("REDIS_KEY_PREFIX_GROUP")
                .unwrap_or_else(|_| "group:".to_string()),
            seen: std::env::var("REDIS_KEY_PREFIX_SEEN").unwrap_or_else(|_| "seen:".to_string()),
            user: std::env::var("REDIS_KEY_PREFIX_USER").unwrap_or_else(|_| "user:".to_string()),
            device: std::env::var("REDIS_KEY_PREFIX_DEVICE")
                .unwrap_or_else(|_| "device:".to_string()),
            delivered_suffix: std::env::var("REDIS_KEY_SUFFIX_DELIVERED")
                .unwrap_or_else(|_| ":delivered".to_string()),
            rejected_suffix: std::env::var("REDIS_KEY_SUFFIX_REJECTED")
                .unwrap_or_else(|_| ":rejected".to_string()),
            official: std::env::var("REDIS_KEY_PREFIX_OFFICIAL")
                .unwrap_or_else(|_| "official:".to_string()),
            official_limit: std::env::var("REDIS_KEY_PREFIX_OFFICIAL_LIMIT")
                .unwrap_or_else(|_| "official_limit:".to_string()),
        }
    }
}
