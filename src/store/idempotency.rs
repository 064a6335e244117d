// ============================================================================
// Request Fingerprint Marks
// ============================================================================
//
// Short-lived fingerprint -> message-ID mapping that makes a producer's
// "create message" operation idempotent within a time window. Callers
// look up the fingerprint before creating; a `None` lookup result means
// "not previously seen", never an error.

use anyhow::{Context, Result};
use courier_config::RedisKeyPrefixes;
use courier_redis::RedisClient;

pub(crate) struct RequestMarks<'a> {
    client: &'a mut RedisClient,
    prefixes: &'a RedisKeyPrefixes,
}

impl<'a> RequestMarks<'a> {
    pub(crate) fn new(client: &'a mut RedisClient, prefixes: &'a RedisKeyPrefixes) -> Self {
        Self { client, prefixes }
    }

    /// Stores the fingerprint -> message-ID mapping with an absolute
    /// expiry, replacing any existing value. Empty fingerprints are
    /// absorbed as a no-op.
    pub(crate) async fn mark(
        &mut self,
        fingerprint: &str,
        message_id: &str,
        ttl_seconds: i64,
    ) -> Result<()> {
        if fingerprint.is_empty() || ttl_seconds <= 0 {
            return Ok(());
        }

        let key = format!("{}{}", self.prefixes.request, fingerprint);
        self.client
            .set_ex(&key, message_id, ttl_seconds as u64)
            .await
            .context("Failed to store request mark")?;

        Ok(())
    }

    /// Returns the message ID previously marked for this fingerprint.
    /// `None` covers both "never marked" and "mark expired"; only a
    /// store-communication fault is an error.
    pub(crate) async fn lookup(&mut self, fingerprint: &str) -> Result<Option<String>> {
        if fingerprint.is_empty() {
            return Ok(None);
        }

        let key = format!("{}{}", self.prefixes.request, fingerprint);
        self.client
            .get(&key)
            .await
            .context("Failed to look up request mark")
    }
}
