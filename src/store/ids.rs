// ============================================================================
// Message-ID Generation
// ============================================================================

use anyhow::{Context, Result};
use courier_config::RedisKeyPrefixes;
use courier_redis::RedisClient;

pub(crate) struct IdGenerator<'a> {
    client: &'a mut RedisClient,
    prefixes: &'a RedisKeyPrefixes,
}

impl<'a> IdGenerator<'a> {
    pub(crate) fn new(client: &'a mut RedisClient, prefixes: &'a RedisKeyPrefixes) -> Self {
        Self { client, prefixes }
    }

    /// Atomically increments the counter under `counter_key` and returns
    /// the new value. IDs are strictly increasing and never reused; the
    /// counter never resets. Overflow of the underlying i64 is not
    /// handled.
    pub(crate) async fn next(&mut self, counter_key: &str) -> Result<i64> {
        let key = format!("{}{}", self.prefixes.counter, counter_key);
        let id = self
            .client
            .incr(&key)
            .await
            .context("Failed to increment message-id counter")?;

        tracing::debug!(counter = %counter_key, id = id, "Generated message id");

        Ok(id)
    }
}
