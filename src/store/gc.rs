// ============================================================================
// Expired-Entry Sweep
// ============================================================================
//
// Maintenance pass removing index entries older than a retention
// cutoff. Enumerates the whole keyspace, so it belongs in a maintenance
// window, not on a hot path, and must not run concurrently with itself
// (single active sweep; the scheduler is responsible).

use crate::score;
use anyhow::{Context, Result};
use courier_redis::RedisClient;

pub(crate) struct Sweeper<'a> {
    client: &'a mut RedisClient,
}

impl<'a> Sweeper<'a> {
    pub(crate) fn new(client: &'a mut RedisClient) -> Self {
        Self { client }
    }

    /// Removes, from every ordered index in the store, all entries with
    /// scores between 0 and now minus `retention_seconds`. Returns the
    /// number of entries removed. A failure on an individual key is
    /// skipped (non-index keys answer WRONGTYPE) and only makes the
    /// count an undercount; score-0 sentinel entries fall inside the
    /// range and are swept too.
    pub(crate) async fn sweep(&mut self, retention_seconds: i64) -> Result<i64> {
        let keys = self
            .client
            .keys("*")
            .await
            .context("Failed to enumerate keys for sweep")?;

        let cutoff = score::in_seconds(-retention_seconds);

        let mut removed = 0i64;
        for key in &keys {
            match self.client.zrembyscore(key, score::NO_EXPIRY, cutoff).await {
                Ok(count) => removed += count,
                Err(err) => {
                    tracing::debug!(key = %key, error = %err, "Skipped key during sweep");
                }
            }
        }

        tracing::info!(
            scanned = keys.len(),
            removed = removed,
            retention_seconds = retention_seconds,
            "Expired-entry sweep complete"
        );

        Ok(removed)
    }
}
