// ============================================================================
// Delayed Delivery Index
// ============================================================================
//
// Time-ordered queue releasing message IDs once their scheduled time
// has passed. `due` does not consume: callers remove an entry once
// handled (or leave it for the sweep) to avoid re-delivery.

use crate::score;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use courier_redis::RedisClient;

pub(crate) struct DelayedIndex<'a> {
    client: &'a mut RedisClient,
}

impl<'a> DelayedIndex<'a> {
    pub(crate) fn new(client: &'a mut RedisClient) -> Self {
        Self { client }
    }

    /// Inserts `message_id` ordered by its due time
    pub(crate) async fn schedule(
        &mut self,
        index_key: &str,
        due_time: DateTime<Utc>,
        message_id: &str,
    ) -> Result<i64> {
        self.client
            .zadd(index_key, message_id, score::encode(due_time))
            .await
            .context("Failed to schedule delayed message")
    }

    /// All entries whose scheduled time has passed, in ascending score
    /// order. Entries stay in the index until removed.
    pub(crate) async fn due(&mut self, index_key: &str) -> Result<Vec<String>> {
        self.client
            .zrangebyscore(index_key, score::NO_EXPIRY, score::now())
            .await
            .context("Failed to read due delayed messages")
    }

    /// Removes a handled entry, returns 1 if it was present
    pub(crate) async fn remove(&mut self, index_key: &str, message_id: &str) -> Result<i64> {
        self.client
            .zrem(index_key, message_id)
            .await
            .context("Failed to remove delayed message")
    }
}
