// ============================================================================
// Acknowledgement Counters
// ============================================================================
//
// Hash-field counters keyed by (namespace, message ID). Created
// implicitly on first increment; `reset_by` consumes acknowledgements
// without ever leaving a negative counter.

use anyhow::{Context, Result};
use courier_redis::RedisClient;

pub(crate) struct AckCounters<'a> {
    client: &'a mut RedisClient,
}

impl<'a> AckCounters<'a> {
    pub(crate) fn new(client: &'a mut RedisClient) -> Self {
        Self { client }
    }

    /// Atomic +1, returns the new count
    pub(crate) async fn increment(&mut self, namespace: &str, message_id: &str) -> Result<i64> {
        self.client
            .hincr(namespace, message_id, 1)
            .await
            .context("Failed to increment ack counter")
    }

    /// Current count, 0 if absent
    pub(crate) async fn count(&mut self, namespace: &str, message_id: &str) -> Result<i64> {
        let count: Option<i64> = self
            .client
            .hget(namespace, message_id)
            .await
            .context("Failed to read ack counter")?;

        Ok(count.unwrap_or(0))
    }

    /// Consumes `amount` acknowledgements: deletes the counter entirely
    /// if the current count is at most `amount`, otherwise decrements
    /// by it
    pub(crate) async fn reset_by(
        &mut self,
        namespace: &str,
        message_id: &str,
        amount: i64,
    ) -> Result<()> {
        if self.count(namespace, message_id).await? <= amount {
            self.client
                .hdel(namespace, message_id)
                .await
                .context("Failed to delete ack counter")?;
        } else {
            self.client
                .hincr(namespace, message_id, -amount)
                .await
                .context("Failed to decrement ack counter")?;
        }

        Ok(())
    }

    /// Every message ID with at least one recorded acknowledgement
    pub(crate) async fn acked_ids(&mut self, namespace: &str) -> Result<Vec<String>> {
        self.client
            .hkeys(namespace)
            .await
            .context("Failed to enumerate acknowledged messages")
    }
}
