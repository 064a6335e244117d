// ============================================================================
// Broadcast Queues
// ============================================================================
//
// FIFO queues of opaque payloads for fan-out consumers. Non-blocking:
// consumers poll `pop` in a loop; an empty queue is not an error.

use anyhow::{Context, Result};
use courier_redis::RedisClient;

pub(crate) struct Broadcasts<'a> {
    client: &'a mut RedisClient,
}

impl<'a> Broadcasts<'a> {
    pub(crate) fn new(client: &'a mut RedisClient) -> Self {
        Self { client }
    }

    /// Appends a payload to the queue tail and returns the new queue
    /// length. An empty queue key or payload is absorbed as a no-op
    /// returning 0; broadcast channels are optional.
    pub(crate) async fn push(&mut self, queue_key: &str, payload: &[u8]) -> Result<i64> {
        if queue_key.is_empty() || payload.is_empty() {
            return Ok(0);
        }

        self.client
            .rpush(queue_key, payload)
            .await
            .context("Failed to push broadcast payload")
    }

    /// Removes and returns the head payload, `None` if the queue is
    /// empty or the queue key is empty.
    pub(crate) async fn pop(&mut self, queue_key: &str) -> Result<Option<Vec<u8>>> {
        if queue_key.is_empty() {
            return Ok(None);
        }

        self.client
            .lpop(queue_key)
            .await
            .context("Failed to pop broadcast payload")
    }

    /// Current queue length
    pub(crate) async fn len(&mut self, queue_key: &str) -> Result<i64> {
        if queue_key.is_empty() {
            return Ok(0);
        }

        self.client
            .llen(queue_key)
            .await
            .context("Failed to read broadcast queue length")
    }
}
