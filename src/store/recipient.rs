// ============================================================================
// Per-Recipient Pending Indices
// ============================================================================
//
// One ZSET per user and per device, scored by expiry time. A message is
// "due" while its score is still ahead of now; acknowledging removes it.
// User acknowledgements additionally land in a delivered or rejected
// audit log scored by acknowledgement time; device acknowledgements are
// unaudited.

use crate::score;
use anyhow::{Context, Result};
use courier_config::RedisKeyPrefixes;
use courier_redis::RedisClient;

/// Delivery outcome summary for one user: the full delivered and
/// rejected audit logs, plus pending entries that expired before any
/// acknowledgement arrived.
#[derive(Debug, Default, Clone)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub rejected: Vec<String>,
    pub timed_out: Vec<String>,
}

pub(crate) struct RecipientIndex<'a> {
    client: &'a mut RedisClient,
    prefixes: &'a RedisKeyPrefixes,
}

impl<'a> RecipientIndex<'a> {
    pub(crate) fn new(client: &'a mut RedisClient, prefixes: &'a RedisKeyPrefixes) -> Self {
        Self { client, prefixes }
    }

    fn user_key(&self, user_id: i64) -> String {
        format!("{}{}", self.prefixes.user, user_id)
    }

    fn delivered_key(&self, user_id: i64) -> String {
        format!("{}{}{}", self.prefixes.user, user_id, self.prefixes.delivered_suffix)
    }

    fn rejected_key(&self, user_id: i64) -> String {
        format!("{}{}{}", self.prefixes.user, user_id, self.prefixes.rejected_suffix)
    }

    fn device_key(&self, device: &str) -> String {
        format!("{}{}", self.prefixes.device, device)
    }

    // ============================================================================
    // User messages
    // ============================================================================

    /// Registers a message for a user, scored by its expiry. User id 0
    /// means "no recipient" and is absorbed as a no-op.
    pub(crate) async fn register_user(
        &mut self,
        user_id: i64,
        ttl_seconds: i64,
        message_id: &str,
    ) -> Result<i64> {
        if user_id == 0 {
            return Ok(0);
        }

        let added = self
            .client
            .zadd(&self.user_key(user_id), message_id, score::in_seconds(ttl_seconds))
            .await
            .context("Failed to register user message")?;

        tracing::debug!(
            user_id = user_id,
            message_id = %message_id,
            ttl_seconds = ttl_seconds,
            "Registered user message"
        );

        Ok(added)
    }

    /// Removes the message from the user's pending index (1 if present,
    /// 0 otherwise) and appends it to the delivered or rejected audit
    /// log, scored by acknowledgement time.
    pub(crate) async fn acknowledge_user(
        &mut self,
        reject: bool,
        user_id: i64,
        message_id: &str,
    ) -> Result<i64> {
        let log_key = if reject {
            self.rejected_key(user_id)
        } else {
            self.delivered_key(user_id)
        };

        self.client
            .zadd(&log_key, message_id, score::now())
            .await
            .context("Failed to append user acknowledgement log")?;

        self.client
            .zrem(&self.user_key(user_id), message_id)
            .await
            .context("Failed to remove acknowledged user message")
    }

    /// Message IDs the user should still attempt to fetch: pending
    /// entries whose expiry has not yet passed
    pub(crate) async fn due_user(&mut self, user_id: i64) -> Result<Vec<String>> {
        if user_id == 0 {
            return Ok(Vec::new());
        }

        self.client
            .zrangebyscore(&self.user_key(user_id), score::now(), "+inf")
            .await
            .context("Failed to read due user messages")
    }

    /// Full delivered and rejected logs plus the pending entries whose
    /// expiry already passed without an acknowledgement
    pub(crate) async fn report(&mut self, user_id: i64) -> Result<DeliveryReport> {
        let delivered = self
            .client
            .zrange(&self.delivered_key(user_id), 0, -1)
            .await
            .context("Failed to read delivered log")?;

        let rejected = self
            .client
            .zrange(&self.rejected_key(user_id), 0, -1)
            .await
            .context("Failed to read rejected log")?;

        let timed_out = self
            .client
            .zrangebyscore(&self.user_key(user_id), "-inf", score::now())
            .await
            .context("Failed to read timed-out user messages")?;

        Ok(DeliveryReport {
            delivered,
            rejected,
            timed_out,
        })
    }

    // ============================================================================
    // Device messages
    // ============================================================================

    /// Registers a message for a device, scored by its expiry. An empty
    /// device key is absorbed as a no-op.
    pub(crate) async fn register_device(
        &mut self,
        device: &str,
        ttl_seconds: i64,
        message_id: &str,
    ) -> Result<i64> {
        if device.is_empty() {
            return Ok(0);
        }

        self.client
            .zadd(&self.device_key(device), message_id, score::in_seconds(ttl_seconds))
            .await
            .context("Failed to register device message")
    }

    /// Removes the message from the device's pending index, returns 1
    /// if it was present
    pub(crate) async fn acknowledge_device(
        &mut self,
        device: &str,
        message_id: &str,
    ) -> Result<i64> {
        self.client
            .zrem(&self.device_key(device), message_id)
            .await
            .context("Failed to remove acknowledged device message")
    }

    /// Unexpired pending message IDs for a device
    pub(crate) async fn due_device(&mut self, device: &str) -> Result<Vec<String>> {
        if device.is_empty() {
            return Ok(Vec::new());
        }

        self.client
            .zrangebyscore(&self.device_key(device), score::now(), "+inf")
            .await
            .context("Failed to read due device messages")
    }
}
